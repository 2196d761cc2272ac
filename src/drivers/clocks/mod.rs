// =============================================================================
// CLOCK TREE
// =============================================================================
//
// Modelo dos domínios de clock do RP2350 e a rotina genérica de troca de
// fonte/divisor (`configure`). A frequência de cada domínio nunca é guardada:
// é sempre derivada da fonte atual e do divisor 16.16 programado.
//
// ORDEM OBRIGATÓRIA (em qualquer troca):
// - Domínios com mux glitchless (ref, sys) saem da fonte AUX antes de o
//   AUX mudar; os demais são desabilitados e esperam alguns ciclos.
// - O divisor só aumenta ANTES da troca e só diminui DEPOIS dela, para a
//   saída nunca passar do alvo no meio do caminho.
//
// =============================================================================

pub mod pll;
pub mod sequencer;
pub mod vreg;
pub mod xosc;

use crate::arch::nop_delay;
use crate::hal::regs::clocks as regs;
use crate::hal::{wait_for, RegisterBus, Timeout};

pub use pll::PllConfig;
pub use sequencer::SysClockSpeed;

/// Frequência nominal do ROSC (sem calibração).
pub const ROSC_NOMINAL_HZ: u32 = 11_000_000;

// =============================================================================
// ERROS
// =============================================================================

/// Erros de sequenciamento de clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// Nenhuma configuração de PLL atinge a frequência exata
    Unreachable,
    /// Parâmetros de PLL fora dos limites do hardware
    InvalidPll,
    /// Fonte não disponível para o domínio
    InvalidSource,
    /// Alvo maior que a frequência da fonte
    DividerOutOfRange,
    /// Bit de status não assentou (lock, SELECTED, VREG, XOSC)
    Timeout,
}

impl ClockError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreachable => "Frequencia nao pode ser atingida exatamente",
            Self::InvalidPll => "Configuracao de PLL invalida",
            Self::InvalidSource => "Fonte invalida para o dominio",
            Self::DividerOutOfRange => "Divisor fora do intervalo",
            Self::Timeout => "Timeout esperando status de clock",
        }
    }
}

impl ::core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Timeout> for ClockError {
    fn from(_: Timeout) -> Self {
        Self::Timeout
    }
}

pub type ClockResult<T> = Result<T, ClockError>;

// =============================================================================
// DOMÍNIOS E FONTES
// =============================================================================

/// Domínios de clock geridos pelo firmware. O valor é o índice no bloco CLOCKS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockDomain {
    Ref = 4,
    Sys = 5,
    Peri = 6,
    Hstx = 7,
    Usb = 8,
    Adc = 9,
}

impl ClockDomain {
    pub const ALL: [ClockDomain; 6] = [
        Self::Ref,
        Self::Sys,
        Self::Peri,
        Self::Hstx,
        Self::Usb,
        Self::Adc,
    ];

    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    const fn slot(self) -> usize {
        (self as u32 - 4) as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ref => "clk_ref",
            Self::Sys => "clk_sys",
            Self::Peri => "clk_peri",
            Self::Hstx => "clk_hstx",
            Self::Usb => "clk_usb",
            Self::Adc => "clk_adc",
        }
    }

    /// ref e sys têm mux glitchless (campo SRC + registrador SELECTED).
    pub const fn has_glitchless_mux(self) -> bool {
        matches!(self, Self::Ref | Self::Sys)
    }
}

/// De onde um domínio tira seu clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Rosc,
    Xosc,
    ClkRef,
    ClkSys,
    PllSys,
    PllUsb,
}

/// Campos (SRC, AUXSRC) de CTRL para a combinação domínio/fonte.
///
/// Para domínios glitchless, fontes do mux auxiliar usam SRC = AUX.
fn selector(domain: ClockDomain, source: ClockSource) -> ClockResult<(u32, u32)> {
    use ClockDomain as D;
    use ClockSource as S;

    let sel = match (domain, source) {
        (D::Ref, S::Rosc) => (regs::REF_SRC_ROSC, 0),
        (D::Ref, S::Xosc) => (regs::REF_SRC_XOSC, 0),
        (D::Sys, S::ClkRef) => (regs::SYS_SRC_REF, 0),
        (D::Sys, S::PllSys) => (regs::SYS_SRC_AUX, regs::SYS_AUXSRC_PLL_SYS),
        (D::Sys, S::PllUsb) => (regs::SYS_SRC_AUX, regs::SYS_AUXSRC_PLL_USB),
        (D::Peri, S::ClkSys) => (0, regs::PERI_AUXSRC_CLK_SYS),
        (D::Peri, S::PllSys) => (0, regs::PERI_AUXSRC_PLL_SYS),
        (D::Peri, S::PllUsb) => (0, regs::PERI_AUXSRC_PLL_USB),
        (D::Hstx, S::ClkSys) => (0, regs::HSTX_AUXSRC_CLK_SYS),
        (D::Hstx, S::PllSys) => (0, regs::HSTX_AUXSRC_PLL_SYS),
        (D::Usb, S::PllUsb) => (0, regs::USB_AUXSRC_PLL_USB),
        (D::Adc, S::PllUsb) => (0, regs::ADC_AUXSRC_PLL_USB),
        _ => return Err(ClockError::InvalidSource),
    };
    Ok(sel)
}

// =============================================================================
// CLOCK TREE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DomainState {
    /// `None` = parado.
    source: Option<ClockSource>,
    /// Divisor 16.16.
    div: u32,
}

const DIV_ONE: u32 = 1 << regs::DIV_INT_SHIFT;

/// Estado conhecido dos clocks. Espelha o que foi programado no hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTree {
    pub xosc_hz: u32,
    pub pll_sys_hz: u32,
    pub pll_usb_hz: u32,
    domains: [DomainState; 6],
}

impl ClockTree {
    /// Estado pós-boot-ROM: ref no ROSC, sys no ref, resto parado.
    pub const fn at_reset(xosc_hz: u32) -> Self {
        let stopped = DomainState {
            source: None,
            div: DIV_ONE,
        };
        let mut domains = [stopped; 6];
        domains[ClockDomain::Ref.slot()] = DomainState {
            source: Some(ClockSource::Rosc),
            div: DIV_ONE,
        };
        domains[ClockDomain::Sys.slot()] = DomainState {
            source: Some(ClockSource::ClkRef),
            div: DIV_ONE,
        };
        Self {
            xosc_hz,
            pll_sys_hz: 0,
            pll_usb_hz: 0,
            domains,
        }
    }

    /// Frequência da saída de uma fonte.
    pub fn source_hz(&self, source: ClockSource) -> u32 {
        match source {
            ClockSource::Rosc => ROSC_NOMINAL_HZ,
            ClockSource::Xosc => self.xosc_hz,
            ClockSource::ClkRef => self.freq_hz(ClockDomain::Ref),
            ClockSource::ClkSys => self.freq_hz(ClockDomain::Sys),
            ClockSource::PllSys => self.pll_sys_hz,
            ClockSource::PllUsb => self.pll_usb_hz,
        }
    }

    /// Frequência do domínio (0 se parado).
    pub fn freq_hz(&self, domain: ClockDomain) -> u32 {
        let state = self.domains[domain.slot()];
        match state.source {
            Some(src) => ((self.source_hz(src) as u64) << 16).checked_div(state.div as u64).unwrap_or(0) as u32,
            None => 0,
        }
    }

    pub fn source(&self, domain: ClockDomain) -> Option<ClockSource> {
        self.domains[domain.slot()].source
    }

    /// Divisor 16.16 atual.
    pub fn divider(&self, domain: ClockDomain) -> u32 {
        self.domains[domain.slot()].div
    }

    fn set(&mut self, domain: ClockDomain, source: Option<ClockSource>, div: u32) {
        self.domains[domain.slot()] = DomainState { source, div };
    }

    fn set_source(&mut self, domain: ClockDomain, source: ClockSource) {
        self.domains[domain.slot()].source = Some(source);
    }
}

// =============================================================================
// OPERAÇÕES
// =============================================================================

/// Divisor 16.16 para gerar `freq_hz` a partir de `src_hz`.
pub fn divider_for(src_hz: u32, freq_hz: u32) -> ClockResult<u32> {
    if freq_hz == 0 || freq_hz > src_hz {
        return Err(ClockError::DividerOutOfRange);
    }
    let div = ((src_hz as u64) << 16) / freq_hz as u64;
    u32::try_from(div).map_err(|_| ClockError::DividerOutOfRange)
}

/// Troca a fonte de um domínio e programa o divisor para `freq_hz`.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
pub fn configure<B: RegisterBus>(
    bus: &mut B,
    tree: &mut ClockTree,
    domain: ClockDomain,
    source: ClockSource,
    freq_hz: u32,
) -> ClockResult<()> {
    let (src, auxsrc) = selector(domain, source)?;
    let div = divider_for(tree.source_hz(source), freq_hz)?;
    let idx = domain.index();

    // Divisor cresce antes da troca
    if div > bus.read(regs::div(idx)) {
        bus.write(regs::div(idx), div);
    }

    let via_aux = domain.has_glitchless_mux() && src == regs::SYS_SRC_AUX;
    if via_aux {
        // Sai do AUX (SRC = 0) antes de mexer em AUXSRC
        bus.clear_bits(regs::ctrl(idx), regs::CTRL_SRC_MASK);
        wait_for(bus, regs::selected(idx), 1, 1)?;
    } else if !domain.has_glitchless_mux() {
        bus.clear_bits(regs::ctrl(idx), regs::CTRL_ENABLE);
        let current = tree.freq_hz(domain);
        if current > 0 {
            // Espera o divisor propagar o disable (3 ciclos do clock antigo)
            let sys = tree.freq_hz(ClockDomain::Sys);
            nop_delay(3 * (sys / current + 1));
        }
    }

    bus.write_masked(
        regs::ctrl(idx),
        auxsrc << regs::CTRL_AUXSRC_SHIFT,
        regs::CTRL_AUXSRC_MASK,
    );

    if domain.has_glitchless_mux() {
        bus.write_masked(regs::ctrl(idx), src, regs::CTRL_SRC_MASK);
        wait_for(bus, regs::selected(idx), 1 << src, 1 << src)?;
    }

    bus.set_bits(regs::ctrl(idx), regs::CTRL_ENABLE);
    bus.write(regs::div(idx), div);

    tree.set(domain, Some(source), div);
    Ok(())
}

/// Para um domínio sem mux glitchless.
pub fn stop<B: RegisterBus>(bus: &mut B, tree: &mut ClockTree, domain: ClockDomain) {
    bus.clear_bits(regs::ctrl(domain.index()), regs::CTRL_ENABLE);
    let div = tree.divider(domain);
    tree.set(domain, None, div);
}

/// Muda só o mux glitchless (sem tocar no divisor) e espera SELECTED.
pub fn select_glitchless<B: RegisterBus>(
    bus: &mut B,
    tree: &mut ClockTree,
    domain: ClockDomain,
    source: ClockSource,
) -> ClockResult<()> {
    if !domain.has_glitchless_mux() {
        return Err(ClockError::InvalidSource);
    }
    let (src, _) = selector(domain, source)?;
    let idx = domain.index();
    bus.write_masked(regs::ctrl(idx), src, regs::CTRL_SRC_MASK);
    wait_for(bus, regs::selected(idx), 1 << src, 1 << src)?;
    tree.set_source(domain, source);
    Ok(())
}

/// Loga a frequência de cada domínio.
pub fn report(tree: &ClockTree) {
    for domain in ClockDomain::ALL {
        crate::klog!(domain.name());
        crate::klog!(" -> "; tree.freq_hz(domain));
        crate::klog!(" Hz");
        crate::knl!();
    }
}
