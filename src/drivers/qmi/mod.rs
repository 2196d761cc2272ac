// =============================================================================
// QMI - QSPI MEMORY INTERFACE
// =============================================================================
//
// Controlador das duas janelas XIP: M0 (flash, CS0) e M1 (PSRAM, CS1).
//
// - Modo direto: transferências byte a byte com CS controlado por software,
//   usado para sondar e configurar a PSRAM.
// - Timing/formatos das janelas: codificados a partir de structs tipadas.
//
// ATENÇÃO: mudar o timing do M0 com o código rodando da flash é fatal. Quem
// chama estas funções roda da RAM (`.data.ramfunc`) e com IRQs mascaradas.
//
// =============================================================================

pub mod psram;

use crate::hal::regs::{io_qspi, qmi as regs, xip};
use crate::hal::{wait_for, RegisterBus, Timeout};
use bitflags::bitflags;

bitflags! {
    /// DIRECT_CSR
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DirectCsr: u32 {
        const EN = 1 << 0;
        const BUSY = 1 << 1;
        const ASSERT_CS0N = 1 << 2;
        const ASSERT_CS1N = 1 << 3;
        const AUTO_CS0N = 1 << 6;
        const AUTO_CS1N = 1 << 7;
        const TXFULL = 1 << 10;
        const TXEMPTY = 1 << 11;
        const RXEMPTY = 1 << 16;
        const RXFULL = 1 << 17;
    }
}

/// Largura de uma fase de transferência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Width {
    Single = 0,
    Dual = 1,
    Quad = 2,
}

/// Divisor do modo direto durante a sondagem (lento e seguro em qualquer clk_sys).
pub const DIRECT_CLKDIV: u32 = 30;

/// Divisor do M0 antes de subir o clk_sys.
pub const FLASH_SAFE_CLKDIV: u32 = 6;

// =============================================================================
// TIMING
// =============================================================================

/// Campos de Mx_TIMING.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QmiTiming {
    pub cooldown: u32,
    pub pagebreak: u32,
    pub select_hold: u32,
    /// Unidades de 64 ciclos de clk_sys.
    pub max_select: u32,
    /// Ciclos de clk_sys.
    pub min_deselect: u32,
    /// Meios ciclos de clk_sys.
    pub rxdelay: u32,
    pub clkdiv: u32,
}

impl QmiTiming {
    pub const fn encode(&self) -> u32 {
        ((self.cooldown & 0x3) << regs::TIMING_COOLDOWN_SHIFT)
            | ((self.pagebreak & 0x3) << regs::TIMING_PAGEBREAK_SHIFT)
            | ((self.select_hold & 0x3) << regs::TIMING_SELECT_HOLD_SHIFT)
            | ((self.max_select & 0x3f) << regs::TIMING_MAX_SELECT_SHIFT)
            | ((self.min_deselect & 0x1f) << regs::TIMING_MIN_DESELECT_SHIFT)
            | ((self.rxdelay & 0x7) << regs::TIMING_RXDELAY_SHIFT)
            | ((self.clkdiv & 0xff) << regs::TIMING_CLKDIV_SHIFT)
    }
}

/// Timing da flash com clk_sys alto: cooldown 1, RX delay 2, divisor 2.
pub const FLASH_FAST_TIMING: QmiTiming = QmiTiming {
    cooldown: 1,
    pagebreak: 0,
    select_hold: 0,
    max_select: 0,
    min_deselect: 0,
    rxdelay: 2,
    clkdiv: 2,
};

/// Formato de leitura/escrita (Mx_RFMT / Mx_WFMT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QmiFormat {
    pub prefix_width: Width,
    pub addr_width: Width,
    pub suffix_width: Width,
    pub dummy_width: Width,
    pub data_width: Width,
    /// Bits de prefixo (0 ou 8).
    pub prefix_bits: u32,
    /// Bits de dummy (múltiplo de 4, até 28).
    pub dummy_bits: u32,
}

impl QmiFormat {
    pub const fn encode(&self) -> u32 {
        let prefix_len = if self.prefix_bits == 8 { 1 } else { 0 };
        let dummy_len = self.dummy_bits / 4;
        ((self.prefix_width as u32) << regs::FMT_PREFIX_WIDTH_SHIFT)
            | ((self.addr_width as u32) << regs::FMT_ADDR_WIDTH_SHIFT)
            | ((self.suffix_width as u32) << regs::FMT_SUFFIX_WIDTH_SHIFT)
            | ((self.dummy_width as u32) << regs::FMT_DUMMY_WIDTH_SHIFT)
            | ((self.data_width as u32) << regs::FMT_DATA_WIDTH_SHIFT)
            | (prefix_len << regs::FMT_PREFIX_LEN_SHIFT)
            | (dummy_len << regs::FMT_DUMMY_LEN_SHIFT)
    }
}

// =============================================================================
// FLASH (M0)
// =============================================================================

/// Leitura pela janela sem cache: força o QMI a aplicar o timing novo.
#[inline(always)]
pub fn xip_dummy_read<B: RegisterBus>(bus: &mut B) {
    let _ = bus.read(xip::NOCACHE_NOALLOC_BASE);
}

/// Divisor do M0 em 6 antes de subir o clk_sys.
#[inline(always)]
pub fn slow_flash_clock<B: RegisterBus>(bus: &mut B) {
    bus.write_masked(regs::M0_TIMING, FLASH_SAFE_CLKDIV, regs::TIMING_CLKDIV_MASK);
}

/// Aplica o timing rápido do M0.
///
/// O QMI não tem flag de busy para o XIP: espera o CS da flash ficar alto.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
pub fn apply_flash_timing<B: RegisterBus>(bus: &mut B) -> Result<(), Timeout> {
    wait_for(
        bus,
        io_qspi::SS_STATUS,
        io_qspi::STATUS_OUTTOPAD,
        io_qspi::STATUS_OUTTOPAD,
    )?;
    bus.write(regs::M0_TIMING, FLASH_FAST_TIMING.encode());
    xip_dummy_read(bus);
    Ok(())
}

// =============================================================================
// MODO DIRETO
// =============================================================================

/// Liga o modo direto e espera o cooldown do último acesso XIP.
pub fn direct_enter<B: RegisterBus>(bus: &mut B, clkdiv: u32) -> Result<(), Timeout> {
    bus.write(
        regs::DIRECT_CSR,
        (clkdiv << regs::CSR_CLKDIV_SHIFT) | DirectCsr::EN.bits(),
    );
    wait_for(bus, regs::DIRECT_CSR, DirectCsr::BUSY.bits(), 0)
}

/// Desliga o modo direto e solta o CS1.
pub fn direct_exit<B: RegisterBus>(bus: &mut B) {
    bus.clear_bits(
        regs::DIRECT_CSR,
        (DirectCsr::ASSERT_CS1N | DirectCsr::EN).bits(),
    );
}

pub fn cs1_assert<B: RegisterBus>(bus: &mut B) {
    bus.set_bits(regs::DIRECT_CSR, DirectCsr::ASSERT_CS1N.bits());
}

pub fn cs1_release<B: RegisterBus>(bus: &mut B) {
    bus.clear_bits(regs::DIRECT_CSR, DirectCsr::ASSERT_CS1N.bits());
}

/// Envia um byte e devolve o byte recebido na mesma transferência.
pub fn direct_transfer<B: RegisterBus>(bus: &mut B, byte: u8, width: Width) -> Result<u8, Timeout> {
    let mut tx = byte as u32;
    if width != Width::Single {
        tx |= regs::TX_OE | ((width as u32) << regs::TX_IWIDTH_SHIFT);
    }
    bus.write(regs::DIRECT_TX, tx);

    wait_for(
        bus,
        regs::DIRECT_CSR,
        DirectCsr::TXEMPTY.bits(),
        DirectCsr::TXEMPTY.bits(),
    )?;
    wait_for(bus, regs::DIRECT_CSR, DirectCsr::BUSY.bits(), 0)?;
    Ok((bus.read(regs::DIRECT_RX) & 0xff) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_flash_fast_timing_word() {
        assert_eq!(FLASH_FAST_TIMING.encode(), 0x4000_0202);
    }

    #[test]
    fn test_timing_fields_are_masked() {
        let t = QmiTiming {
            max_select: 0x40,
            clkdiv: 0x1ff,
            ..Default::default()
        };
        assert_eq!(t.encode(), 0xff);
    }

    #[test]
    fn test_slow_flash_keeps_other_fields() {
        let mut bus = SimBus::new();
        bus.poke(regs::M0_TIMING, 0x4000_0104);
        slow_flash_clock(&mut bus);
        assert_eq!(bus.peek(regs::M0_TIMING), 0x4000_0106);
    }

    #[test]
    fn test_apply_flash_timing_ends_with_dummy_read() {
        let mut bus = SimBus::new();
        apply_flash_timing(&mut bus).unwrap();
        assert_eq!(bus.peek(regs::M0_TIMING), 0x4000_0202);
        assert_eq!(bus.dummy_reads, 1);
        assert_eq!(*bus.reads.last().unwrap(), xip::NOCACHE_NOALLOC_BASE);
    }

    #[test]
    fn test_flash_timing_waits_for_deselect() {
        let mut bus = SimBus::new();
        bus.force(io_qspi::SS_STATUS, 0);
        assert!(apply_flash_timing(&mut bus).is_err());
        assert!(bus.writes_to(regs::M0_TIMING).is_empty());
    }

    #[test]
    fn test_quad_transfer_sets_width_and_oe() {
        let mut bus = SimBus::new();
        direct_transfer(&mut bus, 0xf5, Width::Quad).unwrap();
        let tx = bus.writes_to(regs::DIRECT_TX)[0];
        assert_eq!(tx & 0xff, 0xf5);
        assert_ne!(tx & regs::TX_OE, 0);
        assert_eq!((tx >> regs::TX_IWIDTH_SHIFT) & 0x3, 2);
    }
}
