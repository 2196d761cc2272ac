//! PLLs (SYS e USB).
//!
//! `out = (ref / refdiv) * fbdiv / (postdiv1 * postdiv2)`, com a referência
//! vinda do XOSC. A configuração é validada inteira antes de qualquer
//! escrita em registrador.

use super::{ClockError, ClockResult};
use crate::drivers::resets;
use crate::hal::regs::{pll as regs, resets as rst};
use crate::hal::{wait_for, RegisterBus};
use bitflags::bitflags;

pub const REF_KHZ: u32 = 12_000;
pub const REFDIV: u32 = 1;
pub const VCO_MIN_KHZ: u32 = 750_000;
pub const VCO_MAX_KHZ: u32 = 1_600_000;
pub const FBDIV_MIN: u32 = 16;
pub const FBDIV_MAX: u32 = 320;
pub const POSTDIV_MAX: u32 = 7;

bitflags! {
    /// Registrador PWR: bits de power-down (1 = desligado).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PllPower: u32 {
        const PD = 1 << 0;
        const DSMPD = 1 << 2;
        const POSTDIVPD = 1 << 3;
        const VCOPD = 1 << 5;
    }
}

/// Qual PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pll {
    Sys,
    Usb,
}

impl Pll {
    const fn base(self) -> u32 {
        match self {
            Self::Sys => regs::SYS_BASE,
            Self::Usb => regs::USB_BASE,
        }
    }

    const fn reset_bit(self) -> u32 {
        match self {
            Self::Sys => rst::PLL_SYS,
            Self::Usb => rst::PLL_USB,
        }
    }
}

/// Configuração validada de PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllConfig {
    pub vco_khz: u32,
    pub fbdiv: u32,
    pub postdiv1: u32,
    pub postdiv2: u32,
}

impl PllConfig {
    /// Valida VCO (múltiplo da referência, dentro da faixa) e pós-divisores.
    pub const fn new(vco_khz: u32, postdiv1: u32, postdiv2: u32) -> ClockResult<Self> {
        if vco_khz < VCO_MIN_KHZ || vco_khz > VCO_MAX_KHZ || vco_khz % REF_KHZ != 0 {
            return Err(ClockError::InvalidPll);
        }
        let fbdiv = vco_khz / REF_KHZ;
        if fbdiv < FBDIV_MIN || fbdiv > FBDIV_MAX {
            return Err(ClockError::InvalidPll);
        }
        if postdiv1 == 0 || postdiv1 > POSTDIV_MAX || postdiv2 == 0 || postdiv2 > POSTDIV_MAX {
            return Err(ClockError::InvalidPll);
        }
        Ok(Self {
            vco_khz,
            fbdiv,
            postdiv1,
            postdiv2,
        })
    }

    pub const fn output_khz(&self) -> u32 {
        self.vco_khz / (self.postdiv1 * self.postdiv2)
    }

    pub const fn output_hz(&self) -> u32 {
        self.output_khz() * 1000
    }

    const fn prim(&self) -> u32 {
        (self.postdiv1 << regs::PRIM_POSTDIV1_SHIFT) | (self.postdiv2 << regs::PRIM_POSTDIV2_SHIFT)
    }

    /// Busca exaustiva por uma saída de exatamente `target_khz`.
    ///
    /// fbdiv de 320 a 16, postdiv1 de 7 a 1, postdiv2 de postdiv1 a 1; o
    /// primeiro acerto exato vence (VCO mais alto, menor jitter).
    pub fn search(target_khz: u32) -> Option<Self> {
        if target_khz == 0 {
            return None;
        }
        for fbdiv in (FBDIV_MIN..=FBDIV_MAX).rev() {
            let vco_khz = fbdiv * REF_KHZ;
            if !(VCO_MIN_KHZ..=VCO_MAX_KHZ).contains(&vco_khz) {
                continue;
            }
            for postdiv1 in (1..=POSTDIV_MAX).rev() {
                for postdiv2 in (1..=postdiv1).rev() {
                    let div = postdiv1 * postdiv2;
                    if vco_khz % div == 0 && vco_khz / div == target_khz {
                        return Some(Self {
                            vco_khz,
                            fbdiv,
                            postdiv1,
                            postdiv2,
                        });
                    }
                }
            }
        }
        None
    }
}

/// Programa e trava um PLL.
///
/// Se já estiver travado com a mesma configuração, não faz nada.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
pub fn init<B: RegisterBus>(bus: &mut B, pll: Pll, cfg: &PllConfig) -> ClockResult<()> {
    let base = pll.base();

    let cs = bus.read(base + regs::CS);
    if cs & regs::CS_LOCK != 0
        && cs & regs::CS_REFDIV_MASK == REFDIV
        && bus.read(base + regs::FBDIV_INT) & 0xfff == cfg.fbdiv
        && bus.read(base + regs::PRIM) == cfg.prim()
    {
        return Ok(());
    }

    resets::reset_block(bus, pll.reset_bit());
    resets::unreset_block_wait(bus, pll.reset_bit())?;

    bus.write(base + regs::CS, REFDIV);
    bus.write(base + regs::FBDIV_INT, cfg.fbdiv);

    // Liga o VCO e espera o lock
    bus.clear_bits(base + regs::PWR, (PllPower::PD | PllPower::VCOPD).bits());
    wait_for(bus, base + regs::CS, regs::CS_LOCK, regs::CS_LOCK)?;

    bus.write(base + regs::PRIM, cfg.prim());
    bus.clear_bits(base + regs::PWR, PllPower::POSTDIVPD.bits());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_search_126mhz() {
        let cfg = PllConfig::search(126_000).unwrap();
        assert_eq!(cfg.vco_khz, 1_512_000);
        assert_eq!((cfg.postdiv1, cfg.postdiv2), (6, 2));
        assert_eq!(cfg.output_khz(), 126_000);
    }

    #[test]
    fn test_search_prefers_highest_vco() {
        // 132 MHz: 1584 MHz / (6*2) aparece antes de 792 MHz / 6
        let cfg = PllConfig::search(132_000).unwrap();
        assert_eq!(cfg.vco_khz, 1_584_000);
        assert_eq!(cfg.output_khz(), 132_000);
    }

    #[test]
    fn test_search_unreachable() {
        assert_eq!(PllConfig::search(126_001), None);
        assert_eq!(PllConfig::search(0), None);
        // Acima do VCO máximo
        assert_eq!(PllConfig::search(1_700_000), None);
    }

    #[test]
    fn test_config_validation() {
        assert!(PllConfig::new(1_584_000, 3, 1).is_ok());
        assert_eq!(PllConfig::new(1_584_000, 3, 1).unwrap().output_hz(), 528_000_000);
        assert_eq!(PllConfig::new(1_700_000, 3, 1), Err(ClockError::InvalidPll));
        assert_eq!(PllConfig::new(1_584_001, 3, 1), Err(ClockError::InvalidPll));
        assert_eq!(PllConfig::new(1_584_000, 8, 1), Err(ClockError::InvalidPll));
        assert_eq!(PllConfig::new(1_584_000, 3, 0), Err(ClockError::InvalidPll));
    }

    #[test]
    fn test_init_locks_then_enables_postdiv() {
        let mut bus = SimBus::new();
        let cfg = PllConfig::new(1_584_000, 3, 1).unwrap();
        init(&mut bus, Pll::Usb, &cfg).unwrap();

        let base = regs::USB_BASE;
        assert_eq!(bus.peek(base + regs::FBDIV_INT), 132);
        assert_eq!(bus.peek(base + regs::PRIM), (3 << 16) | (1 << 12));
        assert_eq!(bus.peek(base + regs::PWR) & PllPower::POSTDIVPD.bits(), 0);

        // PRIM só depois de o lock ser observado
        let lock_read = bus.reads.iter().rposition(|&a| a == base + regs::CS).unwrap();
        assert!(lock_read > 0);
        assert!(bus.first_write(base + regs::PRIM) > bus.first_write(base + regs::FBDIV_INT));
    }

    #[test]
    fn test_init_skips_when_already_locked() {
        let mut bus = SimBus::new();
        let cfg = PllConfig::new(1_584_000, 3, 1).unwrap();
        init(&mut bus, Pll::Usb, &cfg).unwrap();
        let count = bus.writes.len();
        init(&mut bus, Pll::Usb, &cfg).unwrap();
        assert_eq!(bus.writes.len(), count);
    }

    #[test]
    fn test_lock_timeout() {
        let mut bus = SimBus::new();
        bus.force(regs::SYS_BASE + regs::CS, 0);
        let cfg = PllConfig::search(126_000).unwrap();
        assert_eq!(init(&mut bus, Pll::Sys, &cfg), Err(ClockError::Timeout));
    }
}
