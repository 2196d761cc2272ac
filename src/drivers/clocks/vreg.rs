//! Regulador do núcleo (POWMAN VREG).
//!
//! Escritas no POWMAN exigem a senha nos 16 bits altos, por isso nada de
//! aliases atômicos aqui: leitura, montagem do valor e escrita completa.

use super::ClockResult;
use crate::hal::regs::vreg as regs;
use crate::hal::{wait_for, RegisterBus};

/// Tensões usadas pelo firmware (`VSEL = (mV - 550) / 50`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CoreVoltage {
    V1_10 = 11,
    V1_15 = 12,
    V1_20 = 13,
}

impl CoreVoltage {
    pub const fn vsel(self) -> u32 {
        self as u32
    }

    pub const fn millivolts(self) -> u32 {
        550 + 50 * self.vsel()
    }
}

/// Programa a tensão e espera o regulador terminar a transição.
pub fn set_voltage<B: RegisterBus>(bus: &mut B, voltage: CoreVoltage) -> ClockResult<()> {
    wait_for(bus, regs::VREG, regs::UPDATE_IN_PROGRESS, 0)?;

    let current = bus.read(regs::VREG) & 0xffff;
    let value = (current & !regs::VSEL_MASK) | (voltage.vsel() << regs::VSEL_SHIFT);
    bus.write(regs::VREG, regs::PASSWORD | value);

    wait_for(bus, regs::VREG, regs::UPDATE_IN_PROGRESS, 0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::clocks::ClockError;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_1v15_is_vsel_12() {
        assert_eq!(CoreVoltage::V1_15.vsel(), 12);
        assert_eq!(CoreVoltage::V1_15.millivolts(), 1150);
    }

    #[test]
    fn test_write_carries_password() {
        let mut bus = SimBus::new();
        bus.poke(regs::VREG, 0xb1);
        set_voltage(&mut bus, CoreVoltage::V1_15).unwrap();

        let w = bus.writes_to(regs::VREG);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0] & 0xffff_0000, regs::PASSWORD);
        assert_eq!((w[0] & regs::VSEL_MASK) >> regs::VSEL_SHIFT, 12);
        // Bits fora do VSEL preservados
        assert_eq!(w[0] & 0x1, 0x1);
    }

    #[test]
    fn test_update_never_finishes() {
        let mut bus = SimBus::new();
        bus.force(regs::VREG, regs::UPDATE_IN_PROGRESS);
        assert_eq!(set_voltage(&mut bus, CoreVoltage::V1_15), Err(ClockError::Timeout));
    }
}
