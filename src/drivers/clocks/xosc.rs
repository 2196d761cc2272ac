//! Oscilador a cristal (12 MHz).

use super::ClockResult;
use crate::hal::regs::xosc as regs;
use crate::hal::{wait_for, RegisterBus};

const CTRL_ENABLE_MASK: u32 = 0xfff << 12;

/// Liga o XOSC e espera STABLE. Já rodando: nada a fazer.
pub fn init<B: RegisterBus>(bus: &mut B) -> ClockResult<()> {
    if bus.read(regs::STATUS) & regs::STATUS_STABLE != 0 {
        return Ok(());
    }

    bus.write(regs::CTRL, regs::CTRL_FREQ_RANGE_1_15MHZ);
    bus.write(regs::STARTUP, regs::STARTUP_DELAY);
    bus.write_masked(regs::CTRL, regs::CTRL_ENABLE, CTRL_ENABLE_MASK);
    wait_for(bus, regs::STATUS, regs::STATUS_STABLE, regs::STATUS_STABLE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::clocks::ClockError;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_start_xosc() {
        let mut bus = SimBus::new();
        init(&mut bus).unwrap();
        assert_eq!(bus.peek(regs::STARTUP), regs::STARTUP_DELAY);
        assert_eq!(bus.peek(regs::CTRL) & CTRL_ENABLE_MASK, regs::CTRL_ENABLE);
    }

    #[test]
    fn test_already_running_is_untouched() {
        let mut bus = SimBus::new();
        bus.poke(regs::CTRL, regs::CTRL_ENABLE | regs::CTRL_FREQ_RANGE_1_15MHZ);
        init(&mut bus).unwrap();
        assert!(bus.writes.is_empty());
    }

    #[test]
    fn test_never_stable() {
        let mut bus = SimBus::new();
        bus.force(regs::STATUS, 0);
        assert_eq!(init(&mut bus), Err(ClockError::Timeout));
    }
}
