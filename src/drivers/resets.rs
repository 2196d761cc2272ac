//! Controle de reset dos blocos (RESETS).

use crate::hal::regs::resets;
use crate::hal::{wait_for, RegisterBus, Timeout};

/// Coloca os blocos de `mask` em reset.
pub fn reset_block<B: RegisterBus>(bus: &mut B, mask: u32) {
    bus.set_bits(resets::RESET, mask);
}

/// Tira os blocos de `mask` do reset e espera RESET_DONE.
pub fn unreset_block_wait<B: RegisterBus>(bus: &mut B, mask: u32) -> Result<(), Timeout> {
    bus.clear_bits(resets::RESET, mask);
    wait_for(bus, resets::RESET_DONE, mask, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::SimBus;

    #[test]
    fn test_unreset_waits_for_done() {
        let mut bus = SimBus::new();
        unreset_block_wait(&mut bus, resets::PLL_SYS | resets::PLL_USB).unwrap();
        assert_eq!(bus.peek(resets::RESET) & resets::PLL_SYS, 0);
    }

    #[test]
    fn test_unreset_times_out() {
        let mut bus = SimBus::new();
        bus.force(resets::RESET_DONE, 0);
        assert!(unreset_block_wait(&mut bus, resets::I2C0).is_err());
    }
}
