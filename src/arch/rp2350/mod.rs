//! Cortex-M33 (RP2350).
//!
//! Primitivas de CPU via inline asm: PRIMASK, WFI, barreiras, SEV.

pub mod multicore;
pub mod start;

use super::traits::CpuOps;
use ::core::arch::asm;

pub struct Cpu;

impl CpuOps for Cpu {
    #[inline]
    fn halt() {
        unsafe { asm!("wfi", options(nomem, nostack, preserves_flags)) }
    }

    #[inline]
    fn disable_interrupts() {
        unsafe { asm!("cpsid i", options(nomem, nostack, preserves_flags)) }
    }

    #[inline]
    fn enable_interrupts() {
        unsafe { asm!("cpsie i", options(nomem, nostack, preserves_flags)) }
    }

    #[inline]
    fn are_interrupts_enabled() -> bool {
        let primask: u32;
        unsafe { asm!("mrs {}, PRIMASK", out(reg) primask, options(nomem, nostack, preserves_flags)) }
        primask & 1 == 0
    }

    #[inline]
    fn save_and_disable_interrupts() -> u32 {
        let primask: u32;
        unsafe {
            asm!(
                "mrs {}, PRIMASK",
                "cpsid i",
                out(reg) primask,
                options(nomem, nostack, preserves_flags)
            );
        }
        primask
    }

    #[inline]
    fn restore_interrupts(state: u32) {
        unsafe { asm!("msr PRIMASK, {}", in(reg) state, options(nomem, nostack, preserves_flags)) }
    }

    #[inline(always)]
    fn nop() {
        unsafe { asm!("nop", options(nomem, nostack, preserves_flags)) }
    }
}

/// Send event (acorda o outro core de um WFE).
#[inline]
pub fn sev() {
    unsafe { asm!("sev", options(nomem, nostack, preserves_flags)) }
}

/// Data synchronization barrier.
#[inline]
pub fn dsb() {
    unsafe { asm!("dsb", options(nostack, preserves_flags)) }
}

/// Instruction synchronization barrier.
#[inline]
pub fn isb() {
    unsafe { asm!("isb", options(nostack, preserves_flags)) }
}
