//! CPU do host (testes).
//!
//! Não existe PRIMASK no PC: o estado de máscara é só um flag, por thread nos
//! testes (o harness roda testes em paralelo) e global fora deles.

use super::traits::CpuOps;

#[cfg(test)]
std::thread_local! {
    static MASKED: ::core::cell::Cell<bool> = const { ::core::cell::Cell::new(false) };
}

#[cfg(test)]
fn masked() -> bool {
    MASKED.with(|m| m.get())
}

#[cfg(test)]
fn set_masked(value: bool) {
    MASKED.with(|m| m.set(value));
}

#[cfg(not(test))]
static MASKED: ::core::sync::atomic::AtomicBool = ::core::sync::atomic::AtomicBool::new(false);

#[cfg(not(test))]
fn masked() -> bool {
    MASKED.load(::core::sync::atomic::Ordering::Relaxed)
}

#[cfg(not(test))]
fn set_masked(value: bool) {
    MASKED.store(value, ::core::sync::atomic::Ordering::Relaxed);
}

pub struct Cpu;

impl CpuOps for Cpu {
    fn halt() {
        ::core::hint::spin_loop();
    }

    fn disable_interrupts() {
        set_masked(true);
    }

    fn enable_interrupts() {
        set_masked(false);
    }

    fn are_interrupts_enabled() -> bool {
        !masked()
    }

    fn save_and_disable_interrupts() -> u32 {
        let state = masked() as u32;
        set_masked(true);
        state
    }

    fn restore_interrupts(state: u32) {
        set_masked(state != 0);
    }

    fn nop() {
        ::core::hint::spin_loop();
    }
}
