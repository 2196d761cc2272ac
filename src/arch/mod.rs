//! # Camada de Arquitetura
//!
//! Única ponte entre a lógica do firmware e a CPU real. Seleciona a
//! implementação por `cfg`:
//!
//! - `rp2350`: Cortex-M33 bare-metal (alvo `thumbv8m.main-none-eabihf`).
//! - `host`: implementação de mentira para rodar os testes no PC.
//!
//! O resto do firmware importa apenas `crate::arch::Cpu` e `InterruptGuard`.

pub mod multicore;
pub mod traits;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod rp2350;

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use rp2350 as platform;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub mod host;

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
pub use host as platform;

pub use platform::Cpu;
pub use traits::*;

/// Seção crítica: mascara interrupções até sair do escopo.
///
/// Usada pelas transições de clock/QMI, que não podem ser observadas pela
/// metade por código de interrupção.
pub struct InterruptGuard {
    state: u32,
}

impl InterruptGuard {
    pub fn new() -> Self {
        Self {
            state: Cpu::save_and_disable_interrupts(),
        }
    }
}

impl Drop for InterruptGuard {
    fn drop(&mut self) {
        Cpu::restore_interrupts(self.state);
    }
}

/// Atraso de `count` instruções NOP.
///
/// Para latências de comando abaixo da granularidade de qualquer timer.
#[inline(always)]
pub fn nop_delay(count: u32) {
    for _ in 0..count {
        Cpu::nop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_masks_and_restores() {
        assert!(Cpu::are_interrupts_enabled());
        {
            let _outer = InterruptGuard::new();
            assert!(!Cpu::are_interrupts_enabled());
            {
                let _inner = InterruptGuard::new();
                assert!(!Cpu::are_interrupts_enabled());
            }
            // O guard interno restaura o estado salvo (ainda mascarado)
            assert!(!Cpu::are_interrupts_enabled());
        }
        assert!(Cpu::are_interrupts_enabled());
    }
}
