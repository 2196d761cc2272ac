//! Hardware Abstraction Layer (HAL)
//!
//! Todo acesso a registrador do firmware passa por `RegisterBus`:
//!
//! - `MmioBus`: leitura/escrita volátil no espaço de endereços real, com os
//!   aliases atômicos SET/CLR/XOR do RP2350.
//! - `sim::SimBus` (apenas testes): modelo dos blocos usados no boot
//!   (clocks, PLL, VREG, XOSC, QMI + PSRAM, XIP).
//!
//! Nenhum busy-wait é ilimitado: `wait_for` desiste após `SPIN_LIMIT`
//! leituras e devolve `Timeout`, e quem chamou decide entre fatal e degradar.

pub mod mmio;
pub mod regs;
pub mod traits;

#[cfg(test)]
pub mod sim;

pub use mmio::MmioBus;
pub use traits::*;

/// Máximo de leituras de um bit de status antes de desistir.
pub const SPIN_LIMIT: u32 = 1_000_000;

/// Um bit de status não assumiu o valor esperado dentro de `SPIN_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeout {
    /// Registrador que estava sendo observado.
    pub addr: u32,
}

/// Espera `read(addr) & mask == expected`, no máximo `SPIN_LIMIT` leituras.
pub fn wait_for<B: RegisterBus + ?Sized>(
    bus: &mut B,
    addr: u32,
    mask: u32,
    expected: u32,
) -> Result<(), Timeout> {
    for _ in 0..SPIN_LIMIT {
        if bus.read(addr) & mask == expected {
            return Ok(());
        }
        ::core::hint::spin_loop();
    }
    crate::kwarn!("(HAL) wait_for: timeout no registrador ", addr);
    Err(Timeout { addr })
}
