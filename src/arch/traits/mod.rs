//! Traits da camada de arquitetura.
//! Interfaces públicas que o resto do firmware usa para falar com a CPU.

pub mod cpu;

// Re-exportar para facilitar uso: `use crate::arch::traits::CpuOps;`
pub use cpu::CpuOps;
