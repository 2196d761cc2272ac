//! Caminho Fatal.
//!
//! Erros irrecuperáveis (PLL que não trava, frequência de vídeo
//! inalcançável, codec mudo no setup) e panics do Rust terminam aqui.
//!
//! # Comportamento
//! 1. Desabilita interrupções (evita reentrada).
//! 2. Loga o motivo na serial.
//! 3. Trava o core (wfi com IRQs mascaradas).

use crate::arch::{Cpu, CpuOps};

/// Encerra o core com diagnóstico.
#[cold]
pub fn fatal(reason: &str) -> ! {
    Cpu::disable_interrupts();
    crate::kerror!("================ FATAL ================");
    crate::kerror!(reason);
    crate::kerror!("=======================================");
    Cpu::hang();
}

#[cfg(all(target_arch = "arm", target_os = "none"))]
#[panic_handler]
fn panic(info: &::core::panic::PanicInfo) -> ! {
    Cpu::disable_interrupts();
    crate::kerror!("================ PANIC ================");
    if let Some(location) = info.location() {
        crate::klog!(location.file());
        crate::klog!(":"; location.line());
        crate::knl!();
    }
    if let Some(msg) = info.message().as_str() {
        crate::kerror!(msg);
    }
    crate::kerror!("=======================================");
    Cpu::hang();
}
