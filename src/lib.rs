//! Picomac Firmware Library.
//!
//! Ponto central de exportação dos módulos do firmware.
//! Tudo que toca hardware passa por `hal::RegisterBus`, o que permite rodar
//! a lógica de sequenciamento (clocks, PSRAM, loop de eventos) no host,
//! contra um barramento simulado.

#![cfg_attr(not(test), no_std)]

// --- Logging primeiro: os macros `k*!` precisam estar em escopo textual ---
#[macro_use]
pub mod core; // Entry, logging, fatal, tempo, scheduler

// --- Módulos de Baixo Nível (Hardware) ---
pub mod arch; // CPU (máscara de IRQ, NOP, multicore)
pub mod drivers; // Clocks, QMI/PSRAM, UART, I2C, áudio, vídeo, disco
pub mod hal; // Barramento de registradores (MMIO / simulado)

// --- Utilitários ---
pub mod klib; // Ring buffer, glob, framework de self-test
pub mod sync; // Spinlock, fila SPSC
pub mod sys; // Códigos de erro
