//! Core Module
//!
//! Lógica central do firmware, independente de registradores: bring-up,
//! logging, caminho fatal, tempo e o loop de eventos.

#[macro_use]
pub mod logging;

pub mod config;
pub mod emulator;
pub mod entry;
pub mod panic;
pub mod scheduler;
#[cfg(feature = "self_test")]
pub mod selftest;
pub mod time;

pub use panic::fatal;
