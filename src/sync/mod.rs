//! # Sincronização entre os dois cores
//!
//! - `Spinlock`: exclusão mútua curta, com IRQs mascaradas enquanto presa.
//! - `SpscQueue`: fila lock-free de produtor/consumidor únicos (teclado).
//!
//! Não existe primitiva que bloqueie: nenhum core pode esperar o outro por
//! tempo indeterminado.

pub mod spinlock;
pub mod spsc;

pub use spinlock::{Spinlock, SpinlockGuard};
pub use spsc::SpscQueue;
