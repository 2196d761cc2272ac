//! Tempo e Eventos Periódicos
//!
//! Tudo em microssegundos do relógio monotônico (`hal::Monotonic`).
//! Eventos são disparados por borda: passado o limiar, disparam UMA vez e a
//! referência vai para `now`. Não há acúmulo de atrasos.

pub mod deadline;
pub mod periodic;

pub use deadline::Deadline;
pub use periodic::{EventKind, PeriodicEvent, Trigger};

/// Período de publicação de quadro (~60 Hz).
pub const VSYNC_PERIOD_US: u64 = 16_667;

/// Tick de um segundo.
pub const ONE_SECOND_US: u64 = 1_000_000;

/// Converte milissegundos para microssegundos.
#[inline]
pub const fn ms_to_us(ms: u64) -> u64 {
    ms * 1000
}
