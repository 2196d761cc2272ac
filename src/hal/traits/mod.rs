//! Traits do HAL
//!
//! Interfaces abstratas que os drivers usam para falar com o hardware.

pub mod bus;
pub mod clock;

pub use bus::*;
pub use clock::*;
