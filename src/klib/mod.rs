//! Firmware Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do firmware.
//! Funciona como uma extensão da `core` library.

pub mod glob;
pub mod ring;

#[cfg(feature = "self_test")]
pub mod test_framework;

pub use ring::RingBuffer;
