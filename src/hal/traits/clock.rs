//! Relógio monotônico em microssegundos.

/// Fonte de tempo monotônico (µs desde o boot). Nunca volta para trás.
pub trait Monotonic {
    fn now_us(&self) -> u64;
}

impl<M: Monotonic + ?Sized> Monotonic for &M {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
