//! Fila lock-free de produtor único / consumidor único.
//!
//! Usada para os eventos de teclado: o core 0 (USB HID) empurra, o core 1
//! (loop do emulador) consome. Cheia => o evento novo é descartado.

use ::core::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

pub struct SpscQueue<const N: usize> {
    slots: [AtomicU16; N],
    /// Próxima posição de escrita (só o produtor escreve).
    head: AtomicUsize,
    /// Próxima posição de leitura (só o consumidor escreve).
    tail: AtomicUsize,
}

impl<const N: usize> SpscQueue<N> {
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: AtomicU16 = AtomicU16::new(0);

    pub const fn new() -> Self {
        Self {
            slots: [Self::EMPTY; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Produtor. `false` se a fila estava cheia.
    pub fn push(&self, value: u16) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= N {
            return false;
        }
        self.slots[head % N].store(value, Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        true
    }

    /// Consumidor.
    pub fn pop(&self) -> Option<u16> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail == head {
            return None;
        }
        let value = self.slots[tail % N].load(Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.head
            .load(Ordering::Acquire)
            .wrapping_sub(self.tail.load(Ordering::Acquire))
    }
}

impl<const N: usize> Default for SpscQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let q: SpscQueue<4> = SpscQueue::new();
        assert!(q.is_empty());
        q.push(1);
        q.push(2);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_full_drops_new_value() {
        let q: SpscQueue<2> = SpscQueue::new();
        assert!(q.push(1));
        assert!(q.push(2));
        assert!(!q.push(3));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(1));
        assert!(q.push(4));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(4));
    }

    #[test]
    fn test_cross_thread() {
        use std::sync::Arc;
        let q = Arc::new(SpscQueue::<8>::new());
        let producer = {
            let q = q.clone();
            std::thread::spawn(move || {
                for i in 0..1000u16 {
                    while !q.push(i) {
                        std::hint::spin_loop();
                    }
                }
            })
        };
        let mut expected = 0u16;
        while expected < 1000 {
            if let Some(v) = q.pop() {
                assert_eq!(v, expected);
                expected += 1;
            }
        }
        producer.join().unwrap();
    }
}
