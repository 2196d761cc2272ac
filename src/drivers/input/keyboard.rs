//! Fila de teclas
//!
//! Cada evento é uma palavra de 16 bits: byte baixo = código de tecla do
//! Mac, bit 15 = soltura.

use crate::sync::SpscQueue;

/// Profundidade da fila.
pub const KEY_QUEUE_DEPTH: usize = 16;

const RELEASE_BIT: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u8,
    pub release: bool,
}

impl KeyEvent {
    pub const fn encode(self) -> u16 {
        self.code as u16 | if self.release { RELEASE_BIT } else { 0 }
    }

    pub const fn decode(raw: u16) -> Self {
        Self {
            code: (raw & 0xff) as u8,
            release: raw & RELEASE_BIT != 0,
        }
    }
}

pub struct KeyQueue {
    queue: SpscQueue<KEY_QUEUE_DEPTH>,
}

impl KeyQueue {
    pub const fn new() -> Self {
        Self {
            queue: SpscQueue::new(),
        }
    }

    /// Lado HID. Fila cheia => evento descartado.
    pub fn push(&self, ev: KeyEvent) -> bool {
        let ok = self.queue.push(ev.encode());
        if !ok {
            crate::kdebug!("(Input) Fila de teclas cheia, codigo: ", ev.code);
        }
        ok
    }

    pub fn pop(&self) -> Option<KeyEvent> {
        self.queue.pop().map(KeyEvent::decode)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Default for KeyQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_middle_bits() {
        assert_eq!(
            KeyEvent::decode(0x8f3a),
            KeyEvent {
                code: 0x3a,
                release: true
            }
        );
        assert_eq!(
            KeyEvent::decode(0x0131),
            KeyEvent {
                code: 0x31,
                release: false
            }
        );
    }

    #[test]
    fn test_queue_is_bounded_and_fifo() {
        let q = KeyQueue::new();
        for code in 0..KEY_QUEUE_DEPTH as u8 {
            assert!(q.push(KeyEvent { code, release: false }));
        }
        assert!(!q.push(KeyEvent {
            code: 0xff,
            release: true
        }));
        assert_eq!(q.pop().map(|e| e.code), Some(0));
        assert_eq!(q.pop().map(|e| e.code), Some(1));
    }
}
