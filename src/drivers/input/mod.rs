//! Entrada (HID USB -> emulador)
//!
//! O core 0 (pilha USB host) é o único escritor; o core 1 (loop do
//! emulador) é o único leitor. Nada aqui bloqueia ou usa lock.
//!
//! - `mouse`: cursor absoluto + botões, convertidos em deltas pelo leitor.
//! - `keyboard`: fila de eventos de tecla de profundidade fixa.

pub mod keyboard;
pub mod mouse;

pub use keyboard::{KeyEvent, KeyQueue};
pub use mouse::{CursorState, InputTracker, MouseDelta};

/// Estado compartilhado entre os cores.
pub struct SharedInput {
    pub cursor: CursorState,
    pub keys: KeyQueue,
}

impl SharedInput {
    pub const fn new() -> Self {
        Self {
            cursor: CursorState::new(),
            keys: KeyQueue::new(),
        }
    }
}

impl Default for SharedInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Instância global: escrita pelos callbacks HID, lida pelo scheduler.
pub static INPUT: SharedInput = SharedInput::new();
