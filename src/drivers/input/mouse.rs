//! Cursor absoluto e conversão para deltas.

use ::core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

/// Escrito apenas pelo core 0.
pub struct CursorState {
    x: AtomicI32,
    y: AtomicI32,
    buttons: AtomicU8,
}

impl CursorState {
    pub const fn new() -> Self {
        Self {
            x: AtomicI32::new(0),
            y: AtomicI32::new(0),
            buttons: AtomicU8::new(0),
        }
    }

    /// Relatório HID relativo.
    pub fn move_by(&self, dx: i32, dy: i32) {
        // Escritor único
        let x = self.x.load(Ordering::Relaxed);
        self.x.store(x.wrapping_add(dx), Ordering::Relaxed);
        let y = self.y.load(Ordering::Relaxed);
        self.y.store(y.wrapping_add(dy), Ordering::Relaxed);
    }

    pub fn set_buttons(&self, mask: u8) {
        self.buttons.store(mask, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (i32, i32, u8) {
        (
            self.x.load(Ordering::Relaxed),
            self.y.load(Ordering::Relaxed),
            self.buttons.load(Ordering::Relaxed),
        )
    }
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Delta entregue ao emulador, com `dy` invertido em relação ao HID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseDelta {
    pub dx: i32,
    pub dy: i32,
    pub buttons: u8,
}

/// Última posição vista pelo core 1.
#[derive(Debug, Default)]
pub struct InputTracker {
    x: i32,
    y: i32,
    buttons: u8,
}

impl InputTracker {
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            buttons: 0,
        }
    }

    /// `Some` só quando posição ou botões mudaram.
    pub fn poll(&mut self, cursor: &CursorState) -> Option<MouseDelta> {
        let (x, y, buttons) = cursor.snapshot();
        if x == self.x && y == self.y && buttons == self.buttons {
            return None;
        }
        let delta = MouseDelta {
            dx: x.wrapping_sub(self.x),
            dy: y.wrapping_sub(self.y).wrapping_neg(),
            buttons,
        };
        self.x = x;
        self.y = y;
        self.buttons = buttons;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_report_without_change() {
        let cursor = CursorState::new();
        let mut t = InputTracker::new();
        assert_eq!(t.poll(&cursor), None);
    }

    #[test]
    fn test_delta_negates_y() {
        let cursor = CursorState::new();
        let mut t = InputTracker::new();
        cursor.move_by(5, 3);
        cursor.move_by(1, 1);
        assert_eq!(
            t.poll(&cursor),
            Some(MouseDelta {
                dx: 6,
                dy: -4,
                buttons: 0
            })
        );
        assert_eq!(t.poll(&cursor), None);
    }

    #[test]
    fn test_extreme_y_delta_wraps() {
        let cursor = CursorState::new();
        let mut t = InputTracker::new();
        // Diferença de i32::MIN: a negação não pode estourar
        cursor.move_by(0, i32::MIN);
        assert_eq!(
            t.poll(&cursor),
            Some(MouseDelta {
                dx: 0,
                dy: i32::MIN,
                buttons: 0
            })
        );
    }

    #[test]
    fn test_button_only_change_reports_zero_motion() {
        let cursor = CursorState::new();
        let mut t = InputTracker::new();
        cursor.set_buttons(1);
        assert_eq!(
            t.poll(&cursor),
            Some(MouseDelta {
                dx: 0,
                dy: 0,
                buttons: 1
            })
        );
    }
}
