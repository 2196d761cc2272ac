//! Prazo único que pode estar desarmado ("fim dos tempos").

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at_us: Option<u64>,
}

impl Deadline {
    /// Desarmado.
    pub const NEVER: Self = Self { at_us: None };

    pub fn arm(&mut self, now_us: u64, after_us: u64) {
        self.at_us = Some(now_us.saturating_add(after_us));
    }

    pub fn disarm(&mut self) {
        self.at_us = None;
    }

    pub const fn is_armed(&self) -> bool {
        self.at_us.is_some()
    }

    pub const fn at(&self) -> Option<u64> {
        self.at_us
    }

    /// Expirou (estritamente antes de `now`)? Se sim, desarma.
    pub fn take_expired(&mut self, now_us: u64) -> bool {
        match self.at_us {
            Some(at) if at < now_us => {
                self.at_us = None;
                true
            }
            _ => false,
        }
    }
}
