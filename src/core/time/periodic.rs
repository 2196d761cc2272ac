//! Arquivo: core/time/periodic.rs
//!
//! Propósito: evento de cadência fixa disparado por borda.
//!
//! Detalhes de Implementação:
//! - Guarda apenas o instante do último disparo e o limiar.
//! - `poll` dispara no máximo uma vez por chamada, mesmo que vários
//!   períodos tenham passado (sem backlog).

/// Tipo do evento (para logs de trace).
///
/// Só os eventos de cadência fixa. Automute usa `Deadline`; refill e
/// entrada rodam a cada iteração do loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    FramePublish,
    OneSecond,
}

impl EventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::FramePublish => "frame",
            Self::OneSecond => "1hz",
        }
    }
}

/// Comparação usada contra o limiar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `elapsed > threshold`
    After,
    /// `elapsed >= threshold`
    AtLeast,
}

#[derive(Debug, Clone, Copy)]
pub struct PeriodicEvent {
    kind: EventKind,
    threshold_us: u64,
    trigger: Trigger,
    last_us: u64,
}

impl PeriodicEvent {
    /// Referência inicial em 0: o primeiro `poll` após o limiar dispara.
    pub const fn new(kind: EventKind, threshold_us: u64, trigger: Trigger) -> Self {
        Self {
            kind,
            threshold_us,
            trigger,
            last_us: 0,
        }
    }

    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    pub const fn last_fired(&self) -> u64 {
        self.last_us
    }

    /// Tempo desde o último disparo.
    pub fn elapsed(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.last_us)
    }

    /// Limiar atingido?
    pub fn is_due(&self, now_us: u64) -> bool {
        let elapsed = self.elapsed(now_us);
        match self.trigger {
            Trigger::After => elapsed > self.threshold_us,
            Trigger::AtLeast => elapsed >= self.threshold_us,
        }
    }

    /// Reinicia a referência.
    pub fn mark(&mut self, now_us: u64) {
        self.last_us = now_us;
    }

    /// `is_due` + `mark` numa chamada.
    pub fn poll(&mut self, now_us: u64) -> bool {
        if self.is_due(now_us) {
            self.mark(now_us);
            crate::ktrace!(self.kind.name());
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{ONE_SECOND_US, VSYNC_PERIOD_US};

    #[test]
    fn test_vsync_is_strictly_after() {
        let mut ev = PeriodicEvent::new(EventKind::FramePublish, VSYNC_PERIOD_US, Trigger::After);
        assert!(!ev.poll(16_667));
        assert!(ev.poll(16_668));
        assert_eq!(ev.last_fired(), 16_668);
    }

    #[test]
    fn test_one_second_is_inclusive() {
        let mut ev = PeriodicEvent::new(EventKind::OneSecond, ONE_SECOND_US, Trigger::AtLeast);
        assert!(!ev.poll(999_999));
        assert!(ev.poll(1_000_000));
        assert!(!ev.poll(1_999_999));
    }

    #[test]
    fn test_kind_names_for_trace() {
        let ev = PeriodicEvent::new(EventKind::FramePublish, VSYNC_PERIOD_US, Trigger::After);
        assert_eq!(ev.kind(), EventKind::FramePublish);
        assert_eq!(EventKind::FramePublish.name(), "frame");
        assert_eq!(EventKind::OneSecond.name(), "1hz");
    }

    #[test]
    fn test_no_backlog_after_long_stall() {
        let mut ev = PeriodicEvent::new(EventKind::OneSecond, ONE_SECOND_US, Trigger::AtLeast);
        // Cinco segundos sem polling: um único disparo
        assert!(ev.poll(5_000_000));
        assert!(!ev.poll(5_000_001));
        assert!(ev.poll(6_000_000));
    }
}
