//! # Loop de Eventos Dual-Core
//!
//! Escalonamento cooperativo de cadência fixa, sem prioridades e sem
//! preempção. Cada contexto é um loop infinito de `poll`/`step`.
//!
//! - Contexto A (core 0): `IoLoop`, serviço do USB host e HID.
//! - Contexto B (core 1): `EventLoop`, obrigações periódicas do emulador.
//!
//! ## Iteração do contexto B
//!
//! 1. `tick` do núcleo (e os pedidos de áudio que ele gerou)
//! 2. Expiração do automute
//! 3. Reabastecimento de áudio (não bloqueia; pool vazio = pula)
//! 4. Quadro: `elapsed > 16667 µs` => espelho, vsync, nova referência
//! 5. Segundo: `elapsed >= 1 s`
//! 6. Delta do mouse (só se mudou)
//! 7. No máximo uma tecla

use crate::core::emulator::{CoreRequests, EmulationCore};
use crate::core::time::{EventKind, PeriodicEvent, Trigger, ONE_SECOND_US, VSYNC_PERIOD_US};
use crate::drivers::audio::{AudioBufferPool, AudioBufferProducer, MuteSink};
use crate::drivers::input::{InputTracker, SharedInput};
use crate::drivers::video::{self, Geometry};
use crate::hal::Monotonic;

/// Produtor de áudio + pool do consumidor I2S.
pub struct AudioStage<'a, S: MuteSink> {
    pub producer: AudioBufferProducer<S>,
    pub pool: &'a AudioBufferPool,
}

/// Espelho do framebuffer (quando a política pede).
pub struct MirrorStage<'a> {
    pub geometry: Geometry,
    pub buffer: &'a mut [u32],
}

pub struct EventLoop<'a, E: EmulationCore, C: Monotonic, S: MuteSink> {
    core: E,
    clock: C,
    input: &'a SharedInput,
    tracker: InputTracker,
    vsync: PeriodicEvent,
    one_hz: PeriodicEvent,
    audio: Option<AudioStage<'a, S>>,
    mirror: Option<MirrorStage<'a>>,
}

impl<'a, E: EmulationCore, C: Monotonic, S: MuteSink> EventLoop<'a, E, C, S> {
    pub fn new(
        core: E,
        clock: C,
        input: &'a SharedInput,
        audio: Option<AudioStage<'a, S>>,
        mirror: Option<MirrorStage<'a>>,
    ) -> Self {
        Self {
            core,
            clock,
            input,
            tracker: InputTracker::new(),
            vsync: PeriodicEvent::new(EventKind::FramePublish, VSYNC_PERIOD_US, Trigger::After),
            one_hz: PeriodicEvent::new(EventKind::OneSecond, ONE_SECOND_US, Trigger::AtLeast),
            audio,
            mirror,
        }
    }

    pub fn core(&self) -> &E {
        &self.core
    }

    pub fn audio(&self) -> Option<&AudioStage<'a, S>> {
        self.audio.as_ref()
    }

    /// Uma iteração do contexto B.
    pub fn poll(&mut self) {
        let now = self.clock.now_us();

        let requests = self.core.tick();
        self.handle_requests(requests, now);

        if let Some(audio) = self.audio.as_mut() {
            audio.producer.poll_automute(now);
            if !audio.producer.refill(audio.pool) {
                crate::ktrace!("(Loop) Pool de audio esgotado");
            }
        }

        if self.vsync.is_due(now) {
            if let Some(mirror) = self.mirror.as_mut() {
                video::publish(mirror.geometry, self.core.framebuffer(), mirror.buffer);
            }
            self.core.vsync();
            self.vsync.mark(now);
        }

        if self.one_hz.poll(now) {
            self.core.one_second();
        }

        if let Some(delta) = self.tracker.poll(&self.input.cursor) {
            self.core.mouse(delta.dx, delta.dy, delta.buttons);
        }

        if let Some(key) = self.input.keys.pop() {
            self.core.key(key.code, key.release);
        }
    }

    fn handle_requests(&mut self, requests: CoreRequests, now: u64) {
        let Some(audio) = self.audio.as_mut() else {
            return;
        };
        if requests.contains(CoreRequests::AUDIO_CONFIG) {
            let cfg = self.core.audio_config();
            audio.producer.configure(cfg.volume, cfg.sound_disabled);
        }
        if requests.contains(CoreRequests::AUDIO_TRAP) {
            audio.producer.audio_trap(self.core.audio_region(), now);
        }
    }

    pub fn run(mut self) -> ! {
        crate::kinfo!("(Loop) Contexto B em execucao");
        loop {
            self.poll();
        }
    }
}

// =============================================================================
// CONTEXTO A
// =============================================================================

/// Pilha USB host (externa). Ambos os passos não bloqueiam.
pub trait UsbHost {
    fn task(&mut self);
    fn hid_task(&mut self);
}

pub struct IoLoop<U: UsbHost> {
    usb: U,
}

impl<U: UsbHost> IoLoop<U> {
    pub fn new(usb: U) -> Self {
        Self { usb }
    }

    pub fn step(&mut self) {
        self.usb.task();
        self.usb.hid_task();
    }

    pub fn run(mut self) -> ! {
        crate::kinfo!("(Loop) Contexto A em execucao");
        loop {
            self.step();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::emulator::AudioConfig;
    use crate::drivers::audio::SAMPLES_PER_BUFFER;
    use crate::drivers::i2c::I2cResult;
    use crate::drivers::input::KeyEvent;
    use crate::drivers::video::MIRROR_WORDS;
    use crate::hal::sim::SimClock;
    use std::vec;
    use std::vec::Vec;

    #[derive(Debug, PartialEq)]
    enum Ev {
        Tick,
        Vsync,
        OneSecond,
        Mouse(i32, i32, u8),
        Key(u8, bool),
    }

    struct MockCore {
        log: Vec<Ev>,
        fb: Vec<u32>,
        audio: Vec<u16>,
        next: CoreRequests,
        cfg: AudioConfig,
    }

    impl MockCore {
        fn new() -> Self {
            Self {
                log: Vec::new(),
                fb: vec![0; Geometry::MAC_PLUS.words()],
                audio: vec![0x81; SAMPLES_PER_BUFFER],
                next: CoreRequests::empty(),
                cfg: AudioConfig::default(),
            }
        }

        fn count(&self, ev: &Ev) -> usize {
            self.log.iter().filter(|e| *e == ev).count()
        }
    }

    impl EmulationCore for MockCore {
        fn tick(&mut self) -> CoreRequests {
            self.log.push(Ev::Tick);
            ::core::mem::take(&mut self.next)
        }
        fn vsync(&mut self) {
            self.log.push(Ev::Vsync);
        }
        fn one_second(&mut self) {
            self.log.push(Ev::OneSecond);
        }
        fn mouse(&mut self, dx: i32, dy: i32, buttons: u8) {
            self.log.push(Ev::Mouse(dx, dy, buttons));
        }
        fn key(&mut self, code: u8, release: bool) {
            self.log.push(Ev::Key(code, release));
        }
        fn audio_config(&self) -> AudioConfig {
            self.cfg
        }
        fn framebuffer(&self) -> &[u32] {
            &self.fb
        }
        fn audio_region(&self) -> &[u16] {
            &self.audio
        }
    }

    #[derive(Default)]
    struct NullSink(Vec<bool>);

    impl MuteSink for NullSink {
        fn apply_mute(&mut self, muted: bool) -> I2cResult<()> {
            self.0.push(muted);
            Ok(())
        }
    }

    type Loop<'a> = EventLoop<'a, MockCore, &'a SimClock, NullSink>;

    fn bare<'a>(clock: &'a SimClock, input: &'a SharedInput) -> Loop<'a> {
        EventLoop::new(MockCore::new(), clock, input, None, None)
    }

    #[test]
    fn test_vsync_cadence_without_backlog() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let mut lp = bare(&clock, &input);

        lp.poll();
        clock.set(16_667);
        lp.poll();
        assert_eq!(lp.core().count(&Ev::Vsync), 0);

        clock.set(16_668);
        lp.poll();
        assert_eq!(lp.core().count(&Ev::Vsync), 1);

        // Atraso longo: um único vsync
        clock.set(200_000);
        lp.poll();
        lp.poll();
        assert_eq!(lp.core().count(&Ev::Vsync), 2);
        assert_eq!(lp.core().count(&Ev::Tick), 5);
    }

    #[test]
    fn test_one_second_tick() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let mut lp = bare(&clock, &input);

        clock.set(999_999);
        lp.poll();
        assert_eq!(lp.core().count(&Ev::OneSecond), 0);
        clock.set(1_000_000);
        lp.poll();
        clock.set(1_500_000);
        lp.poll();
        assert_eq!(lp.core().count(&Ev::OneSecond), 1);
    }

    #[test]
    fn test_mouse_delta_only_on_change() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let mut lp = bare(&clock, &input);

        input.cursor.move_by(3, 4);
        lp.poll();
        lp.poll();
        input.cursor.set_buttons(1);
        lp.poll();

        let mice: Vec<&Ev> = lp.core().log.iter().filter(|e| matches!(e, Ev::Mouse(..))).collect();
        assert_eq!(mice, [&Ev::Mouse(3, -4, 0), &Ev::Mouse(0, 0, 1)]);
    }

    #[test]
    fn test_one_key_per_iteration() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let mut lp = bare(&clock, &input);

        input.keys.push(KeyEvent { code: 0x31, release: false });
        input.keys.push(KeyEvent { code: 0x31, release: true });
        lp.poll();
        assert_eq!(lp.core().count(&Ev::Key(0x31, false)), 1);
        assert_eq!(lp.core().count(&Ev::Key(0x31, true)), 0);
        lp.poll();
        assert_eq!(lp.core().count(&Ev::Key(0x31, true)), 1);
        assert!(input.keys.is_empty());
    }

    #[test]
    fn test_mirror_published_before_vsync() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let mut mirror = vec![0u32; MIRROR_WORDS];
        {
            let stage = MirrorStage {
                geometry: Geometry::MAC_PLUS,
                buffer: &mut mirror,
            };
            let mut lp: Loop<'_> = EventLoop::new(MockCore::new(), &clock, &input, None, Some(stage));
            clock.set(20_000);
            lp.poll();
            assert_eq!(lp.core().count(&Ev::Vsync), 1);
        }
        // Framebuffer todo zero => espelho invertido na área central
        assert_eq!(mirror[69 * 20 + 2], 0xffff_ffff);
        assert_eq!(mirror[0], 0);
    }

    #[test]
    fn test_audio_trap_and_refill() {
        let clock = SimClock::new(0);
        let input = SharedInput::new();
        let pool = AudioBufferPool::new();
        let stage = AudioStage {
            producer: AudioBufferProducer::new(NullSink::default()),
            pool: &pool,
        };
        let mut core = MockCore::new();
        core.cfg = AudioConfig {
            volume: 7,
            sound_disabled: false,
        };
        core.next = CoreRequests::AUDIO_CONFIG | CoreRequests::AUDIO_TRAP;
        let mut lp: Loop<'_> = EventLoop::new(core, &clock, &input, Some(stage), None);

        clock.set(10);
        lp.poll();
        let audio = lp.audio().unwrap();
        assert!(!audio.producer.is_muted());
        assert_eq!(audio.producer.automute().at(), Some(500_010));

        let buf = pool.take_full().unwrap();
        assert_eq!(buf.filled()[0], 256);

        // Pool esgota sem travar o loop
        for _ in 0..5 {
            lp.poll();
        }
        assert_eq!(pool.full_count(), 2);
        assert_eq!(pool.free_count(), 0);

        clock.set(500_011);
        lp.poll();
        assert!(lp.audio().unwrap().producer.is_muted());
    }

    struct CountingUsb(u32, u32);

    impl UsbHost for CountingUsb {
        fn task(&mut self) {
            self.0 += 1;
        }
        fn hid_task(&mut self) {
            assert_eq!(self.0, self.1 + 1);
            self.1 += 1;
        }
    }

    #[test]
    fn test_io_loop_step_order() {
        let mut io = IoLoop::new(CountingUsb(0, 0));
        io.step();
        io.step();
        assert_eq!((io.usb.0, io.usb.1), (2, 2));
    }
}
