// =============================================================================
// AUDIO - PRODUTOR DE BUFFERS
// =============================================================================
//
// O emulador escreve amostras de 8 bits (sem sinal, byte baixo de cada
// palavra de 16 bits) numa região da RAM emulada. A cada "audio trap" essa
// região é convertida para PCM S16 mono num buffer de preparo; a cada
// iteração do loop o buffer de preparo é copiado para um buffer livre do
// pool e entregue ao consumidor I2S.
//
// POSSE DOS BUFFERS:
//   pool.free --take_free--> produtor --give_full--> pool.full
//   pool.full --take_full--> consumidor --give_free--> pool.free
// Cada buffer tem exatamente um dono; os buffers são movidos por valor.
//
// MUTE:
// - Estado em cache; `set_muted` só fala com o codec quando muda.
// - Trap com volume != 0 desmuta e arma o automute 500 ms à frente.
// - Expirado o automute, volta a mudo e desarma.
//
// =============================================================================

pub mod codec;

use crate::core::time::{ms_to_us, Deadline};
use crate::drivers::i2c::I2cResult;
use crate::klib::RingBuffer;
use crate::sync::Spinlock;

/// Amostras por buffer (60.15 Hz * 370 ~= 22256 Hz).
pub const SAMPLES_PER_BUFFER: usize = 370;
pub const SAMPLE_RATE_HZ: u32 = 22_256;
pub const CHANNELS: u32 = 1;
/// Buffers no pool.
pub const POOL_DEPTH: usize = 3;
pub const AUTOMUTE_MS: u64 = 500;

/// Escala máxima do volume (7 = 65536).
pub const MAX_VOLUME: u32 = 7;

/// Região de áudio: bytes a partir do fim da RAM emulada.
pub const REGION_FROM_END: usize = 768;

/// Destino do mute (o codec, em hardware).
pub trait MuteSink {
    fn apply_mute(&mut self, muted: bool) -> I2cResult<()>;
}

/// Buffer PCM S16 mono de capacidade fixa.
pub struct AudioBuffer {
    pub samples: [i16; SAMPLES_PER_BUFFER],
    pub sample_count: usize,
}

impl AudioBuffer {
    pub const fn new() -> Self {
        Self {
            samples: [0; SAMPLES_PER_BUFFER],
            sample_count: 0,
        }
    }

    /// Amostras válidas.
    pub fn filled(&self) -> &[i16] {
        &self.samples[..self.sample_count]
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// POOL
// =============================================================================

type Queue = RingBuffer<AudioBuffer, POOL_DEPTH>;

/// Pool de `POOL_DEPTH` buffers, compartilhado entre produtor e consumidor.
pub struct AudioBufferPool {
    free: Spinlock<Queue>,
    full: Spinlock<Queue>,
}

impl AudioBufferPool {
    /// Todos os buffers começam livres.
    pub fn new() -> Self {
        let mut free = Queue::new();
        for _ in 0..POOL_DEPTH {
            let _ = free.push(AudioBuffer::new());
        }
        Self {
            free: Spinlock::new(free),
            full: Spinlock::new(Queue::new()),
        }
    }

    /// Lado produtor. Nunca bloqueia: lock disputado conta como vazio.
    pub fn take_free(&self) -> Option<AudioBuffer> {
        self.free.try_lock()?.pop()
    }

    pub fn give_full(&self, buf: AudioBuffer) {
        // Capacidade == número de buffers: nunca transborda.
        let _ = self.full.lock().push(buf);
    }

    /// Lado consumidor (I2S).
    pub fn take_full(&self) -> Option<AudioBuffer> {
        self.full.lock().pop()
    }

    pub fn give_free(&self, mut buf: AudioBuffer) {
        buf.sample_count = 0;
        let _ = self.free.lock().push(buf);
    }

    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    pub fn full_count(&self) -> usize {
        self.full.lock().len()
    }
}

impl Default for AudioBufferPool {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// PRODUTOR
// =============================================================================

/// Escala para `volume` (0-7); som desabilitado => 0.
pub const fn volume_scale(volume: u32, sound_disabled: bool) -> i32 {
    if sound_disabled {
        0
    } else {
        let v = if volume > MAX_VOLUME { MAX_VOLUME } else { volume };
        (65536 * v / MAX_VOLUME) as i32
    }
}

/// Converte uma palavra da região do emulador em amostra S16.
#[inline]
pub const fn convert_sample(word: u16, scale: i32) -> i16 {
    let centered = (word & 0xff) as i32 - 128;
    ((centered * scale) >> 8) as i16
}

pub struct AudioBufferProducer<M: MuteSink> {
    sink: M,
    scale: i32,
    muted: bool,
    automute: Deadline,
    staging: [i16; SAMPLES_PER_BUFFER],
}

impl<M: MuteSink> AudioBufferProducer<M> {
    /// O codec sai do setup mudo; o cache começa igual.
    pub fn new(sink: M) -> Self {
        Self {
            sink,
            scale: 0,
            muted: true,
            automute: Deadline::NEVER,
            staging: [0; SAMPLES_PER_BUFFER],
        }
    }

    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn automute(&self) -> Deadline {
        self.automute
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    /// Configuração de volume vinda do emulador.
    pub fn configure(&mut self, volume: u32, sound_disabled: bool) {
        self.scale = volume_scale(volume, sound_disabled);
        crate::kdebug!("(Audio) Escala: ", self.scale);
        self.set_muted(self.scale == 0);
    }

    /// Idempotente. Falha de I2C em runtime só é logada.
    pub fn set_muted(&mut self, muted: bool) {
        if self.muted == muted {
            return;
        }
        self.muted = muted;
        if let Err(e) = self.sink.apply_mute(muted) {
            crate::kwarn!("(Audio) Falha ao alterar mute:");
            crate::kwarn!(e.as_str());
        }
    }

    /// Trap de áudio: converte a região do emulador para o buffer de preparo.
    ///
    /// `region` tem ao menos `SAMPLES_PER_BUFFER` palavras.
    pub fn audio_trap(&mut self, region: &[u16], now_us: u64) {
        self.set_muted(self.scale == 0);
        if self.scale == 0 {
            self.staging.fill(0);
            return;
        }
        self.automute.arm(now_us, ms_to_us(AUTOMUTE_MS));

        let scale = self.scale;
        for (out, &word) in self.staging.iter_mut().zip(region.iter()) {
            *out = convert_sample(word, scale);
        }
    }

    /// Copia o buffer de preparo para um buffer livre. `false` se o pool
    /// está esgotado (sem bloquear).
    pub fn refill(&self, pool: &AudioBufferPool) -> bool {
        let Some(mut buf) = pool.take_free() else {
            return false;
        };
        buf.samples.copy_from_slice(&self.staging);
        buf.sample_count = SAMPLES_PER_BUFFER;
        pool.give_full(buf);
        true
    }

    /// Automute vencido: muta e desarma.
    pub fn poll_automute(&mut self, now_us: u64) {
        if self.automute.take_expired(now_us) {
            crate::kdebug!("(Audio) Automute");
            self.set_muted(true);
        }
    }
}
