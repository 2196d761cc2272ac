//! Áudio da placa: codec TLV320 no I2C0 e consumidor I2S (PIO + DMA, lado C).
//!
//! O driver I2S em C pede um buffer cheio a cada fim de DMA via
//! `picomac_audio_fill`; o buffer volta ao pool na mesma chamada.

use picomac::core::config;
use picomac::drivers::audio::codec::Tlv320;
use picomac::drivers::audio::{AudioBufferPool, CHANNELS, SAMPLE_RATE_HZ};
use picomac::drivers::clocks::{ClockDomain, ClockTree};
use picomac::drivers::i2c::{I2cResult, RpI2c};
use picomac::drivers::timer::{busy_wait_us, SystemTimer};
use picomac::drivers::gpio;
use picomac::hal::MmioBus;
use spin::Once;

pub type Codec = Tlv320<RpI2c<MmioBus, SystemTimer>, SystemTimer>;

/// Pool compartilhado entre o produtor (core 1) e o DMA I2S.
pub static POOL: Once<AudioBufferPool> = Once::new();

extern "C" {
    fn picomac_i2s_start(sample_rate: u32, channels: u32) -> bool;
}

/// Solta o reset do codec, inicializa-o (mudo) e liga o I2S.
pub fn setup(bus: &mut MmioBus, clocks: &ClockTree) -> I2cResult<Codec> {
    gpio::init_output(bus, config::PIN_CODEC_RESET);
    gpio::put(bus, config::PIN_CODEC_RESET, true);
    busy_wait_us(&SystemTimer, config::CODEC_RESET_DELAY_MS * 1000);

    // SAFETY: o I2C0 só é usado pelo codec.
    let i2c = RpI2c::init(
        unsafe { MmioBus::steal() },
        SystemTimer,
        clocks.freq_hz(ClockDomain::Peri),
        config::I2C_BAUD,
        config::PIN_I2C_SDA,
        config::PIN_I2C_SCL,
        config::I2C_TIMEOUT_US,
    )?;
    let codec = Tlv320::init(i2c, SystemTimer)?;

    POOL.call_once(AudioBufferPool::new);
    if !unsafe { picomac_i2s_start(SAMPLE_RATE_HZ, CHANNELS) } {
        picomac::core::fatal("(Audio) Dispositivo I2S indisponivel");
    }
    picomac::kinfo!("(Audio) I2S ativo, Hz: "; SAMPLE_RATE_HZ);
    Ok(codec)
}

/// Copia o próximo buffer cheio para `dst` e o devolve ao pool.
///
/// Retorna o número de amostras; 0 => o driver I2S toca silêncio.
#[no_mangle]
pub extern "C" fn picomac_audio_fill(dst: *mut i16, capacity: u32) -> u32 {
    let Some(pool) = POOL.get() else {
        return 0;
    };
    if dst.is_null() {
        return 0;
    }
    let Some(buf) = pool.take_full() else {
        return 0;
    };
    let samples = buf.filled();
    let n = samples.len().min(capacity as usize);
    // SAFETY: o driver I2S garante `capacity` amostras graváveis em `dst`.
    let out = unsafe { ::core::slice::from_raw_parts_mut(dst, n) };
    out.copy_from_slice(&samples[..n]);
    pool.give_free(buf);
    n as u32
}
