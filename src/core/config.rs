//! Configuração de Build
//!
//! Constantes resolvidas a partir das features do Cargo. Não existe
//! configuração em runtime.

use crate::drivers::clocks::SysClockSpeed;
use crate::drivers::video::Geometry;

// =============================================================================
// CLOCKS
// =============================================================================

pub const OVERCLOCK: bool = cfg!(feature = "overclock");

/// Sem `overclock` o sequenciador roda no divisor mais conservador.
#[cfg(any(feature = "clk_132mhz", not(feature = "overclock")))]
pub const SYS_CLOCK: SysClockSpeed = SysClockSpeed::Mhz132;
#[cfg(all(feature = "overclock", feature = "clk_176mhz", not(feature = "clk_132mhz")))]
pub const SYS_CLOCK: SysClockSpeed = SysClockSpeed::Mhz176;
#[cfg(all(
    feature = "overclock",
    not(any(feature = "clk_176mhz", feature = "clk_132mhz"))
))]
pub const SYS_CLOCK: SysClockSpeed = SysClockSpeed::Mhz264;

/// Bit clock do DVI em kHz (clk_hstx = metade).
pub const BIT_CLK_KHZ: u32 = 252_000;

/// Cristal da placa.
pub const XOSC_HZ: u32 = 12_000_000;

// =============================================================================
// MEMÓRIA / VÍDEO
// =============================================================================

pub const USE_PSRAM: bool = cfg!(feature = "psram");

/// RAM emulada na SRAM interna (sem PSRAM, ou PSRAM ausente no boot).
pub const FALLBACK_RAM_SIZE: usize = 128 * 1024;

/// RAM emulada pedida pelo build: 4 MiB na PSRAM.
#[cfg(feature = "psram")]
pub const RAM_SIZE: usize = 4096 * 1024;
#[cfg(not(feature = "psram"))]
pub const RAM_SIZE: usize = FALLBACK_RAM_SIZE;

#[cfg(feature = "disp_640x480")]
pub const GEOMETRY: Geometry = Geometry::VGA;
#[cfg(not(feature = "disp_640x480"))]
pub const GEOMETRY: Geometry = Geometry::MAC_PLUS;

// =============================================================================
// PERIFÉRICOS
// =============================================================================

pub const ENABLE_AUDIO: bool = cfg!(feature = "audio");
pub const USE_SD: bool = cfg!(feature = "sd_disc");

// =============================================================================
// PINOS (Fruit Jam)
// =============================================================================

pub const PIN_PSRAM_CS: u32 = 47;
pub const PIN_LED: u32 = 29;
pub const PIN_UART_TX: u32 = 0;
pub const PIN_UART_RX: u32 = 1;
pub const PIN_I2C_SDA: u32 = 20;
pub const PIN_I2C_SCL: u32 = 21;
/// Reset do codec (ativo em baixo).
pub const PIN_CODEC_RESET: u32 = 22;

pub const I2C_BAUD: u32 = 100_000;
pub const I2C_TIMEOUT_US: u64 = 1000;
/// Espera após soltar o reset do codec.
pub const CODEC_RESET_DELAY_MS: u64 = 1000;
