//! # Video - Publicação de Quadros
//!
//! O gerador de scan-out (HSTX/DVI) é externo e sempre varre 640x480 a
//! 1 bpp. Este módulo decide de onde ele lê e, quando necessário, copia o
//! framebuffer do emulador para o espelho.
//!
//! ## Espelho
//!
//! Usado quando a RAM emulada está na PSRAM (leitura lenta demais para o
//! scan-out) ou quando a geometria emulada não é 640x480 (precisa centralizar
//! e inverter). Caso contrário o scan-out lê direto da RAM do emulador.

pub mod mirror;

pub use mirror::{publish, MIRROR_WORDS};

/// Geometria de tela em pixels (1 bpp, palavras de 32 pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Mac Plus clássico.
    pub const MAC_PLUS: Self = Self {
        width: 512,
        height: 342,
    };
    pub const VGA: Self = Self {
        width: 640,
        height: 480,
    };

    pub const fn words_per_row(&self) -> usize {
        (self.width / 32) as usize
    }

    pub const fn words(&self) -> usize {
        self.words_per_row() * self.height as usize
    }
}

/// Saída física.
pub const OUTPUT: Geometry = Geometry::VGA;

/// O scan-out precisa do espelho?
pub const fn needs_mirror(psram_backed: bool, emulated: Geometry) -> bool {
    psram_backed || emulated.width != OUTPUT.width
}

/// Gerador de scan-out (externo).
pub trait ScanOut {
    /// Começa a varrer `OUTPUT` a partir de `base`. O buffer continua sendo
    /// escrito pelo outro lado enquanto é lido.
    fn start(&mut self, base: *const u32);
}
