//! Interface do Núcleo de Emulação
//!
//! O núcleo (CPU 68000 + periféricos do Mac) é externo. O firmware só o
//! alimenta com eventos e lê de volta o framebuffer e a região de áudio.
//! Os callbacks que o núcleo faz durante `tick` (trap de áudio, mudança de
//! volume) voltam como `CoreRequests`.

use bitflags::bitflags;

bitflags! {
    /// Pedidos acumulados pelo núcleo durante um `tick`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CoreRequests: u8 {
        /// Região de áudio pronta para conversão
        const AUDIO_TRAP   = 1 << 0;
        /// Volume / som habilitado mudou (`audio_config`)
        const AUDIO_CONFIG = 1 << 1;
    }
}

/// Configuração de som do Mac emulado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioConfig {
    /// 0-7
    pub volume: u32,
    pub sound_disabled: bool,
}

pub trait EmulationCore {
    /// Executa uma fatia de emulação.
    fn tick(&mut self) -> CoreRequests;

    /// Quadro publicado (interrupção de vsync do Mac).
    fn vsync(&mut self);

    /// Tick do relógio de tempo real.
    fn one_second(&mut self);

    fn mouse(&mut self, dx: i32, dy: i32, buttons: u8);

    fn key(&mut self, code: u8, release: bool);

    fn audio_config(&self) -> AudioConfig;

    /// Framebuffer 1 bpp dentro da RAM emulada.
    fn framebuffer(&self) -> &[u32];

    /// Região de amostras (uma palavra por amostra).
    fn audio_region(&self) -> &[u16];
}
