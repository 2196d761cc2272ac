//! # Drivers do Firmware
//!
//! Todo acesso a registrador passa por `hal::RegisterBus`; os drivers não
//! conhecem endereços de MMIO concretos além de `hal::regs`.
//!
//! | Driver    | Arquivo      | Função |
//! |-----------|--------------|--------|
//! | Clocks    | `clocks/`    | XOSC, PLLs, VREG, sequenciamento de overclock |
//! | QMI       | `qmi/`       | Flash (M0) e PSRAM (M1): modo direto, timing |
//! | Serial    | `serial.rs`  | UART0 - logs |
//! | Timer     | `timer.rs`   | TIMER0 - relógio monotônico em µs |
//! | I2C       | `i2c.rs`     | I2C0 master com timeout |
//! | GPIO      | `gpio.rs`    | Funções de pino, saídas, LED |
//! | Resets    | `resets.rs`  | Reset de blocos |
//! | Audio     | `audio/`     | Codec TLV320 + pool de buffers PCM |
//! | Video     | `video/`     | Espelho do framebuffer |
//! | Input     | `input/`     | Cursor e fila de teclas (HID -> emulador) |
//! | Disc      | `disc.rs`    | Escolha da imagem de disco |
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   core (entry, scheduler, emulador externo) │
//! └─────────────────────────────────────────────┘
//!                      ↑
//! ┌─────────────────────────────────────────────┐
//! │   drivers                                   │
//! └─────────────────────────────────────────────┘
//!                      ↑
//! ┌─────────────────────────────────────────────┐
//! │   hal::RegisterBus  (MmioBus | SimBus)      │
//! └─────────────────────────────────────────────┘
//! ```

pub mod audio;
pub mod clocks;
pub mod disc;
pub mod gpio;
pub mod i2c;
pub mod input;
pub mod qmi;
pub mod resets;
pub mod serial;
pub mod timer;
pub mod video;
