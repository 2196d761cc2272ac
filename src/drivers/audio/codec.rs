// =============================================================================
// CODEC TLV320DAC3100 (I2C 0x18)
// =============================================================================
//
// Registradores em páginas de 128; o registrador 0 seleciona a página.
// A inicialização é uma tabela ordenada de operações, executada uma vez.
// Qualquer falha I2C durante o setup é devolvida ao chamador (fatal no boot).
//
// Bit 0x04 de 0x28/0x29/0x2A (página 1): 1 = saída ativa, 0 = mudo.
//
// =============================================================================

use super::MuteSink;
use crate::drivers::i2c::{I2cBus, I2cResult};
use crate::drivers::timer::busy_wait_us;
use crate::hal::Monotonic;

pub const CODEC_ADDR: u8 = 0x18;

/// Registrador de seleção de página.
const PAGE_SELECT: u8 = 0x00;

/// Registradores de mute (página 1): HP esquerdo, HP direito, alto-falante.
const MUTE_REGS: [u8; 3] = [0x28, 0x29, 0x2a];
const UNMUTE_BIT: u8 = 0x04;

/// Passo da tabela de inicialização.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOp {
    Write(u8, u8),
    /// (registrador, máscara, valor)
    Modify(u8, u8, u8),
    Page(u8),
    DelayMs(u32),
}

use CodecOp::{DelayMs, Modify, Page, Write};

/// Sequência de bring-up: reset, PLL/clock mux, divisores, detecção de
/// headset, roteamento e volume do DAC, amplificadores.
pub const INIT_TABLE: &[CodecOp] = &[
    // Reset por software
    Write(0x01, 0x01),
    DelayMs(10),
    // Interface: I2S, 16 bits
    Modify(0x1b, 0xc0, 0x00),
    Modify(0x1b, 0x30, 0x00),
    // Clock mux: PLL_CLKIN = BCLK, CODEC_CLKIN = PLL
    Modify(0x04, 0x03, 0x03),
    Modify(0x04, 0x0c, 0x04),
    // PLL J.D
    Write(0x06, 0x20),
    Write(0x08, 0x00),
    Write(0x07, 0x00),
    // PLL P/R
    Modify(0x05, 0x0f, 0x02),
    Modify(0x05, 0x70, 0x10),
    // NDAC / MDAC / NADC / MADC (valor + power)
    Modify(0x0b, 0x7f, 0x08),
    Modify(0x0b, 0x80, 0x80),
    Modify(0x0c, 0x7f, 0x02),
    Modify(0x0c, 0x80, 0x80),
    Modify(0x12, 0x7f, 0x08),
    Modify(0x12, 0x80, 0x80),
    Modify(0x13, 0x7f, 0x02),
    Modify(0x13, 0x80, 0x80),
    // PLL power up
    Modify(0x05, 0x80, 0x80),
    // Headset / GPIO
    Page(1),
    Modify(0x2e, 0xff, 0x0b),
    Page(0),
    Modify(0x43, 0x80, 0x80),
    Modify(0x30, 0x80, 0x80),
    Modify(0x33, 0x3c, 0x14),
    // DAC ligado
    Modify(0x3f, 0xc0, 0xc0),
    // Roteamento DAC -> mixer
    Page(1),
    Modify(0x23, 0xc0, 0x40),
    Modify(0x23, 0x0c, 0x04),
    // Volume digital 0 dB
    Page(0),
    Modify(0x40, 0x0c, 0x00),
    Write(0x41, 0x00),
    Write(0x42, 0x00),
    // Fones
    Page(1),
    Modify(0x1f, 0xc0, 0xc0),
    Modify(0x28, 0x04, 0x04),
    Modify(0x29, 0x04, 0x04),
    Write(0x24, 50),
    Write(0x25, 50),
    Modify(0x28, 0x78, 0x00),
    Modify(0x29, 0x78, 0x00),
    // Alto-falante
    Modify(0x20, 0x80, 0x80),
    Modify(0x2a, 0x04, 0x04),
    Modify(0x2a, 0x18, 0x08),
    Write(0x26, 40),
    Page(0),
];

pub struct Tlv320<I: I2cBus, M: Monotonic> {
    i2c: I,
    clock: M,
}

impl<I: I2cBus, M: Monotonic> Tlv320<I, M> {
    /// Executa `INIT_TABLE` e deixa as saídas mudas.
    pub fn init(i2c: I, clock: M) -> I2cResult<Self> {
        crate::kinfo!("(Codec) Inicializando TLV320DAC3100");
        let mut codec = Self { i2c, clock };
        for op in INIT_TABLE {
            codec.run(*op)?;
        }
        codec.write_mute(true)?;
        crate::kok!("(Codec) Pronto (mudo)");
        Ok(codec)
    }

    fn run(&mut self, op: CodecOp) -> I2cResult<()> {
        match op {
            Write(reg, value) => self.write_register(reg, value),
            Modify(reg, mask, value) => self.modify_register(reg, mask, value),
            Page(page) => self.write_register(PAGE_SELECT, page),
            DelayMs(ms) => {
                busy_wait_us(&self.clock, ms as u64 * 1000);
                Ok(())
            }
        }
    }

    pub fn write_register(&mut self, reg: u8, value: u8) -> I2cResult<()> {
        self.i2c.write(CODEC_ADDR, &[reg, value])
    }

    pub fn read_register(&mut self, reg: u8) -> I2cResult<u8> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(CODEC_ADDR, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Read-modify-write dos bits em `mask`.
    pub fn modify_register(&mut self, reg: u8, mask: u8, value: u8) -> I2cResult<()> {
        let current = self.read_register(reg)?;
        self.write_register(reg, (current & !mask) | (value & mask))
    }

    /// Mute dos três estágios de saída. Sai sempre na página 0.
    fn write_mute(&mut self, muted: bool) -> I2cResult<()> {
        let bit = if muted { 0 } else { UNMUTE_BIT };
        self.write_register(PAGE_SELECT, 1)?;
        for reg in MUTE_REGS {
            self.modify_register(reg, UNMUTE_BIT, bit)?;
        }
        self.write_register(PAGE_SELECT, 0)
    }
}

impl<I: I2cBus, M: Monotonic> MuteSink for Tlv320<I, M> {
    fn apply_mute(&mut self, muted: bool) -> I2cResult<()> {
        self.write_mute(muted)
    }
}
