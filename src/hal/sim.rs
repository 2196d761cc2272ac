//! Barramento simulado para testes no host.
//!
//! Registradores comuns guardam o último valor escrito. Os blocos que o
//! firmware observa têm comportamento modelado:
//!
//! - CLOCKS: SELECTED segue o SRC de CTRL (one-hot).
//! - PLL: LOCK enquanto PD e VCOPD estiverem limpos.
//! - XOSC: STABLE assim que ENABLE é escrito.
//! - RESETS: RESET_DONE = !RESET.
//! - QMI direct mode + um dispositivo PSRAM atrás do CS1.
//! - Janela XIP (leituras dummy, região M1 gravável).
//! - SIO FIFO em eco (core 1 que responde ao handshake).
//! - I2C com um codec de registradores paginados.
//!
//! `force()` fixa o valor lido de um endereço, para simular hardware que
//! nunca assenta.

use super::regs::{clocks, i2c, io_qspi, pll, qmi, resets, sio, timer, uart, vreg, xip, xosc};
use super::traits::Monotonic;
use super::RegisterBus;
use crate::arch::{Cpu, CpuOps};
use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::vec::Vec;

const CSR_BUSY: u32 = 1 << 1;
const CSR_ASSERT_CS1N: u32 = 1 << 3;
const CSR_TXEMPTY: u32 = 1 << 11;

const PWR_PD: u32 = 1 << 0;
const PWR_VCOPD: u32 = 1 << 5;

/// Uma escrita observada no barramento.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub addr: u32,
    pub value: u32,
    /// Interrupções estavam mascaradas no momento da escrita.
    pub masked: bool,
}

/// Chip PSRAM atrás do CS1.
#[derive(Debug, Clone)]
pub struct PsramModel {
    pub kgd: u8,
    pub eid: u8,
    /// Leituras pela janela M1 devolvem o que foi escrito.
    pub functional: bool,
    /// Comandos recebidos: (byte de comando, largura da transferência).
    pub commands: Vec<(u8, u8)>,
    byte_index: usize,
    current: Option<u8>,
    memory: BTreeMap<u32, u32>,
}

impl PsramModel {
    pub fn new(kgd: u8, eid: u8) -> Self {
        Self {
            kgd,
            eid,
            functional: true,
            commands: Vec::new(),
            byte_index: 0,
            current: None,
            memory: BTreeMap::new(),
        }
    }

    /// Só os bytes de comando, na ordem.
    pub fn command_bytes(&self) -> Vec<u8> {
        self.commands.iter().map(|&(c, _)| c).collect()
    }

    fn response(&self, index: usize) -> u32 {
        match (self.current, index) {
            (Some(0x9f), 5) => self.kgd as u32,
            (Some(0x9f), 6) => self.eid as u32,
            _ => 0,
        }
    }
}

/// Codec I2C com registradores paginados (registrador 0 = página).
#[derive(Debug, Clone, Default)]
pub struct CodecModel {
    pub address: u8,
    pub page: u8,
    pub regs: BTreeMap<(u8, u8), u8>,
    /// Escritas recebidas: (página, registrador, valor).
    pub log: Vec<(u8, u8, u8)>,
    /// Sem ACK: toda transação aborta.
    pub nack: bool,
    pointer: u8,
    expect_reg: bool,
}

impl CodecModel {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            expect_reg: true,
            ..Default::default()
        }
    }

    pub fn reg(&self, page: u8, reg: u8) -> u8 {
        self.regs.get(&(page, reg)).copied().unwrap_or(0)
    }
}

pub struct SimBus {
    regs: BTreeMap<u32, u32>,
    forced: BTreeMap<u32, u32>,
    pub writes: Vec<Write>,
    pub reads: Vec<u32>,
    pub psram: Option<PsramModel>,
    pub codec: Option<CodecModel>,
    pub now_us: u64,
    pub uart_out: Vec<u8>,
    /// Leituras na janela XIP sem cache do CS0.
    pub dummy_reads: u32,
    fifo: VecDeque<u32>,
    rx: VecDeque<u32>,
    i2c_rx: VecDeque<u32>,
    i2c_abort: bool,
}

impl SimBus {
    pub fn new() -> Self {
        let mut bus = Self {
            regs: BTreeMap::new(),
            forced: BTreeMap::new(),
            writes: Vec::new(),
            reads: Vec::new(),
            psram: None,
            codec: None,
            now_us: 0,
            uart_out: Vec::new(),
            dummy_reads: 0,
            fifo: VecDeque::new(),
            rx: VecDeque::new(),
            i2c_rx: VecDeque::new(),
            i2c_abort: false,
        };
        // Estado de reset: clk_ref no ROSC, clk_sys no clk_ref, blocos em reset.
        bus.regs.insert(resets::RESET, 0xffff_ffff);
        bus.regs.insert(pll::SYS_BASE + pll::PWR, 0x2d);
        bus.regs.insert(pll::USB_BASE + pll::PWR, 0x2d);
        bus.regs.insert(qmi::M0_TIMING, 0x4000_0004);
        bus
    }

    pub fn with_psram(kgd: u8, eid: u8) -> Self {
        let mut bus = Self::new();
        bus.psram = Some(PsramModel::new(kgd, eid));
        bus
    }

    pub fn with_codec(address: u8) -> Self {
        let mut bus = Self::new();
        bus.codec = Some(CodecModel::new(address));
        bus
    }

    /// Fixa o valor lido em `addr`, ignorando o modelo.
    pub fn force(&mut self, addr: u32, value: u32) {
        self.forced.insert(addr, value);
    }

    /// Valor armazenado, sem efeitos colaterais de leitura.
    pub fn peek(&self, addr: u32) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    pub fn poke(&mut self, addr: u32, value: u32) {
        self.regs.insert(addr, value);
    }

    /// Escritas em um endereço, na ordem.
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|w| w.addr == addr)
            .map(|w| w.value)
            .collect()
    }

    /// Índice da primeira escrita em `addr`.
    pub fn first_write(&self, addr: u32) -> Option<usize> {
        self.writes.iter().position(|w| w.addr == addr)
    }

    /// Índice da última escrita em `addr`.
    pub fn last_write(&self, addr: u32) -> Option<usize> {
        self.writes.iter().rposition(|w| w.addr == addr)
    }

    fn model_read(&mut self, addr: u32) -> u32 {
        let stored = self.peek(addr);

        // CLOCKS SELECTED
        if (clocks::BASE..clocks::BASE + 10 * clocks::STRIDE).contains(&addr)
            && (addr - clocks::BASE) % clocks::STRIDE == 8
        {
            let ctrl = self.peek(addr - 8);
            return 1 << (ctrl & clocks::CTRL_SRC_MASK);
        }

        match addr {
            a if a == resets::RESET_DONE => !self.peek(resets::RESET),
            a if a == xosc::STATUS => {
                if self.peek(xosc::CTRL) & xosc::CTRL_ENABLE == xosc::CTRL_ENABLE {
                    xosc::STATUS_STABLE
                } else {
                    0
                }
            }
            a if a == pll::SYS_BASE + pll::CS || a == pll::USB_BASE + pll::CS => {
                let pwr = self.peek(a - pll::CS + pll::PWR);
                if pwr & (PWR_PD | PWR_VCOPD) == 0 {
                    stored | pll::CS_LOCK
                } else {
                    stored & !pll::CS_LOCK
                }
            }
            a if a == vreg::VREG => stored & !vreg::UPDATE_IN_PROGRESS,
            a if a == qmi::DIRECT_CSR => (stored & !CSR_BUSY) | CSR_TXEMPTY,
            a if a == qmi::DIRECT_RX => self.rx.pop_front().unwrap_or(0),
            a if a == io_qspi::SS_STATUS => io_qspi::STATUS_OUTTOPAD,
            a if a == timer::TIMERAWH => (self.now_us >> 32) as u32,
            a if a == timer::TIMERAWL => self.now_us as u32,
            a if a == sio::FIFO_ST => {
                let vld = if self.fifo.is_empty() { 0 } else { sio::FIFO_ST_VLD };
                vld | sio::FIFO_ST_RDY
            }
            a if a == sio::FIFO_RD => self.fifo.pop_front().unwrap_or(0),
            a if a == uart::FR => 0,
            a if a == i2c::STATUS => i2c::STATUS_TFNF | i2c::STATUS_TFE,
            a if a == i2c::RAW_INTR_STAT => {
                let abort = if self.i2c_abort { i2c::INTR_TX_ABRT } else { 0 };
                abort | i2c::INTR_STOP_DET
            }
            a if a == i2c::TX_ABRT_SOURCE => self.i2c_abort as u32,
            a if a == i2c::CLR_TX_ABRT => {
                self.i2c_abort = false;
                0
            }
            a if a == i2c::RXFLR => self.i2c_rx.len() as u32,
            a if a == i2c::DATA_CMD => self.i2c_rx.pop_front().unwrap_or(0),
            a if (xip::NOCACHE_NOALLOC_BASE..xip::NOCACHE_NOALLOC_BASE + 0x0100_0000)
                .contains(&a) =>
            {
                self.dummy_reads += 1;
                0
            }
            a if Self::is_m1(a) => self.psram_read(a),
            _ => stored,
        }
    }

    fn is_m1(addr: u32) -> bool {
        (xip::M1_BASE..xip::M1_BASE + 0x0100_0000).contains(&addr)
            || (xip::M1_NOCACHE_BASE..xip::M1_NOCACHE_BASE + 0x0100_0000).contains(&addr)
    }

    fn psram_read(&mut self, addr: u32) -> u32 {
        let offset = addr & 0x00ff_ffff;
        match &self.psram {
            Some(p) if p.functional => p.memory.get(&offset).copied().unwrap_or(0),
            Some(p) => !p.memory.get(&offset).copied().unwrap_or(0),
            None => 0xffff_ffff,
        }
    }

    fn psram_write(&mut self, addr: u32, value: u32) {
        let writable = self.peek(xip::CTRL) & xip::CTRL_WRITABLE_M1 != 0;
        if let Some(p) = self.psram.as_mut() {
            if writable {
                p.memory.insert(addr & 0x00ff_ffff, value);
            }
        }
    }

    fn qmi_csr_write(&mut self, value: u32) {
        let was = self.peek(qmi::DIRECT_CSR) & CSR_ASSERT_CS1N != 0;
        let now = value & CSR_ASSERT_CS1N != 0;
        if let Some(p) = self.psram.as_mut() {
            if !was && now {
                p.byte_index = 0;
                p.current = None;
            }
        }
    }

    fn qmi_tx_write(&mut self, value: u32) {
        let selected = self.peek(qmi::DIRECT_CSR) & CSR_ASSERT_CS1N != 0;
        let mut response = 0xff;
        if let (true, Some(p)) = (selected, self.psram.as_mut()) {
            let byte = (value & 0xff) as u8;
            let width = ((value >> qmi::TX_IWIDTH_SHIFT) & 0x3) as u8;
            if p.byte_index == 0 {
                p.current = Some(byte);
                p.commands.push((byte, width));
            }
            response = p.response(p.byte_index);
            p.byte_index += 1;
        }
        self.rx.push_back(response);
    }

    fn i2c_data_write(&mut self, value: u32) {
        let tar = self.peek(i2c::TAR) & 0x3ff;
        let Some(codec) = self.codec.as_mut() else {
            self.i2c_abort = true;
            return;
        };
        if codec.nack || tar != codec.address as u32 {
            self.i2c_abort = true;
            return;
        }

        if value & i2c::DATA_CMD_READ != 0 {
            let v = codec.reg(codec.page, codec.pointer);
            codec.pointer = codec.pointer.wrapping_add(1);
            self.i2c_rx.push_back(v as u32);
        } else {
            let byte = (value & 0xff) as u8;
            if codec.expect_reg {
                codec.pointer = byte;
                codec.expect_reg = false;
            } else {
                let page = codec.page;
                codec.regs.insert((page, codec.pointer), byte);
                codec.log.push((page, codec.pointer, byte));
                if codec.pointer == 0 {
                    codec.page = byte;
                }
                codec.pointer = codec.pointer.wrapping_add(1);
            }
        }
        if value & i2c::DATA_CMD_STOP != 0 {
            codec.expect_reg = true;
        }
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimBus {
    fn read(&mut self, addr: u32) -> u32 {
        self.reads.push(addr);
        // O modelo roda mesmo com valor fixo (efeitos colaterais de leitura).
        let modeled = self.model_read(addr);
        self.forced.get(&addr).copied().unwrap_or(modeled)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.writes.push(Write {
            addr,
            value,
            masked: !Cpu::are_interrupts_enabled(),
        });

        match addr {
            a if a == qmi::DIRECT_CSR => self.qmi_csr_write(value),
            a if a == qmi::DIRECT_TX => self.qmi_tx_write(value),
            a if a == sio::FIFO_WR => self.fifo.push_back(value),
            a if a == uart::DR => self.uart_out.push(value as u8),
            a if a == i2c::DATA_CMD => self.i2c_data_write(value),
            a if Self::is_m1(a) => self.psram_write(a, value),
            _ => {}
        }
        self.regs.insert(addr, value);
    }
}

/// Relógio de teste: avança `step` µs a cada consulta.
pub struct SimClock {
    now: Cell<u64>,
    step: u64,
}

impl SimClock {
    pub fn new(start: u64) -> Self {
        Self::stepping(start, 0)
    }

    pub fn stepping(start: u64, step: u64) -> Self {
        Self {
            now: Cell::new(start),
            step,
        }
    }

    pub fn set(&self, us: u64) {
        self.now.set(us);
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }
}

impl Monotonic for SimClock {
    fn now_us(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + self.step);
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_selected_follows_src() {
        let mut bus = SimBus::new();
        bus.write(clocks::ctrl(4), clocks::REF_SRC_XOSC);
        assert_eq!(bus.read(clocks::selected(4)), 0x4);
    }

    #[test]
    fn test_forced_value_wins() {
        let mut bus = SimBus::new();
        bus.force(xosc::STATUS, 0);
        bus.write(xosc::CTRL, xosc::CTRL_ENABLE);
        assert_eq!(bus.read(xosc::STATUS), 0);
    }

    #[test]
    fn test_fifo_echoes() {
        let mut bus = SimBus::new();
        bus.write(sio::FIFO_WR, 7);
        assert_ne!(bus.read(sio::FIFO_ST) & sio::FIFO_ST_VLD, 0);
        assert_eq!(bus.read(sio::FIFO_RD), 7);
    }
}
