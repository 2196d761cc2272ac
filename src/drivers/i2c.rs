// =============================================================================
// I2C0 (DW_apb_i2c) - MASTER
// =============================================================================
//
// Usado só para o codec de áudio. Cada transação tem timeout próprio,
// medido no relógio monotônico: um codec ausente ou travado vira `Timeout`
// ou `Nack`, nunca um loop infinito.
//
// =============================================================================

use crate::drivers::{gpio, resets};
use crate::hal::regs::{i2c, resets as rst};
use crate::hal::{Monotonic, RegisterBus};

/// Erros de transação I2C
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cError {
    /// Dispositivo não respondeu (abort do controlador)
    Nack,
    /// Transação não terminou dentro do prazo
    Timeout,
    /// Bloco não saiu do reset
    InitFailed,
}

impl I2cError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nack => "I2C: sem ACK do dispositivo",
            Self::Timeout => "I2C: timeout na transação",
            Self::InitFailed => "I2C: falha ao sair do reset",
        }
    }
}

impl ::core::fmt::Display for I2cError {
    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub type I2cResult<T> = Result<T, I2cError>;

/// Master I2C de 7 bits.
pub trait I2cBus {
    /// Escreve `bytes` e encerra com STOP.
    fn write(&mut self, addr: u8, bytes: &[u8]) -> I2cResult<()>;

    /// Escreve `bytes` sem STOP, depois lê `buf` com RESTART + STOP.
    fn write_read(&mut self, addr: u8, bytes: &[u8], buf: &mut [u8]) -> I2cResult<()>;
}

/// Controlador I2C0 do RP2350.
pub struct RpI2c<B: RegisterBus, M: Monotonic> {
    bus: B,
    clock: M,
    timeout_us: u64,
}

impl<B: RegisterBus, M: Monotonic> RpI2c<B, M> {
    /// Tira o bloco do reset, programa `baud` e mux dos pinos.
    pub fn init(
        mut bus: B,
        clock: M,
        peri_hz: u32,
        baud: u32,
        sda: u32,
        scl: u32,
        timeout_us: u64,
    ) -> I2cResult<Self> {
        resets::reset_block(&mut bus, rst::I2C0);
        resets::unreset_block_wait(&mut bus, rst::I2C0).map_err(|_| I2cError::InitFailed)?;

        bus.write(i2c::ENABLE, 0);
        bus.write(
            i2c::CON,
            i2c::CON_SPEED_FAST
                | i2c::CON_MASTER_MODE
                | i2c::CON_SLAVE_DISABLE
                | i2c::CON_RESTART_EN
                | i2c::CON_TX_EMPTY_CTRL,
        );

        let t = scl_timing(peri_hz, baud);
        bus.write(i2c::FS_SCL_HCNT, t.hcnt);
        bus.write(i2c::FS_SCL_LCNT, t.lcnt);
        bus.write(i2c::FS_SPKLEN, t.spklen);
        bus.write_masked(i2c::SDA_HOLD, t.sda_hold, 0xffff);
        bus.write(i2c::ENABLE, 1);

        gpio::set_i2c_function(&mut bus, sda);
        gpio::set_i2c_function(&mut bus, scl);

        Ok(Self {
            bus,
            clock,
            timeout_us,
        })
    }

    fn start(&mut self, addr: u8) {
        self.bus.write(i2c::ENABLE, 0);
        self.bus.write(i2c::TAR, addr as u32);
        self.bus.write(i2c::ENABLE, 1);
    }

    /// Espera `cond` com o prazo da transação.
    fn wait(&mut self, deadline: u64, mut cond: impl FnMut(&mut B) -> bool) -> I2cResult<()> {
        loop {
            if cond(&mut self.bus) {
                return Ok(());
            }
            if self.clock.now_us() > deadline {
                return Err(I2cError::Timeout);
            }
        }
    }

    fn check_abort(&mut self) -> I2cResult<()> {
        if self.bus.read(i2c::TX_ABRT_SOURCE) != 0 {
            let _ = self.bus.read(i2c::CLR_TX_ABRT);
            return Err(I2cError::Nack);
        }
        Ok(())
    }

    fn send(&mut self, bytes: &[u8], stop: bool, deadline: u64) -> I2cResult<()> {
        for (i, &b) in bytes.iter().enumerate() {
            let last = i + 1 == bytes.len();
            let cmd = if last && stop { i2c::DATA_CMD_STOP } else { 0 };
            self.bus.write(i2c::DATA_CMD, cmd | b as u32);

            self.wait(deadline, |bus| bus.read(i2c::STATUS) & i2c::STATUS_TFE != 0)?;
            self.check_abort()?;
        }

        if stop {
            self.wait(deadline, |bus| {
                bus.read(i2c::RAW_INTR_STAT) & i2c::INTR_STOP_DET != 0
            })?;
            let _ = self.bus.read(i2c::CLR_STOP_DET);
        }
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8], deadline: u64) -> I2cResult<()> {
        let len = buf.len();
        for (i, slot) in buf.iter_mut().enumerate() {
            let mut cmd = i2c::DATA_CMD_READ;
            if i == 0 {
                cmd |= i2c::DATA_CMD_RESTART;
            }
            if i + 1 == len {
                cmd |= i2c::DATA_CMD_STOP;
            }
            self.wait(deadline, |bus| bus.read(i2c::STATUS) & i2c::STATUS_TFNF != 0)?;
            self.bus.write(i2c::DATA_CMD, cmd);

            self.wait(deadline, |bus| bus.read(i2c::RXFLR) != 0)?;
            self.check_abort()?;
            *slot = (self.bus.read(i2c::DATA_CMD) & 0xff) as u8;
        }
        Ok(())
    }
}

impl<B: RegisterBus, M: Monotonic> I2cBus for RpI2c<B, M> {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> I2cResult<()> {
        let deadline = self.clock.now_us() + self.timeout_us;
        self.start(addr);
        self.send(bytes, true, deadline)
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buf: &mut [u8]) -> I2cResult<()> {
        let deadline = self.clock.now_us() + self.timeout_us;
        self.start(addr);
        self.send(bytes, false, deadline)?;
        let deadline = self.clock.now_us() + self.timeout_us;
        self.receive(buf, deadline)
    }
}

/// Contadores de SCL para um baud rate.
#[derive(Debug, PartialEq, Eq)]
pub struct SclTiming {
    pub hcnt: u32,
    pub lcnt: u32,
    pub spklen: u32,
    pub sda_hold: u32,
}

/// 40% do período alto, 60% baixo.
pub const fn scl_timing(clk_hz: u32, baud: u32) -> SclTiming {
    let period = (clk_hz + baud / 2) / baud;
    let lcnt = period * 3 / 5;
    let hcnt = period - lcnt;
    let spklen = if lcnt < 16 { 1 } else { lcnt / 16 };
    // 300 ns de hold (< 1 MHz)
    let sda_hold = ((clk_hz as u64 * 3) / 10_000_000) as u32 + 1;
    SclTiming {
        hcnt,
        lcnt,
        spklen,
        sda_hold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sim::{SimBus, SimClock};

    #[test]
    fn test_scl_timing_100khz() {
        let t = scl_timing(132_000_000, 100_000);
        assert_eq!(t.hcnt + t.lcnt, 1320);
        assert_eq!(t.lcnt, 792);
        assert_eq!(t.spklen, 49);
        assert_eq!(t.sda_hold, 40);
    }

    #[test]
    fn test_write_then_read_register() {
        let mut bus = SimBus::with_codec(0x18);
        let clock = SimClock::stepping(0, 1);
        let mut dev = RpI2c::init(&mut bus, &clock, 132_000_000, 100_000, 20, 21, 1000).unwrap();

        dev.write(0x18, &[0x41, 0x2c]).unwrap();
        let mut buf = [0u8; 1];
        dev.write_read(0x18, &[0x41], &mut buf).unwrap();
        assert_eq!(buf[0], 0x2c);
    }

    #[test]
    fn test_absent_device_nacks() {
        let mut bus = SimBus::with_codec(0x18);
        let clock = SimClock::stepping(0, 1);
        let mut dev = RpI2c::init(&mut bus, &clock, 132_000_000, 100_000, 20, 21, 1000).unwrap();

        assert_eq!(dev.write(0x19, &[0x00, 0x01]), Err(I2cError::Nack));
    }

    #[test]
    fn test_stuck_bus_times_out() {
        let mut bus = SimBus::with_codec(0x18);
        bus.force(i2c::STATUS, 0);
        let clock = SimClock::stepping(0, 10);
        let mut dev = RpI2c::init(&mut bus, &clock, 132_000_000, 100_000, 20, 21, 1000).unwrap();

        assert_eq!(dev.write(0x18, &[0x01, 0x01]), Err(I2cError::Timeout));
    }
}
