// =============================================================================
// PSRAM (QMI M1) - SONDAGEM E CALIBRAÇÃO
// =============================================================================
//
// PROTOCOLO (IRQs mascaradas, modo direto a CLKDIV 30):
//
//   1. Modo direto ligado; espera BUSY limpar.
//   2. CS1: 0xF5 em quad (tira o chip do modo QPI); resposta descartada.
//   3. CS1: 0x9F + 6x 0xFF; byte 5 = KGD, byte 6 = EID.
//   4. KGD != 0x5D => sem PSRAM.
//   5. 0x66, 0x99, 0x35, 0xC0, cada um numa janela de CS própria, seguido
//      de 20 NOPs.
//   6. Capacidade pelo EID.
//   7. Timing do M1 calculado a partir do clk_sys ATUAL.
//   8. Formatos de leitura (0xEB, quad, 24 bits de dummy) e escrita (0x38).
//   9. M1 gravável; escreve 0x12345678 e lê de volta.
//
// Qualquer falha (KGD errado, timeout, verificação) resulta em capacidade
// zero. Nunca é fatal: o emulador cai para a RAM interna.
//
// =============================================================================

use super::{
    cs1_assert, cs1_release, direct_enter, direct_exit, direct_transfer, QmiFormat, QmiTiming,
    Width, DIRECT_CLKDIV,
};
use crate::arch::{nop_delay, InterruptGuard};
use crate::drivers::gpio;
use crate::hal::regs::{io_bank0, qmi as regs, xip};
use crate::hal::{RegisterBus, Timeout};

// =============================================================================
// TABELA DE COMANDOS
// =============================================================================

/// Uma transferência do protocolo de sondagem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub command: u8,
    pub width: Width,
    /// Bytes de resposta lidos depois do comando.
    pub response_len: usize,
    pub purpose: &'static str,
}

/// Sai do modo QPI (se um boot anterior deixou o chip nele).
pub const EXIT_QPI: Transfer = Transfer {
    command: 0xf5,
    width: Width::Quad,
    response_len: 0,
    purpose: "exit QPI",
};

/// Leitura de ID: KGD e EID nos bytes 5 e 6 da janela.
pub const READ_ID: Transfer = Transfer {
    command: 0x9f,
    width: Width::Single,
    response_len: 6,
    purpose: "read ID",
};

pub const KGD_INDEX: usize = 5;
pub const EID_INDEX: usize = 6;

/// Known Good Die.
pub const KGD_PASS: u8 = 0x5d;

/// Sequência de habilitação, na ordem.
pub const ENABLE_SEQUENCE: [Transfer; 4] = [
    Transfer {
        command: 0x66,
        width: Width::Single,
        response_len: 0,
        purpose: "reset enable",
    },
    Transfer {
        command: 0x99,
        width: Width::Single,
        response_len: 0,
        purpose: "reset",
    },
    Transfer {
        command: 0x35,
        width: Width::Single,
        response_len: 0,
        purpose: "quad enable",
    },
    Transfer {
        command: 0xc0,
        width: Width::Single,
        response_len: 0,
        purpose: "wrap boundary toggle",
    },
];

/// NOPs entre comandos da sequência de habilitação.
pub const SETTLE_NOPS: u32 = 20;

pub const READ_COMMAND: u8 = 0xeb;
pub const WRITE_COMMAND: u8 = 0x38;

pub const READ_FORMAT: QmiFormat = QmiFormat {
    prefix_width: Width::Quad,
    addr_width: Width::Quad,
    suffix_width: Width::Quad,
    dummy_width: Width::Quad,
    data_width: Width::Quad,
    prefix_bits: 8,
    dummy_bits: 24,
};

pub const WRITE_FORMAT: QmiFormat = QmiFormat {
    prefix_width: Width::Quad,
    addr_width: Width::Quad,
    suffix_width: Width::Quad,
    dummy_width: Width::Quad,
    data_width: Width::Quad,
    prefix_bits: 8,
    dummy_bits: 0,
};

pub const VERIFY_PATTERN: u32 = 0x1234_5678;

// =============================================================================
// CAPACIDADE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Absent,
    Mib1,
    Mib2,
    Mib4,
    Mib8,
}

impl Capacity {
    /// Classe de tamanho pelo EID (bits 7:5).
    pub const fn from_eid(eid: u8) -> Self {
        if eid == 0x26 {
            return Self::Mib8;
        }
        match eid >> 5 {
            0 => Self::Mib2,
            1 => Self::Mib4,
            2 => Self::Mib8,
            _ => Self::Mib1,
        }
    }

    pub const fn bytes(self) -> usize {
        const MIB: usize = 1024 * 1024;
        match self {
            Self::Absent => 0,
            Self::Mib1 => MIB,
            Self::Mib2 => 2 * MIB,
            Self::Mib4 => 4 * MIB,
            Self::Mib8 => 8 * MIB,
        }
    }
}

// =============================================================================
// TIMING
// =============================================================================

const FS_PER_SEC: u64 = 1_000_000_000_000_000;

/// Limites elétricos do chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceTiming {
    /// CS máximo ativo, em fs/64 (8 µs).
    pub max_select_fs64: u64,
    /// CS mínimo inativo, em fs.
    pub min_deselect_fs: u64,
    /// Atraso de amostragem RX, em fs.
    pub rx_delay_fs: u64,
    pub max_sck_hz: u32,
    /// 2 = quebra a cada 1024 bytes.
    pub pagebreak: u32,
    pub select_hold: u32,
    pub cooldown: u32,
}

/// APS6404L / compatíveis.
pub const APS6404: DeviceTiming = DeviceTiming {
    max_select_fs64: 125_000_000,
    min_deselect_fs: 50_000_000,
    rx_delay_fs: 3_333_333,
    max_sck_hz: 133_000_000,
    pagebreak: 2,
    select_hold: 3,
    cooldown: 1,
};

/// Timing do M1 para um clk_sys específico.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingParameters {
    pub max_select: u32,
    pub min_deselect: u32,
    pub rxdelay: u32,
    pub clkdiv: u32,
    pub pagebreak: u32,
    pub select_hold: u32,
    pub cooldown: u32,
}

/// Valores em ciclos, antes de caber nos campos.
struct RawTiming {
    max_select: u64,
    min_deselect: u64,
    rxdelay: u64,
    clkdiv: u32,
}

impl RawTiming {
    fn compute(sys_hz: u32, dev: &DeviceTiming) -> Self {
        let fs_per_cycle = FS_PER_SEC / sys_hz as u64;
        let fs_per_half = fs_per_cycle / 2;
        Self {
            max_select: dev.max_select_fs64 / fs_per_cycle,
            min_deselect: dev.min_deselect_fs.div_ceil(fs_per_cycle),
            rxdelay: dev.rx_delay_fs.div_ceil(fs_per_half),
            clkdiv: sys_hz.div_ceil(dev.max_sck_hz),
        }
    }
}

impl TimingParameters {
    /// Função pura de (limites do chip, clk_sys). Valores saturam na
    /// largura do campo; ver `saturates`.
    pub fn derive(sys_hz: u32, dev: &DeviceTiming) -> Self {
        let raw = RawTiming::compute(sys_hz, dev);
        Self {
            max_select: raw.max_select.min(0x3f) as u32,
            min_deselect: raw.min_deselect.min(0x1f) as u32,
            rxdelay: raw.rxdelay.min(0x7) as u32,
            clkdiv: raw.clkdiv.min(0xff),
            pagebreak: dev.pagebreak,
            select_hold: dev.select_hold,
            cooldown: dev.cooldown,
        }
    }

    /// Algum mínimo do chip não cabe no campo do M1 a este clk_sys?
    ///
    /// `max_select` fica de fora: saturar um limite superior para baixo
    /// continua respeitando o chip.
    pub fn saturates(sys_hz: u32, dev: &DeviceTiming) -> bool {
        let raw = RawTiming::compute(sys_hz, dev);
        raw.min_deselect > 0x1f || raw.rxdelay > 0x7 || raw.clkdiv > 0xff
    }

    pub const fn to_qmi(&self) -> QmiTiming {
        QmiTiming {
            cooldown: self.cooldown,
            pagebreak: self.pagebreak,
            select_hold: self.select_hold,
            max_select: self.max_select,
            min_deselect: self.min_deselect,
            rxdelay: self.rxdelay,
            clkdiv: self.clkdiv,
        }
    }

    /// Clock efetivo da PSRAM.
    pub const fn sck_hz(&self, sys_hz: u32) -> u32 {
        sys_hz / self.clkdiv
    }
}

// =============================================================================
// DESCRITOR
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDeviceDescriptor {
    pub vendor: u8,
    pub eid: u8,
    pub capacity: Capacity,
    /// `Some` se o M1 foi programado.
    pub timing: Option<TimingParameters>,
}

impl MemoryDeviceDescriptor {
    pub const ABSENT: Self = Self {
        vendor: 0,
        eid: 0,
        capacity: Capacity::Absent,
        timing: None,
    };

    pub const fn size(&self) -> usize {
        self.capacity.bytes()
    }

    pub const fn is_present(&self) -> bool {
        !matches!(self.capacity, Capacity::Absent)
    }
}

// =============================================================================
// SONDAGEM
// =============================================================================

/// Uma transferência isolada numa janela de CS.
fn command<B: RegisterBus>(bus: &mut B, t: &Transfer) -> Result<(), Timeout> {
    cs1_assert(bus);
    direct_transfer(bus, t.command, t.width)?;
    cs1_release(bus);
    Ok(())
}

fn read_id<B: RegisterBus>(bus: &mut B) -> Result<(u8, u8), Timeout> {
    let (mut kgd, mut eid) = (0, 0);
    cs1_assert(bus);
    for i in 0..=READ_ID.response_len {
        let tx = if i == 0 { READ_ID.command } else { 0xff };
        let rx = direct_transfer(bus, tx, READ_ID.width)?;
        match i {
            KGD_INDEX => kgd = rx,
            EID_INDEX => eid = rx,
            _ => {}
        }
    }
    direct_exit(bus);
    Ok((kgd, eid))
}

/// Passos 1-8. `Ok` com capacidade `Absent` se o KGD não bater.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
fn probe_masked<B: RegisterBus>(
    bus: &mut B,
    sys_hz: u32,
    dev: &DeviceTiming,
) -> Result<MemoryDeviceDescriptor, Timeout> {
    direct_enter(bus, DIRECT_CLKDIV)?;
    command(bus, &EXIT_QPI)?;

    let (kgd, eid) = read_id(bus)?;
    if kgd != KGD_PASS {
        return Ok(MemoryDeviceDescriptor {
            vendor: kgd,
            eid,
            ..MemoryDeviceDescriptor::ABSENT
        });
    }

    direct_enter(bus, DIRECT_CLKDIV)?;
    for t in ENABLE_SEQUENCE.iter() {
        command(bus, t)?;
        nop_delay(SETTLE_NOPS);
    }
    direct_exit(bus);

    let timing = TimingParameters::derive(sys_hz, dev);
    bus.write(regs::M1_TIMING, timing.to_qmi().encode());
    bus.write(regs::M1_RFMT, READ_FORMAT.encode());
    bus.write(regs::M1_RCMD, (READ_COMMAND as u32) << regs::CMD_PREFIX_SHIFT);
    bus.write(regs::M1_WFMT, WRITE_FORMAT.encode());
    bus.write(regs::M1_WCMD, (WRITE_COMMAND as u32) << regs::CMD_PREFIX_SHIFT);

    Ok(MemoryDeviceDescriptor {
        vendor: kgd,
        eid,
        capacity: Capacity::from_eid(eid),
        timing: Some(timing),
    })
}

/// Sonda a PSRAM no CS1 (`cs_pin`) e configura o M1 para `sys_hz`.
pub fn probe_and_configure<B: RegisterBus>(
    bus: &mut B,
    sys_hz: u32,
    cs_pin: u32,
) -> MemoryDeviceDescriptor {
    if TimingParameters::saturates(sys_hz, &APS6404) {
        kwarn!("(PSRAM) Timing nao cabe no M1, clk_sys Hz: "; sys_hz);
        return MemoryDeviceDescriptor::ABSENT;
    }
    gpio::set_function(bus, cs_pin, io_bank0::FUNC_XIP_CS1);

    let probed = {
        let _guard = InterruptGuard::new();
        let r = probe_masked(bus, sys_hz, &APS6404);
        if r.is_err() {
            direct_exit(bus);
        }
        r
    };

    let desc = match probed {
        Ok(d) if d.is_present() => d,
        Ok(d) => {
            kwarn!("(PSRAM) KGD invalido: ", d.vendor);
            return d;
        }
        Err(_) => {
            kwarn!("(PSRAM) Timeout no modo direto do QMI");
            return MemoryDeviceDescriptor::ABSENT;
        }
    };

    // Verificação pela janela sem cache
    bus.set_bits(xip::CTRL, xip::CTRL_WRITABLE_M1);
    bus.write(xip::M1_NOCACHE_BASE, VERIFY_PATTERN);
    let readback = bus.read(xip::M1_NOCACHE_BASE);
    if readback != VERIFY_PATTERN {
        kerror!("(PSRAM) Verificacao falhou, lido: ", readback);
        return MemoryDeviceDescriptor {
            capacity: Capacity::Absent,
            ..desc
        };
    }

    kinfo!("(PSRAM) Bytes: "; desc.size());
    if let Some(t) = desc.timing {
        kdebug!("(PSRAM) M1 TIMING: ", t.to_qmi().encode());
        kdebug!("(PSRAM) SCK Hz: "; t.sck_hz(sys_hz));
    }
    desc
}
