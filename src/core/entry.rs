//! Entry Point Lógico do Firmware.
//!
//! `bring_up` é o primeiro código de alto nível depois do reset handler.
//!
//! # Ordem
//! 1. **Clocks (passo 1)**: overclock a partir do PLL USB, IRQs mascaradas.
//! 2. **Serial + PSRAM**: com clk_peri estável a UART sobe; a PSRAM é
//!    calibrada para o clk_sys recém-configurado.
//! 3. **Clocks (passo 2)**: PLL SYS para o bit clock do vídeo.
//! 4. **Timer**: TIMER0 a partir do clk_ref (XOSC).
//!
//! Qualquer erro aqui é fatal para o chamador. PSRAM ausente não é erro:
//! a RAM emulada cai para `FALLBACK_RAM_SIZE` na SRAM interna.

use crate::core::config;
use crate::drivers::clocks::{sequencer, ClockDomain, ClockResult, ClockTree, PllConfig};
use crate::drivers::qmi::psram::{self, MemoryDeviceDescriptor};
use crate::drivers::video::needs_mirror;
use crate::drivers::{serial, timer};
use crate::hal::RegisterBus;

/// Estado do hardware após o bring-up.
#[derive(Debug, Clone)]
pub struct BootReport {
    pub clocks: ClockTree,
    pub bit_clock: PllConfig,
    pub psram: MemoryDeviceDescriptor,
}

impl BootReport {
    /// A RAM emulada vai para a PSRAM?
    pub fn psram_backed(&self) -> bool {
        config::USE_PSRAM && self.psram.size() >= config::RAM_SIZE
    }

    /// Tamanho efetivo da RAM emulada.
    pub fn ram_size(&self) -> usize {
        if self.psram_backed() {
            config::RAM_SIZE
        } else {
            config::FALLBACK_RAM_SIZE
        }
    }

    /// O scan-out lê de um espelho na SRAM em vez da RAM emulada?
    pub fn mirror_framebuffer(&self) -> bool {
        needs_mirror(self.psram_backed(), config::GEOMETRY)
    }
}

/// Clocks, serial, PSRAM e timer.
pub fn bring_up<B: RegisterBus>(bus: &mut B) -> ClockResult<BootReport> {
    let mut clocks = ClockTree::at_reset(config::XOSC_HZ);
    let mut psram = MemoryDeviceDescriptor::ABSENT;

    let bit_clock = sequencer::configure_clocks(
        bus,
        &mut clocks,
        config::SYS_CLOCK,
        config::BIT_CLK_KHZ,
        |bus, tree| {
            serial::init(
                bus,
                tree.freq_hz(ClockDomain::Peri),
                config::PIN_UART_TX,
                config::PIN_UART_RX,
            );
            crate::kinfo!("picomac: clocks prontos");
            if config::USE_PSRAM {
                psram = psram::probe_and_configure(
                    bus,
                    tree.freq_hz(ClockDomain::Sys),
                    config::PIN_PSRAM_CS,
                );
            }
        },
    )?;

    timer::init(bus, clocks.freq_hz(ClockDomain::Ref) / 1_000_000)?;
    crate::kok!("(Boot) Hardware pronto");

    Ok(BootReport {
        clocks,
        bit_clock,
        psram,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::clocks::ClockError;
    use crate::drivers::qmi::psram::KGD_PASS;
    use crate::hal::regs::{clocks as clk_regs, ticks, uart};
    use crate::hal::sim::SimBus;

    #[test]
    fn test_bring_up_reaches_targets() {
        let mut bus = SimBus::with_psram(KGD_PASS, 0x26);
        let report = bring_up(&mut bus).unwrap();

        assert_eq!(report.clocks.freq_hz(ClockDomain::Sys), config::SYS_CLOCK.hz());
        assert_eq!(report.clocks.freq_hz(ClockDomain::Hstx), 126_000_000);
        assert_eq!(report.bit_clock.output_khz(), 126_000);
        assert_eq!(bus.peek(ticks::TIMER0_CYCLES), 12);

        if config::USE_PSRAM {
            assert_eq!(report.psram.size(), 8 * 1024 * 1024);
            assert!(report.psram_backed());
        } else {
            assert!(!report.psram.is_present());
        }
    }

    #[test]
    fn test_uart_and_psram_between_passes() {
        let mut bus = SimBus::with_psram(KGD_PASS, 0x26);
        bring_up(&mut bus).unwrap();

        // Passo 1 termina com clk_sys no PLL USB; a UART sobe depois disso
        // e antes do clk_hstx ser configurado.
        let sys_ctrl = bus.last_write(clk_regs::ctrl(ClockDomain::Sys.index())).unwrap();
        let uart_en = bus.first_write(uart::CR).unwrap();
        let hstx_div = bus.last_write(clk_regs::div(ClockDomain::Hstx.index())).unwrap();
        assert!(sys_ctrl < uart_en);
        assert!(uart_en < hstx_div);
    }

    #[test]
    fn test_missing_psram_falls_back_to_sram() {
        // KGD inválido: nenhum dispositivo no CS1
        let mut bus = SimBus::with_psram(0x55, 0x26);
        let report = bring_up(&mut bus).unwrap();

        assert!(!report.psram.is_present());
        assert!(!report.psram_backed());
        assert_eq!(report.ram_size(), config::FALLBACK_RAM_SIZE);
        assert_eq!(report.mirror_framebuffer(), needs_mirror(false, config::GEOMETRY));
        // O resto do bring-up segue normalmente
        assert_eq!(bus.peek(ticks::TIMER0_CYCLES), 12);
    }

    #[test]
    fn test_psram_backed_ram_size() {
        let mut bus = SimBus::with_psram(KGD_PASS, 0x26);
        let report = bring_up(&mut bus).unwrap();
        if config::USE_PSRAM {
            assert_eq!(report.ram_size(), config::RAM_SIZE);
            assert!(report.mirror_framebuffer());
        } else {
            assert_eq!(report.ram_size(), config::FALLBACK_RAM_SIZE);
        }
    }

    #[test]
    fn test_stuck_clock_select_is_an_error() {
        let mut bus = SimBus::with_psram(KGD_PASS, 0x26);
        bus.force(clk_regs::selected(ClockDomain::Sys.index()), 0);
        assert_eq!(bring_up(&mut bus).err(), Some(ClockError::Timeout));
    }
}
