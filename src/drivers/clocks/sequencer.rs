// =============================================================================
// CLOCK SEQUENCER
// =============================================================================
//
// Leva o chip do estado do boot ROM para os clocks da aplicação.
//
// PASSO 1 (overclock, IRQs mascaradas, rodando da RAM):
//   1. Divisor do M0 (flash) em 6, VREG em 1.15 V, leitura dummy no XIP.
//   2. XOSC ligado; clk_sys -> clk_ref (SELECTED == 0x1);
//      clk_ref -> XOSC (SELECTED == 0x4).
//   3. clk_usb, clk_adc, clk_peri e clk_hstx parados.
//   4. PLL USB: VCO 1584 MHz, /3 /1 = 528 MHz.
//   5. clk_sys = 528 / {2,3,4}; clk_peri = 132 MHz; clk_usb = clk_adc = 48 MHz.
//   6. Timing rápido do M0 + leitura dummy.
//
// PASSO 2 (bit clock do vídeo):
//   clk_hstx = bit clock / 2, pelo PLL SYS. Sem configuração exata => erro
//   (o chamador trata como fatal).
//
// =============================================================================

use super::pll::{self, Pll, PllConfig};
use super::vreg::{self, CoreVoltage};
use super::{configure, stop, xosc, ClockDomain, ClockError, ClockResult, ClockSource, ClockTree};
use crate::arch::InterruptGuard;
use crate::drivers::{qmi, resets, serial};
use crate::hal::regs::resets as rst;
use crate::hal::RegisterBus;

/// clk_sys = 528 MHz / divisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum SysClockSpeed {
    Mhz264 = 2,
    Mhz176 = 3,
    Mhz132 = 4,
}

impl SysClockSpeed {
    pub const fn divider(self) -> u32 {
        self as u32
    }

    pub const fn hz(self) -> u32 {
        USB_PLL_HZ / self.divider()
    }
}

/// VCO do PLL USB e pós-divisores: 1584 / 3 / 1 = 528 MHz.
pub const USB_PLL: ClockResult<PllConfig> = PllConfig::new(1_584_000, 3, 1);
pub const USB_PLL_HZ: u32 = 528_000_000;
pub const PERI_HZ: u32 = USB_PLL_HZ / 4;
pub const USB_HZ: u32 = 48_000_000;

/// Passo 1: overclock a partir do PLL USB.
#[cfg_attr(all(target_arch = "arm", target_os = "none"), link_section = ".data.ramfunc")]
#[inline(never)]
pub fn overclock<B: RegisterBus>(
    bus: &mut B,
    tree: &mut ClockTree,
    speed: SysClockSpeed,
) -> ClockResult<()> {
    // clk_peri vai parar: UART muda de divisor
    serial::suspend();
    let usb_pll = USB_PLL?;

    let _guard = InterruptGuard::new();

    qmi::slow_flash_clock(bus);
    vreg::set_voltage(bus, CoreVoltage::V1_15)?;
    qmi::xip_dummy_read(bus);

    xosc::init(bus)?;
    resets::unreset_block_wait(bus, rst::PLL_SYS | rst::PLL_USB)?;

    // ref e sys saem das fontes auxiliares antes de mexer nos PLLs
    super::select_glitchless(bus, tree, ClockDomain::Sys, ClockSource::ClkRef)?;
    super::select_glitchless(bus, tree, ClockDomain::Ref, ClockSource::Xosc)?;

    stop(bus, tree, ClockDomain::Usb);
    stop(bus, tree, ClockDomain::Adc);
    stop(bus, tree, ClockDomain::Peri);
    stop(bus, tree, ClockDomain::Hstx);

    pll::init(bus, Pll::Usb, &usb_pll)?;
    tree.pll_usb_hz = usb_pll.output_hz();

    configure(bus, tree, ClockDomain::Sys, ClockSource::PllUsb, speed.hz())?;
    configure(bus, tree, ClockDomain::Peri, ClockSource::PllUsb, PERI_HZ)?;
    configure(bus, tree, ClockDomain::Usb, ClockSource::PllUsb, USB_HZ)?;
    configure(bus, tree, ClockDomain::Adc, ClockSource::PllUsb, USB_HZ)?;

    qmi::apply_flash_timing(bus)?;
    Ok(())
}

/// Passo 2: clk_hstx = `bit_clk_khz / 2`, exato, pelo PLL SYS.
pub fn configure_bit_clock<B: RegisterBus>(
    bus: &mut B,
    tree: &mut ClockTree,
    bit_clk_khz: u32,
) -> ClockResult<PllConfig> {
    let pixel_khz = bit_clk_khz >> 1;
    let cfg = PllConfig::search(pixel_khz).ok_or(ClockError::Unreachable)?;

    pll::init(bus, Pll::Sys, &cfg)?;
    tree.pll_sys_hz = cfg.output_hz();

    configure(bus, tree, ClockDomain::Hstx, ClockSource::PllSys, cfg.output_hz())?;
    Ok(cfg)
}

/// Sequência completa. `after_overclock` roda entre os dois passos, com
/// clk_peri já estável (UART, calibração da PSRAM).
pub fn configure_clocks<B, F>(
    bus: &mut B,
    tree: &mut ClockTree,
    speed: SysClockSpeed,
    bit_clk_khz: u32,
    after_overclock: F,
) -> ClockResult<PllConfig>
where
    B: RegisterBus,
    F: FnOnce(&mut B, &ClockTree),
{
    overclock(bus, tree, speed)?;
    after_overclock(bus, tree);

    kinfo!("(CLK) Overclock concluido, clk_sys Hz: "; tree.freq_hz(ClockDomain::Sys));
    super::report(tree);

    kinfo!("(CLK) Bit clock kHz: "; bit_clk_khz);
    let cfg = configure_bit_clock(bus, tree, bit_clk_khz)?;
    kinfo!("(CLK) clk_hstx Hz: "; tree.freq_hz(ClockDomain::Hstx));
    Ok(cfg)
}
