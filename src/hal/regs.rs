//! Mapa de registradores do RP2350 usado pelo firmware.
//!
//! Apenas os blocos e campos que o firmware toca. Endereços absolutos,
//! campos como (shift, máscara) já posicionados.

// =============================================================================
// ALIASES ATÔMICOS
// =============================================================================
// Não existem no SIO nem na janela XIP.

pub const REG_ALIAS_XOR: u32 = 0x1000;
pub const REG_ALIAS_SET: u32 = 0x2000;
pub const REG_ALIAS_CLR: u32 = 0x3000;

// =============================================================================
// RESETS
// =============================================================================

pub mod resets {
    pub const BASE: u32 = 0x4002_0000;
    pub const RESET: u32 = BASE;
    pub const RESET_DONE: u32 = BASE + 0x08;

    pub const I2C0: u32 = 1 << 4;
    pub const IO_BANK0: u32 = 1 << 6;
    pub const PADS_BANK0: u32 = 1 << 9;
    pub const PLL_SYS: u32 = 1 << 14;
    pub const PLL_USB: u32 = 1 << 15;
    pub const TIMER0: u32 = 1 << 23;
    pub const UART0: u32 = 1 << 26;
}

// =============================================================================
// CLOCKS
// =============================================================================

pub mod clocks {
    pub const BASE: u32 = 0x4001_0000;

    /// Cada clock ocupa 3 words: CTRL, DIV, SELECTED.
    pub const STRIDE: u32 = 12;

    pub const fn ctrl(index: u32) -> u32 {
        BASE + index * STRIDE
    }
    pub const fn div(index: u32) -> u32 {
        BASE + index * STRIDE + 4
    }
    pub const fn selected(index: u32) -> u32 {
        BASE + index * STRIDE + 8
    }

    pub const CTRL_SRC_MASK: u32 = 0x3;
    pub const CTRL_AUXSRC_SHIFT: u32 = 5;
    pub const CTRL_AUXSRC_MASK: u32 = 0x7 << CTRL_AUXSRC_SHIFT;
    pub const CTRL_ENABLE: u32 = 1 << 11;

    /// DIV é ponto fixo 16.16.
    pub const DIV_INT_SHIFT: u32 = 16;

    // clk_ref: SRC 0 = ROSC, 1 = AUX, 2 = XOSC
    pub const REF_SRC_ROSC: u32 = 0;
    pub const REF_SRC_XOSC: u32 = 2;
    // clk_sys: SRC 0 = clk_ref, 1 = AUX
    pub const SYS_SRC_REF: u32 = 0;
    pub const SYS_SRC_AUX: u32 = 1;

    pub const SYS_AUXSRC_PLL_SYS: u32 = 0;
    pub const SYS_AUXSRC_PLL_USB: u32 = 1;
    pub const PERI_AUXSRC_CLK_SYS: u32 = 0;
    pub const PERI_AUXSRC_PLL_SYS: u32 = 1;
    pub const PERI_AUXSRC_PLL_USB: u32 = 2;
    pub const HSTX_AUXSRC_CLK_SYS: u32 = 0;
    pub const HSTX_AUXSRC_PLL_SYS: u32 = 1;
    pub const USB_AUXSRC_PLL_USB: u32 = 0;
    pub const ADC_AUXSRC_PLL_USB: u32 = 0;
}

// =============================================================================
// XOSC
// =============================================================================

pub mod xosc {
    pub const BASE: u32 = 0x4004_8000;
    pub const CTRL: u32 = BASE;
    pub const STATUS: u32 = BASE + 0x04;
    pub const STARTUP: u32 = BASE + 0x0c;

    pub const CTRL_FREQ_RANGE_1_15MHZ: u32 = 0xaa0;
    pub const CTRL_ENABLE: u32 = 0xfab << 12;
    pub const STATUS_STABLE: u32 = 1 << 31;

    /// ~1 ms de startup a 12 MHz (unidades de 256 ciclos).
    pub const STARTUP_DELAY: u32 = 47;

    pub const FREQ_HZ: u32 = 12_000_000;
}

// =============================================================================
// PLL (SYS / USB)
// =============================================================================

pub mod pll {
    pub const SYS_BASE: u32 = 0x4005_0000;
    pub const USB_BASE: u32 = 0x4005_8000;

    pub const CS: u32 = 0x00;
    pub const PWR: u32 = 0x04;
    pub const FBDIV_INT: u32 = 0x08;
    pub const PRIM: u32 = 0x0c;

    pub const CS_REFDIV_MASK: u32 = 0x3f;
    pub const CS_LOCK: u32 = 1 << 31;

    pub const PRIM_POSTDIV1_SHIFT: u32 = 16;
    pub const PRIM_POSTDIV2_SHIFT: u32 = 12;
}

// =============================================================================
// POWMAN (VREG)
// =============================================================================

pub mod vreg {
    pub const VREG: u32 = 0x4010_000c;
    pub const PASSWORD: u32 = 0x5afe_0000;
    pub const UPDATE_IN_PROGRESS: u32 = 1 << 15;
    pub const VSEL_SHIFT: u32 = 4;
    pub const VSEL_MASK: u32 = 0x1f << VSEL_SHIFT;
}

// =============================================================================
// QMI
// =============================================================================

pub mod qmi {
    pub const BASE: u32 = 0x400d_0000;
    pub const DIRECT_CSR: u32 = BASE;
    pub const DIRECT_TX: u32 = BASE + 0x04;
    pub const DIRECT_RX: u32 = BASE + 0x08;
    pub const M0_TIMING: u32 = BASE + 0x0c;
    pub const M1_TIMING: u32 = BASE + 0x20;
    pub const M1_RFMT: u32 = BASE + 0x24;
    pub const M1_RCMD: u32 = BASE + 0x28;
    pub const M1_WFMT: u32 = BASE + 0x2c;
    pub const M1_WCMD: u32 = BASE + 0x30;

    pub const CSR_CLKDIV_SHIFT: u32 = 22;
    pub const CSR_CLKDIV_MASK: u32 = 0xff << CSR_CLKDIV_SHIFT;

    pub const TX_IWIDTH_SHIFT: u32 = 16;
    pub const TX_OE: u32 = 1 << 19;

    pub const TIMING_COOLDOWN_SHIFT: u32 = 30;
    pub const TIMING_PAGEBREAK_SHIFT: u32 = 28;
    pub const TIMING_SELECT_HOLD_SHIFT: u32 = 23;
    pub const TIMING_MAX_SELECT_SHIFT: u32 = 17;
    pub const TIMING_MIN_DESELECT_SHIFT: u32 = 12;
    pub const TIMING_RXDELAY_SHIFT: u32 = 8;
    pub const TIMING_CLKDIV_SHIFT: u32 = 0;
    pub const TIMING_CLKDIV_MASK: u32 = 0xff;

    pub const FMT_PREFIX_WIDTH_SHIFT: u32 = 0;
    pub const FMT_ADDR_WIDTH_SHIFT: u32 = 2;
    pub const FMT_SUFFIX_WIDTH_SHIFT: u32 = 4;
    pub const FMT_DUMMY_WIDTH_SHIFT: u32 = 6;
    pub const FMT_DATA_WIDTH_SHIFT: u32 = 8;
    pub const FMT_PREFIX_LEN_SHIFT: u32 = 12;
    pub const FMT_DUMMY_LEN_SHIFT: u32 = 16;

    pub const CMD_PREFIX_SHIFT: u32 = 0;
}

// =============================================================================
// XIP
// =============================================================================

pub mod xip {
    pub const CTRL: u32 = 0x400c_8000;
    pub const CTRL_WRITABLE_M1: u32 = 1 << 11;

    /// Janela sem cache do CS0 (flash).
    pub const NOCACHE_NOALLOC_BASE: u32 = 0x1400_0000;
    /// Janela cacheada do CS1 (PSRAM).
    pub const M1_BASE: u32 = 0x1100_0000;
    /// Janela sem cache do CS1.
    pub const M1_NOCACHE_BASE: u32 = 0x1500_0000;
}

// =============================================================================
// IO_QSPI / IO_BANK0 / PADS_BANK0
// =============================================================================

pub mod io_qspi {
    /// STATUS do pino QSPI_SS (CS0 da flash).
    pub const SS_STATUS: u32 = 0x4003_0018;
    pub const STATUS_OUTTOPAD: u32 = 1 << 9;
}

pub mod io_bank0 {
    pub const BASE: u32 = 0x4002_8000;

    pub const fn ctrl(pin: u32) -> u32 {
        BASE + 8 * pin + 4
    }

    pub const FUNCSEL_MASK: u32 = 0x1f;

    pub const FUNC_UART: u32 = 2;
    pub const FUNC_I2C: u32 = 3;
    pub const FUNC_SIO: u32 = 5;
    pub const FUNC_XIP_CS1: u32 = 9;
}

pub mod pads_bank0 {
    pub const BASE: u32 = 0x4003_8000;

    pub const fn pad(pin: u32) -> u32 {
        BASE + 4 + 4 * pin
    }

    pub const PUE: u32 = 1 << 3;
    pub const IE: u32 = 1 << 6;
    pub const OD: u32 = 1 << 7;
    pub const ISO: u32 = 1 << 8;
}

// =============================================================================
// SIO
// =============================================================================

pub mod sio {
    pub const BASE: u32 = 0xd000_0000;
    pub const CPUID: u32 = BASE;
    pub const GPIO_OUT_SET: u32 = BASE + 0x18;
    pub const GPIO_HI_OUT_SET: u32 = BASE + 0x1c;
    pub const GPIO_OUT_CLR: u32 = BASE + 0x20;
    pub const GPIO_HI_OUT_CLR: u32 = BASE + 0x24;
    pub const GPIO_OE_SET: u32 = BASE + 0x38;
    pub const GPIO_HI_OE_SET: u32 = BASE + 0x3c;
    pub const FIFO_ST: u32 = BASE + 0x50;
    pub const FIFO_WR: u32 = BASE + 0x54;
    pub const FIFO_RD: u32 = BASE + 0x58;

    pub const FIFO_ST_VLD: u32 = 1 << 0;
    pub const FIFO_ST_RDY: u32 = 1 << 1;
}

// =============================================================================
// TIMER0 / TICKS
// =============================================================================

pub mod timer {
    pub const BASE: u32 = 0x400b_0000;
    pub const TIMERAWH: u32 = BASE + 0x24;
    pub const TIMERAWL: u32 = BASE + 0x28;
}

pub mod ticks {
    pub const TIMER0_CTRL: u32 = 0x4010_8018;
    pub const TIMER0_CYCLES: u32 = 0x4010_801c;
    pub const CTRL_ENABLE: u32 = 1;
}

// =============================================================================
// UART0
// =============================================================================

pub mod uart {
    pub const BASE: u32 = 0x4007_0000;
    pub const DR: u32 = BASE;
    pub const FR: u32 = BASE + 0x18;
    pub const IBRD: u32 = BASE + 0x24;
    pub const FBRD: u32 = BASE + 0x28;
    pub const LCR_H: u32 = BASE + 0x2c;
    pub const CR: u32 = BASE + 0x30;

    pub const FR_TXFF: u32 = 1 << 5;
    pub const LCR_H_FEN: u32 = 1 << 4;
    pub const LCR_H_WLEN_8: u32 = 0x3 << 5;
    pub const CR_UARTEN: u32 = 1 << 0;
    pub const CR_TXE: u32 = 1 << 8;
    pub const CR_RXE: u32 = 1 << 9;
}

// =============================================================================
// I2C0 (DW_apb_i2c)
// =============================================================================

pub mod i2c {
    pub const BASE: u32 = 0x4009_0000;
    pub const CON: u32 = BASE;
    pub const TAR: u32 = BASE + 0x04;
    pub const DATA_CMD: u32 = BASE + 0x10;
    pub const FS_SCL_HCNT: u32 = BASE + 0x1c;
    pub const FS_SCL_LCNT: u32 = BASE + 0x20;
    pub const RAW_INTR_STAT: u32 = BASE + 0x34;
    pub const CLR_TX_ABRT: u32 = BASE + 0x54;
    pub const CLR_STOP_DET: u32 = BASE + 0x60;
    pub const ENABLE: u32 = BASE + 0x6c;
    pub const STATUS: u32 = BASE + 0x70;
    pub const RXFLR: u32 = BASE + 0x78;
    pub const SDA_HOLD: u32 = BASE + 0x7c;
    pub const TX_ABRT_SOURCE: u32 = BASE + 0x80;
    pub const FS_SPKLEN: u32 = BASE + 0xa0;

    pub const CON_MASTER_MODE: u32 = 1 << 0;
    pub const CON_SPEED_FAST: u32 = 2 << 1;
    pub const CON_RESTART_EN: u32 = 1 << 5;
    pub const CON_SLAVE_DISABLE: u32 = 1 << 6;
    pub const CON_TX_EMPTY_CTRL: u32 = 1 << 8;

    pub const DATA_CMD_READ: u32 = 1 << 8;
    pub const DATA_CMD_STOP: u32 = 1 << 9;
    pub const DATA_CMD_RESTART: u32 = 1 << 10;

    pub const INTR_TX_ABRT: u32 = 1 << 6;
    pub const INTR_STOP_DET: u32 = 1 << 9;

    pub const STATUS_TFNF: u32 = 1 << 1;
    pub const STATUS_TFE: u32 = 1 << 2;
}

// =============================================================================
// CORTEX-M33 (SCB)
// =============================================================================

pub mod scb {
    pub const VTOR: u32 = 0xe000_ed08;
    pub const CPACR: u32 = 0xe000_ed88;
    /// CP0..CP7 full access (coprocessadores GPIO/DCP/FPU).
    pub const CPACR_ENABLE: u32 = 0x00ff_ffff;
}
