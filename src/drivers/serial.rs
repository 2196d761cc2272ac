// =============================================================================
// SERIAL DRIVER (UART0, PL011)
// =============================================================================
//
// Saída de log do firmware.
//
// ARQUITETURA:
// - SEM Mutex: escrita direta no DR, esperando TXFF limpar.
// - SEM core::fmt: apenas strings literais e números.
// - Antes de `init` (clocks ainda em transição) toda saída é descartada:
//   o divisor de baud depende de clk_peri, que só é válido depois do
//   sequenciamento.
// - No host (testes) a saída é sempre descartada.
//
// FUNÇÕES DISPONÍVEIS:
// - emit(byte)       : Envia um byte
// - emit_str(s)      : Envia string literal
// - emit_hex(v)      : Envia u64 em hexadecimal
// - emit_dec(v)      : Envia usize em decimal
// - emit_nl()        : Envia newline (\r\n)
//
// NOTA: os dois cores podem logar ao mesmo tempo; linhas podem se intercalar.
//
// =============================================================================

use crate::drivers::{gpio, resets};
use crate::hal::regs::{io_bank0, resets as rst, uart};
use crate::hal::RegisterBus;
use ::core::sync::atomic::{AtomicBool, Ordering};

/// UART pronta para transmitir.
static READY: AtomicBool = AtomicBool::new(false);

pub const BAUD_RATE: u32 = 115_200;

// =============================================================================
// FUNÇÕES DE INICIALIZAÇÃO
// =============================================================================

/// Divisores inteiro/fracionário (IBRD, FBRD) do PL011.
///
/// `div = 64 * clk / (16 * baud)` em ponto fixo 6 bits, arredondado.
pub const fn baud_divisors(clk_hz: u32, baud: u32) -> (u32, u32) {
    let div = (8 * clk_hz as u64) / baud as u64;
    let ibrd = (div >> 7) as u32;
    if ibrd == 0 {
        (1, 0)
    } else if ibrd >= 65535 {
        (65535, 0)
    } else {
        (ibrd, (((div & 0x7f) + 1) / 2) as u32)
    }
}

/// Inicializa a UART0 a `BAUD_RATE`, 8N1, FIFO habilitado.
///
/// Deve ser chamada com clk_peri já estável.
pub fn init<B: RegisterBus>(bus: &mut B, peri_hz: u32, tx_pin: u32, rx_pin: u32) {
    READY.store(false, Ordering::Release);

    resets::reset_block(bus, rst::UART0);
    if resets::unreset_block_wait(bus, rst::UART0).is_err() {
        return;
    }

    let (ibrd, fbrd) = baud_divisors(peri_hz, BAUD_RATE);
    bus.write(uart::IBRD, ibrd);
    bus.write(uart::FBRD, fbrd);
    // LCR_H precisa ser escrito depois dos divisores para travá-los
    bus.write(uart::LCR_H, uart::LCR_H_WLEN_8 | uart::LCR_H_FEN);
    bus.write(uart::CR, uart::CR_UARTEN | uart::CR_TXE | uart::CR_RXE);

    gpio::set_function(bus, tx_pin, io_bank0::FUNC_UART);
    gpio::set_function(bus, rx_pin, io_bank0::FUNC_UART);

    READY.store(true, Ordering::Release);
}

/// Desliga a saída (antes de reprogramar clk_peri).
pub fn suspend() {
    READY.store(false, Ordering::Release);
}

pub fn is_ready() -> bool {
    READY.load(Ordering::Acquire)
}

// =============================================================================
// FUNÇÕES DE ESCRITA - CORE
// =============================================================================

#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(always)]
fn raw_put(byte: u8) {
    // SAFETY: UART0 existe no RP2350 e foi configurada em `init`.
    let mut bus = unsafe { crate::hal::MmioBus::steal() };
    while bus.read(uart::FR) & uart::FR_TXFF != 0 {
        ::core::hint::spin_loop();
    }
    bus.write(uart::DR, byte as u32);
}

#[cfg(not(all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
fn raw_put(_byte: u8) {}

/// Envia um único byte.
#[inline(always)]
pub fn emit(byte: u8) {
    if is_ready() {
        raw_put(byte);
    }
}

/// Envia uma string.
#[inline(never)]
pub fn emit_str(s: &str) {
    if !is_ready() {
        return;
    }
    for b in s.bytes() {
        raw_put(b);
    }
}

/// Envia CRLF.
#[inline(never)]
pub fn emit_nl() {
    emit(b'\r');
    emit(b'\n');
}

// =============================================================================
// FUNÇÕES DE ESCRITA - FORMATAÇÃO NUMÉRICA
// =============================================================================

/// Envia um u64 em hexadecimal, sem zeros à esquerda (`0x1F`).
#[inline(never)]
pub fn emit_hex(value: u64) {
    if !is_ready() {
        return;
    }
    let mut buf = [0u8; 18];
    for b in format_hex(value, &mut buf) {
        raw_put(*b);
    }
}

/// Envia um usize em decimal.
#[inline(never)]
pub fn emit_dec(value: usize) {
    if !is_ready() {
        return;
    }
    let mut buf = [0u8; 20];
    for b in format_dec(value, &mut buf) {
        raw_put(*b);
    }
}

// =============================================================================
// FUNÇÕES AUXILIARES
// =============================================================================

/// Converte nibble (0-15) para caractere ASCII ('0'-'9', 'A'-'F').
#[inline(always)]
const fn nibble_to_ascii(n: u8) -> u8 {
    if n < 10 {
        b'0' + n
    } else {
        b'A' + (n - 10)
    }
}

fn format_hex(value: u64, buf: &mut [u8; 18]) -> &[u8] {
    let digits = if value == 0 {
        1
    } else {
        (64 - value.leading_zeros() as usize).div_ceil(4)
    };
    buf[0] = b'0';
    buf[1] = b'x';
    for i in 0..digits {
        let shift = 4 * (digits - 1 - i);
        buf[2 + i] = nibble_to_ascii(((value >> shift) & 0xf) as u8);
    }
    &buf[..2 + digits]
}

fn format_dec(mut value: usize, buf: &mut [u8; 20]) -> &[u8] {
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[pos..]
}
