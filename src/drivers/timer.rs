// =============================================================================
// TIMER0 - RELÓGIO MONOTÔNICO
// =============================================================================
//
// Contador de 64 bits em µs, incrementado pelo gerador de ticks a partir do
// clk_ref (XOSC, 12 MHz => 12 ciclos por tick). É a base de tempo de todos os
// eventos periódicos do loop de emulação.
//
// =============================================================================

use crate::drivers::resets;
use crate::hal::regs::{resets as rst, ticks, timer};
use crate::hal::{Monotonic, RegisterBus, Timeout};

/// Liga o gerador de ticks do TIMER0 e tira o bloco do reset.
pub fn init<B: RegisterBus>(bus: &mut B, ref_mhz: u32) -> Result<(), Timeout> {
    bus.write(ticks::TIMER0_CTRL, 0);
    bus.write(ticks::TIMER0_CYCLES, ref_mhz);
    bus.write(ticks::TIMER0_CTRL, ticks::CTRL_ENABLE);
    resets::unreset_block_wait(bus, rst::TIMER0)
}

/// Leitura consistente do contador (a parte alta pode virar entre as leituras).
pub fn read_time<B: RegisterBus>(bus: &mut B) -> u64 {
    let mut hi = bus.read(timer::TIMERAWH);
    loop {
        let lo = bus.read(timer::TIMERAWL);
        let next_hi = bus.read(timer::TIMERAWH);
        if hi == next_hi {
            return ((hi as u64) << 32) | lo as u64;
        }
        hi = next_hi;
    }
}

/// Relógio monotônico sobre o TIMER0 real.
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub struct SystemTimer;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl Monotonic for SystemTimer {
    fn now_us(&self) -> u64 {
        // SAFETY: TIMER0 é somente leitura aqui.
        let mut bus = unsafe { crate::hal::MmioBus::steal() };
        read_time(&mut bus)
    }
}

/// Espera ocupada de `us` microssegundos.
pub fn busy_wait_us<M: Monotonic + ?Sized>(clock: &M, us: u64) {
    let start = clock.now_us();
    while clock.now_us().wrapping_sub(start) < us {
        ::core::hint::spin_loop();
    }
}
