//! Core 1: stack própria e lançamento.

use crate::hal::RegisterBus;
use super::start::vector_table_addr;

const CORE1_STACK_WORDS: usize = 2048;

#[repr(C, align(8))]
struct Stack([u32; CORE1_STACK_WORDS]);

static mut CORE1_STACK: Stack = Stack([0; CORE1_STACK_WORDS]);

/// Lança `entry` no core 1 com 8 KiB de stack.
pub fn launch_core1<B: RegisterBus>(
    bus: &mut B,
    entry: extern "C" fn() -> !,
) -> Result<(), crate::arch::multicore::LaunchError> {
    // SAFETY: o core 1 é o único usuário do array; só o endereço do topo é lido.
    let sp = unsafe {
        let base = ::core::ptr::addr_of_mut!(CORE1_STACK) as *mut u32;
        base.add(CORE1_STACK_WORDS) as u32
    };
    super::dsb();
    crate::arch::multicore::launch(bus, vector_table_addr(), sp, entry as usize as u32, super::sev)
}
