//! Vector table, bloco IMAGE_DEF e reset handler.
//!
//! O boot ROM do RP2350 procura o IMAGE_DEF nos primeiros 4 KiB da flash,
//! lê a vector table logo no início e pula para `_reset_handler`, que:
//!
//! 1. Copia `.data` (inclui `.data.ramfunc`) da flash para a RAM.
//! 2. Zera `.bss`.
//! 3. Libera os coprocessadores (FPU) no CPACR.
//! 4. Chama `boot_main` (definido pelo binário).

use ::core::arch::global_asm;

global_asm!(
    r#"
.section .vector_table, "ax"
.global __vector_table
.align 7

__vector_table:
    .word   _stack_top
    .word   _reset_handler
    .word   _nmi_handler
    .word   _hardfault_handler
    .word   _memmanage_handler
    .word   _busfault_handler
    .word   _usagefault_handler
    .word   _securefault_handler
    .word   0
    .word   0
    .word   0
    .word   _svc_handler
    .word   0
    .word   0
    .word   _pendsv_handler
    .word   _systick_handler

    // IRQ 0-51
    .rept 52
    .word   _default_handler
    .endr

// IMAGE_DEF: ARM secure, executável, fim do bloco
.section .start_block, "a"
.align 2
__image_def:
    .word   0xffffded3
    .word   0x10210142
    .word   0x000001ff
    .word   0x00000000
    .word   0xab123579

.section .text._reset_handler
.global _reset_handler
.type _reset_handler, %function
.thumb_func

_reset_handler:
    ldr     r0, =_stack_top
    mov     sp, r0

    ldr     r0, =__data_start
    ldr     r1, =__data_end
    ldr     r2, =__data_load
    b       .Ldata_check
.Ldata_copy:
    ldm     r2!, {{r3}}
    stm     r0!, {{r3}}
.Ldata_check:
    cmp     r0, r1
    blt     .Ldata_copy

    ldr     r0, =__bss_start
    ldr     r1, =__bss_end
    movs    r2, #0
    b       .Lbss_check
.Lbss_clear:
    stm     r0!, {{r2}}
.Lbss_check:
    cmp     r0, r1
    blt     .Lbss_clear

    // CPACR: CP0-CP7 + FPU (CP10/CP11)
    ldr     r0, =0xe000ed88
    ldr     r1, =0x00ffffff
    str     r1, [r0]
    dsb
    isb

    bl      boot_main

.Lhalt:
    wfi
    b       .Lhalt

.section .text.handlers
.weak _nmi_handler
.weak _hardfault_handler
.weak _memmanage_handler
.weak _busfault_handler
.weak _usagefault_handler
.weak _securefault_handler
.weak _svc_handler
.weak _pendsv_handler
.weak _systick_handler
.weak _default_handler

.thumb_func
_nmi_handler:
.thumb_func
_hardfault_handler:
.thumb_func
_memmanage_handler:
.thumb_func
_busfault_handler:
.thumb_func
_usagefault_handler:
.thumb_func
_securefault_handler:
.thumb_func
_svc_handler:
.thumb_func
_pendsv_handler:
.thumb_func
_systick_handler:
.thumb_func
_default_handler:
    b       .
"#
);

extern "C" {
    static __vector_table: u32;
}

/// Endereço da vector table (VTOR do core 1).
pub fn vector_table_addr() -> u32 {
    // SAFETY: só o endereço do símbolo é usado.
    unsafe { ::core::ptr::addr_of!(__vector_table) as u32 }
}
