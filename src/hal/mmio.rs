//! Barramento MMIO real (volatile).
//!
//! Cada acesso vira um `VolatilePtr` sobre o endereço físico: o compilador
//! não pode fundir, reordenar ou eliminar leituras de status.

use super::regs::{REG_ALIAS_CLR, REG_ALIAS_SET, REG_ALIAS_XOR};
use super::RegisterBus;
use ::core::ptr::NonNull;
use volatile::VolatilePtr;

/// Acesso direto ao espaço de endereços do RP2350.
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// Cria o barramento.
    ///
    /// # Safety
    /// O caller garante que está rodando no RP2350 e que os endereços usados
    /// pelos drivers são registradores válidos.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    fn ptr(addr: u32) -> VolatilePtr<'static, u32> {
        // SAFETY: `steal` exige que os endereços sejam MMIO válidos e alinhados.
        unsafe { VolatilePtr::new(NonNull::new_unchecked(addr as usize as *mut u32)) }
    }
}

impl RegisterBus for MmioBus {
    #[inline(always)]
    fn read(&mut self, addr: u32) -> u32 {
        Self::ptr(addr).read()
    }

    #[inline(always)]
    fn write(&mut self, addr: u32, value: u32) {
        Self::ptr(addr).write(value)
    }

    #[inline(always)]
    fn set_bits(&mut self, addr: u32, mask: u32) {
        Self::ptr(addr | REG_ALIAS_SET).write(mask)
    }

    #[inline(always)]
    fn clear_bits(&mut self, addr: u32, mask: u32) {
        Self::ptr(addr | REG_ALIAS_CLR).write(mask)
    }

    #[inline(always)]
    fn write_masked(&mut self, addr: u32, value: u32, mask: u32) {
        let current = Self::ptr(addr).read();
        Self::ptr(addr | REG_ALIAS_XOR).write((current ^ value) & mask)
    }
}
