//! Spinlock - bloqueio com busy-wait

use crate::arch::{Cpu, CpuOps};
use ::core::cell::UnsafeCell;
use ::core::ops::{Deref, DerefMut};
use ::core::sync::atomic::{AtomicBool, Ordering};

/// Spinlock - usa busy-wait, NÃO pode dormir
///
/// # Quando usar
///
/// - Seções críticas MUITO curtas (mover um buffer de áudio entre filas)
/// - Dados compartilhados entre core 0 e core 1
///
/// # Quando NÃO usar
///
/// - Em volta de I/O lento (I2C, cartão SD)
pub struct Spinlock<T> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: Spinlock protege acesso com lock atômico
unsafe impl<T: Send> Send for Spinlock<T> {}
unsafe impl<T: Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    /// Cria novo spinlock
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    /// Adquire o lock
    pub fn lock(&self) -> SpinlockGuard<'_, T> {
        let saved = Cpu::save_and_disable_interrupts();

        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            ::core::hint::spin_loop();
        }

        SpinlockGuard { lock: self, saved }
    }

    /// Tenta adquirir sem bloquear
    pub fn try_lock(&self) -> Option<SpinlockGuard<'_, T>> {
        let saved = Cpu::save_and_disable_interrupts();

        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinlockGuard { lock: self, saved })
        } else {
            Cpu::restore_interrupts(saved);
            None
        }
    }

    /// Acesso exclusivo sem lock (já temos `&mut`).
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

/// Guard do spinlock - libera ao sair do escopo
pub struct SpinlockGuard<'a, T> {
    lock: &'a Spinlock<T>,
    saved: u32,
}

impl<T> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: Lock está adquirido
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinlockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: Lock está adquirido
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinlockGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
        Cpu::restore_interrupts(self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_masks_interrupts() {
        let lock = Spinlock::new(5u32);
        {
            let mut guard = lock.lock();
            *guard += 1;
            assert!(!Cpu::are_interrupts_enabled());
        }
        assert!(Cpu::are_interrupts_enabled());
        assert_eq!(*lock.lock(), 6);
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let lock = Spinlock::new(());
        let _held = lock.lock();
        assert!(lock.try_lock().is_none());
        // Estado de máscara do guard externo preservado
        assert!(!Cpu::are_interrupts_enabled());
    }
}
