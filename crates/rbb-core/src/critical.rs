//! Critical sections
//!
//! A critical section masks interrupts through the platform's [`IrqControl`]
//! and then takes a spin lock, so the protected data is exclusive against
//! both interrupt handlers on this CPU and code on other CPUs. Leaving the
//! scope (normally or by unwinding) releases the lock first and then
//! restores the saved interrupt mask.

use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use crate::spinlock::{SpinLock, SpinLockGuard};
use crate::traits::IrqControl;

/// Data that may only be touched inside a critical section
pub struct CriticalCell<T, I: IrqControl> {
    lock: SpinLock<T>,
    _irq: PhantomData<fn() -> I>,
}

impl<T, I: IrqControl> CriticalCell<T, I> {
    pub const fn new(value: T) -> Self {
        Self {
            lock: SpinLock::new(value),
            _irq: PhantomData,
        }
    }

    /// Mask interrupts and lock
    #[inline]
    pub fn enter(&self) -> CriticalSection<'_, T, I> {
        let token = I::disable();
        let guard = self.lock.lock();
        CriticalSection {
            guard: ManuallyDrop::new(guard),
            token: ManuallyDrop::new(token),
        }
    }
}

/// Scoped guard returned by [`CriticalCell::enter`]
pub struct CriticalSection<'a, T, I: IrqControl> {
    guard: ManuallyDrop<SpinLockGuard<'a, T>>,
    token: ManuallyDrop<I::Token>,
}

impl<'a, T, I: IrqControl> Deref for CriticalSection<'a, T, I> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T, I: IrqControl> DerefMut for CriticalSection<'a, T, I> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<'a, T, I: IrqControl> Drop for CriticalSection<'a, T, I> {
    #[inline]
    fn drop(&mut self) {
        // Safety: both fields are dropped exactly once, here
        unsafe {
            ManuallyDrop::drop(&mut self.guard);
            I::restore(ManuallyDrop::take(&mut self.token));
        }
    }
}
