//! # Synchronization primitives for the stack port
//!
//! The host RTOS supplies the mutexes this port runs on. [`RawLock`] and
//! [`RawUnlock`] describe that contract; a host binds its own primitive
//! (a kernel notification object, a semaphore, ...) by implementing
//! both traits. [`Mutex`] layers RAII guards over any such implementation,
//! and [`RawSpin`] is the in-tree raw lock used by hosted builds and tests.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod mutex;
mod raw_spin;
mod sync_once_cell;

pub use mutex::{Mutex, MutexGuard};
pub use raw_spin::RawSpin;
pub use sync_once_cell::SyncOnceCell;

pub type SpinMutex<T> = Mutex<T, RawSpin>;

impl<T> SpinMutex<T> {
    pub fn new(value: T) -> Self {
        Self::from_raw(RawSpin::new(), value)
    }
}

/// Acquire side of a host mutex.
///
/// Acquisition blocks until the lock is held and is assumed infallible:
/// hosts that can fail internally report that only by terminating, never by
/// returning an error to this layer. There is no timeout.
pub trait RawLock {
    fn raw_lock(&self);
    fn raw_try_lock(&self) -> bool;
}

/// Release side of a host mutex.
pub trait RawUnlock {
    /// # Safety
    /// The caller must currently hold the lock.
    unsafe fn raw_unlock(&self);
}
