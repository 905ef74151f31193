//! The callback surface handed to the network stack.

use crate::host::Host;
use core::ptr::NonNull;
use port_alloc::static_pool;
use port_sync::RawSpin;

/// The stack's view of its host: time, yield, zeroed allocation, and one
/// big lock serializing stack entry points.
///
/// Allocation goes through the process-wide pool in
/// [`port_alloc::static_pool`], constructed lazily on the first `zalloc`.
/// When construction fails the allocation calls degrade to `None`/no-ops
/// and construction is retried on the next call.
pub struct StackPort<H> {
    host: H,
    /// Serializes the stack's own critical sections (`stack_guard`).
    stack_lock: RawSpin,
}

impl<H> StackPort<H>
where
    H: Host,
{
    pub const fn new(host: H) -> Self {
        Self {
            host,
            stack_lock: RawSpin::new(),
        }
    }

    /// The platform binding behind this port.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Monotonic milliseconds from the host timer.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.host.ticks_ms()
    }

    /// Monotonic seconds, truncated (2999 ms reads as 2 s).
    ///
    /// The stack's timing assumptions are calibrated against the
    /// round-down behavior; do not change this to rounding.
    #[inline]
    pub fn now_s(&self) -> u64 {
        self.now_ms() / 1000
    }

    /// Cooperative yield to the host scheduler.
    #[inline]
    pub fn yield_now(&self) {
        self.host.yield_now();
    }

    /// Allocate `n` bytes from the shared pool, zero-filled.
    ///
    /// `None` means no memory is available — either the pool could not be
    /// constructed or it cannot fit the request. The stack treats that as
    /// backpressure; there is no separate out-of-memory channel. `n == 0`
    /// still returns a valid, distinct, freeable pointer.
    pub fn zalloc(&self, n: usize) -> Option<NonNull<u8>> {
        let Some(pool) = static_pool::shared() else {
            log::error!("zalloc({n}): allocator unavailable");
            return None;
        };
        let run = pool.alloc_zeroed(n);
        if run.is_none() {
            log::error!("zalloc({n}): pool exhausted");
        }
        run
    }

    /// Return an allocation to the shared pool.
    ///
    /// A no-op when the pool is unavailable (there is nothing meaningful to
    /// free into). Invalid pointers — interior, misaligned, out of range,
    /// already freed — are rejected and logged, never applied.
    pub fn zfree(&self, run: NonNull<u8>) {
        let Some(pool) = static_pool::shared() else {
            log::error!("zfree: allocator unavailable");
            return;
        };
        if let Err(err) = pool.free(run) {
            log::warn!("zfree({:p}): rejected: {err}", run.as_ptr());
        }
    }

    /// Enter the stack's critical section; released when the guard drops.
    ///
    /// The stack is not reentrant, so its entry points (feed a frame, drive
    /// a timer tick, submit a send) must not interleave.
    pub fn stack_guard(&self) -> StackGuard<'_> {
        self.stack_lock.lock();
        StackGuard {
            lock: &self.stack_lock,
        }
    }
}

/// RAII guard for the stack's critical section.
pub struct StackGuard<'a> {
    lock: &'a RawSpin,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: the guard exists, so the lock is held by this caller.
        unsafe { self.lock.unlock() }
    }
}
