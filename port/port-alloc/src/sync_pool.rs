//! Serialization of the block pool behind a host mutex.

use crate::block_pool::BlockPool;
use crate::occupancy::InvalidFree;
use core::ptr::{self, NonNull};
use port_sync::{Mutex, RawLock, RawUnlock};

/// [`BlockPool`] behind a [`Mutex`], safe to share between threads.
///
/// Every occupancy mutation happens under the lock, so concurrent
/// `alloc`/`free` calls never interleave their bitmap writes. Zero-filling
/// happens after the lock is released; the reserved run is exclusively the
/// caller's by then.
pub struct SyncBlockPool<R> {
    inner: Mutex<BlockPool, R>,
}

impl<R> SyncBlockPool<R>
where
    R: RawLock + RawUnlock,
{
    pub const fn new(pool: BlockPool, raw: R) -> Self {
        Self {
            inner: Mutex::from_raw(raw, pool),
        }
    }

    /// Allocate at least `n` bytes; `None` when the pool cannot fit the
    /// request. The memory is not zeroed.
    pub fn alloc(&self, n: usize) -> Option<NonNull<u8>> {
        self.alloc_span(n).map(|(run, _)| run)
    }

    /// Allocate at least `n` bytes and zero the entire reserved run.
    pub fn alloc_zeroed(&self, n: usize) -> Option<NonNull<u8>> {
        let (run, span) = self.alloc_span(n)?;
        // SAFETY: the run was just reserved for this caller and spans
        // `span` bytes inside the arena.
        unsafe { ptr::write_bytes(run.as_ptr(), 0, span) };
        Some(run)
    }

    /// Release a run previously returned by [`alloc`](Self::alloc) or
    /// [`alloc_zeroed`](Self::alloc_zeroed).
    pub fn free(&self, run: NonNull<u8>) -> Result<usize, InvalidFree> {
        self.inner.lock().free(run)
    }

    /// Blocks currently available.
    pub fn free_blocks(&self) -> usize {
        self.inner.lock().free_blocks()
    }

    /// Total number of blocks in the pool.
    pub fn num_blocks(&self) -> usize {
        self.inner.lock().num_blocks()
    }

    /// Size of one block in bytes.
    pub fn block_size(&self) -> usize {
        self.inner.lock().block_size()
    }

    fn alloc_span(&self, n: usize) -> Option<(NonNull<u8>, usize)> {
        let mut pool = self.inner.lock();
        let span = pool.blocks_for(n) * pool.block_size();
        let run = pool.alloc(n)?;
        Some((run, span))
    }
}
