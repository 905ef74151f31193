//! The bounded block allocator: a fixed arena carved into equal blocks.

use crate::occupancy::{IndexWord, InvalidFree, Occupancy};
use core::ptr::NonNull;

/// Reasons pool construction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("block size must be non-zero")]
    ZeroBlockSize,
    #[error("arena capacity {capacity} is not a whole number of {block_size}-byte blocks")]
    UnalignedCapacity { capacity: usize, block_size: usize },
    #[error("occupancy storage holds {have} words, {need} needed")]
    IndexStorageTooSmall { have: usize, need: usize },
}

/// Allocator over a fixed byte arena of `capacity / block_size` blocks.
///
/// Requested byte sizes round up to whole blocks; a zero-byte request still
/// takes one block so every returned pointer names a real, distinct run.
/// The arena is never resized or relocated.
///
/// The pool itself is not synchronized; wrap it in
/// [`SyncBlockPool`](crate::sync_pool::SyncBlockPool) before sharing it.
#[derive(Debug)]
pub struct BlockPool {
    /// First byte of the arena.
    base: NonNull<u8>,
    capacity: usize,
    block_size: usize,
    index: Occupancy,
}

// Safety: the pool is only used under a lock; the raw base pointer is not
// dereferenced by the pool itself.
unsafe impl Send for BlockPool {}

impl BlockPool {
    /// Build a pool over the arena `[base, base + capacity)`.
    ///
    /// `capacity` must be a whole number of `block_size`-byte blocks, and
    /// the two word slices must each hold
    /// [`words_for`](crate::occupancy::words_for)`(capacity / block_size)`
    /// words; they are zeroed here.
    ///
    /// # Safety
    /// - The arena must be valid for reads and writes for the lifetime of
    ///   the pool and referenced through no other path while the pool lives.
    /// - Pointers handed out by [`alloc`](Self::alloc) borrow from that
    ///   arena; the memory must stay valid while any of them is live.
    pub unsafe fn new(
        base: NonNull<u8>,
        capacity: usize,
        block_size: usize,
        used: &'static mut [IndexWord],
        start: &'static mut [IndexWord],
    ) -> Result<Self, PoolError> {
        if block_size == 0 {
            return Err(PoolError::ZeroBlockSize);
        }
        if capacity % block_size != 0 {
            return Err(PoolError::UnalignedCapacity {
                capacity,
                block_size,
            });
        }
        let index = Occupancy::new(used, start, capacity / block_size)?;
        Ok(Self {
            base,
            capacity,
            block_size,
            index,
        })
    }

    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn num_blocks(&self) -> usize {
        self.capacity / self.block_size
    }

    /// Blocks currently available (not necessarily contiguous).
    #[must_use]
    pub fn free_blocks(&self) -> usize {
        self.num_blocks() - self.index.used_blocks()
    }

    /// Whole blocks needed for an `n`-byte request.
    ///
    /// Rounds up; `n == 0` still maps to one block.
    #[must_use]
    pub const fn blocks_for(&self, n: usize) -> usize {
        if n == 0 { 1 } else { n.div_ceil(self.block_size) }
    }

    /// Reserve blocks for `n` bytes and return the run's first byte.
    ///
    /// `None` when no sufficient run of free blocks exists. The returned
    /// memory is **not** zeroed here.
    pub fn alloc(&mut self, n: usize) -> Option<NonNull<u8>> {
        let run = self.index.reserve(self.blocks_for(n))?;
        // SAFETY: `run` is a valid block index, so the offset stays inside
        // the arena.
        Some(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(run * self.block_size)) })
    }

    /// Release the run starting at `ptr`, returning its length in blocks.
    ///
    /// Rejects pointers outside the arena, pointers not on a block
    /// boundary, and pointers whose block is not a run start (interior
    /// pointers, double frees). Rejection leaves the occupancy index
    /// untouched.
    pub fn free(&mut self, ptr: NonNull<u8>) -> Result<usize, InvalidFree> {
        let offset = (ptr.as_ptr() as usize)
            .checked_sub(self.base.as_ptr() as usize)
            .ok_or(InvalidFree::OutOfBounds)?;
        if offset >= self.capacity {
            return Err(InvalidFree::OutOfBounds);
        }
        if offset % self.block_size != 0 {
            return Err(InvalidFree::Misaligned);
        }
        self.index.release(offset / self.block_size)
    }
}
