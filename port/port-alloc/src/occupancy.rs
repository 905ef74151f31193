//! Occupancy tracking for the block arena.
//!
//! Two parallel bitsets over the block indices `[0, N)`:
//!
//! - `used` marks every block belonging to some live allocation.
//! - `start` marks only the first block of each allocated run.
//!
//! The `start` set replaces a per-allocation size header: releasing a run
//! walks `used` forward from the start block until it hits a free block or
//! another run's start. A release target that is not marked in `start` is
//! rejected, which catches interior pointers and double frees before they
//! can corrupt the index.

use crate::block_pool::PoolError;

/// Storage word of the occupancy bitsets.
pub type IndexWord = usize;

const WORD_BITS: usize = IndexWord::BITS as usize;

/// Number of [`IndexWord`]s needed to track `blocks` blocks.
#[must_use]
pub const fn words_for(blocks: usize) -> usize {
    (blocks + WORD_BITS - 1) / WORD_BITS
}

/// Reasons a release request is rejected without touching the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFree {
    #[error("address lies outside the arena")]
    OutOfBounds,
    #[error("address is not on a block boundary")]
    Misaligned,
    #[error("block {0} is not the start of an allocated run")]
    NotRunStart(usize),
}

/// Free/used bookkeeping over caller-supplied word storage.
///
/// The index owns the liveness state of every block in the arena; it never
/// touches the arena bytes themselves.
#[derive(Debug)]
pub struct Occupancy {
    used: &'static mut [IndexWord],
    start: &'static mut [IndexWord],
    num_blocks: usize,
}

impl Occupancy {
    /// Build an all-free index over `num_blocks` blocks.
    ///
    /// Both word slices are zeroed; each must hold at least
    /// [`words_for`]`(num_blocks)` words.
    pub fn new(
        used: &'static mut [IndexWord],
        start: &'static mut [IndexWord],
        num_blocks: usize,
    ) -> Result<Self, PoolError> {
        let need = words_for(num_blocks);
        let have = used.len().min(start.len());
        if have < need {
            return Err(PoolError::IndexStorageTooSmall { have, need });
        }
        used.fill(0);
        start.fill(0);
        Ok(Self {
            used,
            start,
            num_blocks,
        })
    }

    #[must_use]
    pub const fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Number of blocks currently marked used.
    #[must_use]
    pub fn used_blocks(&self) -> usize {
        self.used.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[must_use]
    pub fn is_used(&self, index: usize) -> bool {
        test(self.used, index)
    }

    #[must_use]
    pub fn is_run_start(&self, index: usize) -> bool {
        test(self.start, index)
    }

    /// First-fit reservation of `blocks` consecutive free blocks.
    ///
    /// Marks every block of the run used and only the first as a run start.
    /// Returns the start index, or `None` when no run of that length exists
    /// (exhausted or too fragmented).
    pub fn reserve(&mut self, blocks: usize) -> Option<usize> {
        debug_assert!(blocks > 0);
        if blocks == 0 || blocks > self.num_blocks {
            return None;
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for index in 0..self.num_blocks {
            if test(self.used, index) {
                run_start = index + 1;
                run_len = 0;
                continue;
            }
            run_len += 1;
            if run_len == blocks {
                for block in run_start..=index {
                    set(self.used, block);
                }
                set(self.start, run_start);
                return Some(run_start);
            }
        }
        None
    }

    /// Release the run starting at `index`, returning its length in blocks.
    ///
    /// Fails without mutating anything if `index` is out of range or not a
    /// run start. The walk clears `used` forward until it reaches a free
    /// block or a different run's start.
    pub fn release(&mut self, index: usize) -> Result<usize, InvalidFree> {
        if index >= self.num_blocks {
            return Err(InvalidFree::OutOfBounds);
        }
        if !test(self.start, index) {
            return Err(InvalidFree::NotRunStart(index));
        }

        clear(self.start, index);
        clear(self.used, index);
        let mut released = 1;
        let mut block = index + 1;
        while block < self.num_blocks && test(self.used, block) && !test(self.start, block) {
            clear(self.used, block);
            released += 1;
            block += 1;
        }
        Ok(released)
    }
}

#[inline]
fn test(words: &[IndexWord], index: usize) -> bool {
    words[index / WORD_BITS] >> (index % WORD_BITS) & 1 == 1
}

#[inline]
fn set(words: &mut [IndexWord], index: usize) {
    words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
}

#[inline]
fn clear(words: &mut [IndexWord], index: usize) {
    words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
}
