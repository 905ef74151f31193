//! The process-wide memory pool backing the network stack.
//!
//! Storage is static (arena plus occupancy words) and the pool is built
//! lazily on first use through a [`SyncOnceCell`]: exactly one caller runs
//! construction, everyone else waits for the published instance. A failed
//! construction is retried on every subsequent call rather than cached as
//! terminal — a transient host fault may clear, but a permanent one is
//! retried forever and only visible through the error log.

use crate::block_pool::{BlockPool, PoolError};
use crate::occupancy::{IndexWord, words_for};
use crate::sync_pool::SyncBlockPool;
use core::ptr::NonNull;
use port_sync::{RawSpin, SyncOnceCell};

/// Total pool capacity in bytes.
///
/// Profiling of the stack under load showed peak demand just under 1 MiB.
pub const POOL_SIZE: usize = 1024 * 1024;

/// Bytes per block. Small enough to bound internal fragmentation for the
/// stack's many short buffers.
pub const BLOCK_SIZE: usize = 8;

const NUM_BLOCKS: usize = POOL_SIZE / BLOCK_SIZE;
const INDEX_WORDS: usize = words_for(NUM_BLOCKS);

/// Arena storage with a minimum alignment suitable for the stack's types.
#[repr(align(16))]
struct ArenaMem([u8; POOL_SIZE]);

static mut ARENA: ArenaMem = ArenaMem([0; POOL_SIZE]);
static mut USED_WORDS: [IndexWord; INDEX_WORDS] = [0; INDEX_WORDS];
static mut START_WORDS: [IndexWord; INDEX_WORDS] = [0; INDEX_WORDS];

/// The lazily constructed pool singleton.
static POOL: SyncOnceCell<SyncBlockPool<RawSpin>> = SyncOnceCell::new();

/// Get the shared pool, constructing it on first use.
///
/// `None` means construction failed; the failure is logged here and the
/// next call retries from scratch.
pub fn shared() -> Option<&'static SyncBlockPool<RawSpin>> {
    match POOL.get_or_try_init(construct) {
        Ok(pool) => Some(pool),
        Err(err) => {
            log::error!("memory pool construction failed: {err}");
            None
        }
    }
}

fn construct() -> Result<SyncBlockPool<RawSpin>, PoolError> {
    let lock = RawSpin::new();
    // SAFETY: `get_or_try_init` runs at most one constructor at a time and
    // these statics are referenced nowhere else; on a failed attempt the
    // borrows below are dropped before the next attempt can start.
    let base = unsafe { NonNull::new_unchecked((&raw mut ARENA.0).cast::<u8>()) };
    let used = unsafe { &mut *(&raw mut USED_WORDS) };
    let start = unsafe { &mut *(&raw mut START_WORDS) };
    // SAFETY: the arena static is exclusive to the pool and lives forever.
    let pool = unsafe { BlockPool::new(base, POOL_SIZE, BLOCK_SIZE, used, start) }?;
    Ok(SyncBlockPool::new(pool, lock))
}
