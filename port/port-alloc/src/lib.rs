//! # Fixed-capacity block allocator for the network stack port
//!
//! The embedded network stack expects its host to provide zero-initializing
//! `alloc`/`free`. This crate implements the memory pool behind that
//! contract as three layers plus a process-wide singleton:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               static_pool::shared()                 │
//! │    • static arena + occupancy storage               │
//! │    • one-time construction (SyncOnceCell)           │
//! │    • failed construction retried per call           │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │                 SyncBlockPool<R>                     │
//! │    • host mutex around every occupancy mutation     │
//! │    • zero-filled allocation (alloc_zeroed)          │
//! └─────────────────┬───────────────────────────────────┘
//! ┌─────────────────▼───────────────────────────────────┐
//! │                   BlockPool                          │
//! │    • fixed arena of capacity / block_size blocks    │
//! │    • byte sizes rounded up to whole blocks          │
//! │    • pointer ↔ block-index mapping                  │
//! └─────────────────┬───────────────────────────────────┘
//! ┌─────────────────▼───────────────────────────────────┐
//! │                   Occupancy                          │
//! │    • `used` + run-`start` bitsets                   │
//! │    • first-fit reservation, O(N) worst case         │
//! │    • invalid/double frees rejected, never applied   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! There is no growth path and no per-allocation metadata: a freed run's
//! length is recovered by walking the `used` bitset from its start block.
//! Exhaustion surfaces as `None` from `alloc` — the stack treats that as
//! backpressure — and invalid frees are rejected and logged rather than
//! corrupting the index.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod block_pool;
pub mod occupancy;
pub mod static_pool;
pub mod sync_pool;

pub use block_pool::{BlockPool, PoolError};
pub use occupancy::{IndexWord, InvalidFree, Occupancy};
pub use static_pool::{BLOCK_SIZE, POOL_SIZE, shared};
pub use sync_pool::SyncBlockPool;
