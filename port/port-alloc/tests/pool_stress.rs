//! Concurrent stress against a dedicated pool instance.

use core::ptr::NonNull;
use port_alloc::occupancy::words_for;
use port_alloc::{BlockPool, IndexWord, SyncBlockPool};
use port_sync::RawSpin;
use std::sync::{Arc, Barrier};
use std::thread;

const BLOCK: usize = 8;
const BLOCKS: usize = 4096;

fn build_pool() -> SyncBlockPool<RawSpin> {
    let arena = Box::leak(vec![0_u8; BLOCKS * BLOCK].into_boxed_slice());
    let base = NonNull::new(arena.as_mut_ptr()).unwrap();
    let words = || -> &'static mut [IndexWord] {
        Box::leak(vec![0; words_for(BLOCKS)].into_boxed_slice())
    };
    let pool = unsafe { BlockPool::new(base, BLOCKS * BLOCK, BLOCK, words(), words()) }.unwrap();
    SyncBlockPool::new(pool, RawSpin::new())
}

/// Each thread stamps its allocations with a private byte and verifies the
/// stamp before freeing. An overlapping run would tear a stamp.
#[test]
fn concurrent_allocations_never_overlap() {
    let threads = 8;
    let iters = 2_000;

    let pool = Arc::new(build_pool());
    let start = Arc::new(Barrier::new(threads));

    let mut handles = Vec::with_capacity(threads);
    for t in 0..threads {
        let pool = Arc::clone(&pool);
        let start = Arc::clone(&start);
        handles.push(thread::spawn(move || {
            let stamp = 0x10 + t as u8;
            start.wait();
            for i in 0..iters {
                let n = 1 + (i * 7 + t * 13) % 96;
                let Some(run) = pool.alloc_zeroed(n) else {
                    // Transient exhaustion under contention is legal; back off.
                    thread::yield_now();
                    continue;
                };
                let buf = unsafe { core::slice::from_raw_parts_mut(run.as_ptr(), n) };
                assert!(buf.iter().all(|&b| b == 0), "allocation was not zeroed");
                buf.fill(stamp);
                thread::yield_now();
                assert!(
                    buf.iter().all(|&b| b == stamp),
                    "allocation overlapped another thread's run"
                );
                pool.free(run).expect("freeing own run must succeed");
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    // Balanced alloc/free traffic must leave the pool empty again.
    assert_eq!(pool.free_blocks(), BLOCKS);
}

#[test]
fn exhaustion_recovers_after_free() {
    let pool = build_pool();

    let mut held = Vec::with_capacity(BLOCKS);
    while let Some(run) = pool.alloc(BLOCK) {
        held.push(run);
    }
    assert_eq!(held.len(), BLOCKS);
    assert_eq!(pool.alloc(1), None, "exhausted pool must refuse any size");

    let released = held.pop().unwrap();
    assert_eq!(pool.free(released), Ok(1));
    assert_eq!(
        pool.alloc(BLOCK),
        Some(released),
        "freed region must satisfy the next fitting request"
    );

    for run in held {
        pool.free(run).unwrap();
    }
    pool.free(released).unwrap();
    assert_eq!(pool.free_blocks(), BLOCKS);
}
