//! First-use behavior of the process-wide pool.

use port_alloc::{BLOCK_SIZE, POOL_SIZE, shared};
use std::sync::{Arc, Barrier};
use std::thread;

/// Racing first users must all observe the same constructed instance.
///
/// Single test function: every assertion here shares the one process-wide
/// pool, so interleaving with other tests would make counts unreliable.
#[test]
fn concurrent_first_use_yields_one_instance() {
    let threads = 8;
    let start = Arc::new(Barrier::new(threads));

    let mut handles = Vec::with_capacity(threads);
    for _ in 0..threads {
        let start = Arc::clone(&start);
        handles.push(thread::spawn(move || {
            start.wait();
            let pool = shared().expect("static pool construction cannot fail");
            core::ptr::from_ref(pool) as usize
        }));
    }

    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(
        addrs.windows(2).all(|w| w[0] == w[1]),
        "callers observed different pool instances"
    );

    // The constructed pool has the configured geometry and is usable.
    let pool = shared().unwrap();
    assert_eq!(pool.block_size(), BLOCK_SIZE);
    assert_eq!(pool.num_blocks(), POOL_SIZE / BLOCK_SIZE);

    let before = pool.free_blocks();
    let run = pool.alloc_zeroed(100).unwrap();
    assert_eq!(pool.free_blocks(), before - 100_usize.div_ceil(BLOCK_SIZE));
    pool.free(run).unwrap();
    assert_eq!(pool.free_blocks(), before, "round trip must restore the index");
}
