use core::{
    cell::UnsafeCell,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

/// 0 = UNCONSTRUCTED, 1 = CONSTRUCTING, 2 = READY
const UNCONSTRUCTED: u8 = 0;
const CONSTRUCTING: u8 = 1;
const READY: u8 = 2;

/// One-time initialization cell with an acquire/release-ordered publish.
///
/// Exactly one caller runs the constructor; everyone else observes either
/// the published value or, through [`get_or_try_init`](Self::get_or_try_init),
/// a construction error. A failed construction is **not** cached: the cell
/// reverts to the unconstructed state and the next caller attempts
/// construction again.
pub struct SyncOnceCell<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Default for SyncOnceCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncOnceCell<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(UNCONSTRUCTED),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Returns `Some(&T)` if already constructed.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == READY {
            // SAFETY: READY is only published after the write completed
            Some(unsafe { (*self.value.get()).assume_init_ref() })
        } else {
            None
        }
    }

    /// Initialize at most once and return `&T`.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> &T {
        match self.get_or_try_init(|| Ok::<T, core::convert::Infallible>(init())) {
            Ok(v) => v,
            Err(e) => match e {},
        }
    }

    /// Initialize at most once with a fallible constructor.
    ///
    /// At most one constructor runs at a time. Callers that lose the race
    /// wait for the outcome; if the winner fails, the cell rolls back to
    /// unconstructed and one of the waiters takes over with its own
    /// constructor. Each caller's `init` runs at most once.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&T, E> {
        // Fast path: already published.
        if let Some(v) = self.get() {
            return Ok(v);
        }

        loop {
            match self.state.compare_exchange(
                UNCONSTRUCTED,
                CONSTRUCTING,
                Ordering::Acquire,
                Ordering::Acquire,
            ) {
                // We are the constructor.
                Ok(_) => break,
                Err(READY) => {
                    // SAFETY: READY guarantees the write is done
                    return Ok(unsafe { (*self.value.get()).assume_init_ref() });
                }
                // Someone else is constructing; wait for them to publish
                // or roll back.
                Err(_) => spin_loop(),
            }
        }

        match init() {
            Ok(v) => {
                unsafe {
                    (*self.value.get()).write(v);
                }
                // Publish value before marking READY
                self.state.store(READY, Ordering::Release);
                // SAFETY: just wrote it
                Ok(unsafe { (*self.value.get()).assume_init_ref() })
            }
            Err(e) => {
                // Roll back so the next caller retries construction.
                self.state.store(UNCONSTRUCTED, Ordering::Release);
                Err(e)
            }
        }
    }
}

// Safety: shared after READY; initialization is single-writer.
unsafe impl<T: Sync> Sync for SyncOnceCell<T> {}
unsafe impl<T: Send> Send for SyncOnceCell<T> {}

#[cfg(test)]
mod tests {
    use super::SyncOnceCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn get_before_init_is_none() {
        let cell: SyncOnceCell<u32> = SyncOnceCell::new();
        assert!(cell.get().is_none());
    }

    #[test]
    fn init_runs_once() {
        let cell = SyncOnceCell::new();
        let runs = AtomicUsize::new(0);

        let first = *cell.get_or_init(|| {
            runs.fetch_add(1, Ordering::SeqCst);
            7_u32
        });
        let second = *cell.get_or_init(|| {
            runs.fetch_add(1, Ordering::SeqCst);
            8_u32
        });

        assert_eq!(first, 7);
        assert_eq!(second, 7);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cell.get(), Some(&7));
    }

    #[test]
    fn failed_construction_is_retried() {
        let cell: SyncOnceCell<u32> = SyncOnceCell::new();

        let err = cell.get_or_try_init(|| Err::<u32, &str>("host not ready"));
        assert_eq!(err, Err("host not ready"));
        // Failure must not be cached as terminal.
        assert!(cell.get().is_none());

        let ok = cell.get_or_try_init(|| Ok::<u32, &str>(99));
        assert_eq!(ok.copied(), Ok(99));
        assert_eq!(cell.get(), Some(&99));
    }

    #[test]
    fn concurrent_first_use_constructs_exactly_once() {
        let threads = 8;
        let cell = Arc::new(SyncOnceCell::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(threads));

        let mut handles = Vec::with_capacity(threads);
        for _ in 0..threads {
            let cell = Arc::clone(&cell);
            let runs = Arc::clone(&runs);
            let start = Arc::clone(&start);
            handles.push(thread::spawn(move || {
                start.wait();
                let v = cell.get_or_init(|| {
                    runs.fetch_add(1, Ordering::SeqCst);
                    42_u64
                });
                core::ptr::from_ref(v) as usize
            }));
        }

        let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(runs.load(Ordering::SeqCst), 1, "construction ran twice");
        // All callers observe the same instance.
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    }
}
