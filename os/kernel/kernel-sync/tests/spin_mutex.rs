use kernel_sync::{RawMutex, SpinMutex};
use std::mem::MaybeUninit;
use std::{panic, thread};

/// A mutex embedded in a zero-filled allocation, as `kzalloc` hands it out.
fn zero_filled() -> RawMutex {
    // SAFETY: the all-zero bit pattern is a valid `AtomicUsize`.
    unsafe { MaybeUninit::<RawMutex>::zeroed().assume_init() }
}

#[test]
fn zeroed_memory_is_an_uninitialized_mutex() {
    let m = zero_filled();
    assert!(!m.is_initialized());
    assert!(!m.is_locked());
    assert!(!m.try_lock(), "an uninitialized mutex cannot be taken");

    m.init();
    assert!(m.is_initialized());
    assert!(m.try_lock());
}

#[test]
fn held_mutex_refuses_try_lock_until_unlocked() {
    let m = RawMutex::new();
    assert!(m.try_lock());

    assert!(!m.try_lock());
    assert!(m.is_locked(), "a failed try_lock leaves the holder's lock in place");

    unsafe { m.unlock() };
    assert!(!m.is_locked());
    assert!(m.try_lock());
}

#[test]
fn init_resets_a_held_mutex() {
    let m = RawMutex::new();
    m.lock();
    m.init();
    assert!(!m.is_locked());
    assert!(m.try_lock());
}

#[test]
fn raw_mutex_is_one_word() {
    assert_eq!(size_of::<RawMutex>(), size_of::<usize>());
    assert_eq!(align_of::<RawMutex>(), align_of::<usize>());
}

#[test]
fn guard_holds_the_word_until_dropped() {
    let table = SpinMutex::new([0u8; 4]);

    let mut guard = table.lock();
    guard[1] = 7;
    assert!(table.try_lock().is_none());
    drop(guard);

    assert_eq!(table.try_lock().map(|g| g[1]), Some(7));
}

#[test]
fn threads_publishing_through_one_mutex_lose_no_updates() {
    use std::sync::{Arc, Barrier};

    let writers = 4;
    let entries = 2_000;

    let log = Arc::new(SpinMutex::new(Vec::with_capacity(writers * entries)));
    let start = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|w| {
            let log = Arc::clone(&log);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for i in 0..entries {
                    log.with_lock(|v| v.push((w, i)));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().expect("writer thread");
    }

    let log = log.with_lock(std::mem::take);
    assert_eq!(log.len(), writers * entries);
    for w in 0..writers {
        let mine: Vec<_> = log.iter().filter(|(o, _)| *o == w).map(|(_, i)| *i).collect();
        assert!(mine.windows(2).all(|p| p[0] < p[1]), "writer {w} reordered");
    }
}

#[test]
fn lock_is_released_on_panic() {
    let m = SpinMutex::new(0u32);

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        m.with_lock(|v| {
            *v = 123;
            panic!("boom");
        });
    }));
    assert!(res.is_err());

    assert_eq!(m.with_lock(|v| *v), 123);
}

#[test]
fn get_mut_and_into_inner() {
    let mut m = SpinMutex::new(vec![1, 2, 3]);
    m.get_mut().push(4);
    assert_eq!(m.into_inner(), vec![1, 2, 3, 4]);
}
