use core::hint::spin_loop;
use core::sync::atomic::{AtomicUsize, Ordering};

const UNINIT: usize = 0;
const UNLOCKED: usize = 1;
const LOCKED: usize = 2;

/// A one-word mutex with the life cycle of a kernel `struct mutex`.
///
/// A zeroed `RawMutex` is *uninitialized*, just like a mutex embedded in a
/// zero-filled allocation: it has to go through [`RawMutex::init`] before
/// it can be locked. The type is `#[repr(C)]` so it can be handed to the
/// `extern "C"` host mutex primitives by pointer.
#[repr(C)]
pub struct RawMutex {
    state: AtomicUsize,
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl RawMutex {
    /// An initialized, unlocked mutex.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicUsize::new(UNLOCKED),
        }
    }

    /// A mutex in the zeroed, not yet initialized state.
    #[must_use]
    pub const fn uninit() -> Self {
        Self {
            state: AtomicUsize::new(UNINIT),
        }
    }

    /// (Re)initialize to the unlocked state.
    #[inline]
    pub fn init(&self) {
        self.state.store(UNLOCKED, Ordering::Release);
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.load(Ordering::Relaxed) != UNINIT
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) == LOCKED
    }

    /// Spin until the lock is taken.
    ///
    /// Locking an uninitialized mutex never succeeds; it is a bug in the
    /// caller and trips a debug assertion.
    #[inline]
    pub fn lock(&self) {
        debug_assert!(self.is_initialized(), "locking an uninitialized mutex");
        while !self.try_lock() {
            // Test-and-test-and-set: wait on a plain load before retrying.
            while self.state.load(Ordering::Relaxed) == LOCKED {
                spin_loop();
            }
        }
    }

    #[inline]
    pub fn try_lock(&self) -> bool {
        self.state
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Release the lock.
    ///
    /// # Safety
    /// The caller must hold the lock.
    #[inline]
    pub unsafe fn unlock(&self) {
        debug_assert!(self.is_locked(), "unlocking a mutex that is not held");
        self.state.store(UNLOCKED, Ordering::Release);
    }
}
