use core::{
    cell::UnsafeCell,
    convert::Infallible,
    hint::spin_loop,
    mem::MaybeUninit,
    sync::atomic::{AtomicU8, Ordering},
};

/// 0 = EMPTY, 1 = WRITING, 2 = SEALED, 3 = POISONED
const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const SEALED: u8 = 2;
const POISONED: u8 = 3;

/// Reasons a [`WriteOnce`] refused or failed a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteOnceError<E> {
    /// The cell already holds a sealed value.
    #[error("value has already been written")]
    AlreadyWritten,
    /// An earlier initializer failed; the cell will never hold a value.
    #[error("an earlier write failed, the cell is poisoned")]
    Poisoned,
    /// The initializer of this call failed. The cell is now poisoned.
    #[error("initializer failed: {0}")]
    Init(E),
}

/// A cell that is written at most once and is immutable afterwards.
///
/// Unlike a lazily initialized cell there is no "retry": the terminal states
/// are *sealed* (value published) and *poisoned* (the one allowed write
/// failed). Readers only ever observe a fully written value.
pub struct WriteOnce<T> {
    state: AtomicU8,
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WriteOnce<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Returns `Some(&T)` once the value is sealed.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        if self.state.load(Ordering::Acquire) == SEALED {
            // SAFETY: SEALED is only stored after the value was written.
            Some(unsafe { (*self.value.get()).assume_init_ref() })
        } else {
            None
        }
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.state.load(Ordering::Acquire) == SEALED
    }

    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.state.load(Ordering::Acquire) == POISONED
    }

    /// Publish `value`.
    ///
    /// # Errors
    /// Fails if the cell was already written or poisoned.
    pub fn write(&self, value: T) -> Result<&T, WriteOnceError<Infallible>> {
        self.try_write_with(|| Ok(value))
    }

    /// Run `init` and publish its value.
    ///
    /// `init` runs only if this call wins the single write. If it returns an
    /// error the cell is poisoned and the error is handed back.
    ///
    /// # Errors
    /// [`WriteOnceError::AlreadyWritten`] or [`WriteOnceError::Poisoned`] if
    /// the write slot was taken before; [`WriteOnceError::Init`] if `init`
    /// failed.
    pub fn try_write_with<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, WriteOnceError<E>> {
        if let Err(observed) =
            self.state
                .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Acquire)
        {
            return Err(self.lost_race(observed));
        }

        match init() {
            Ok(value) => {
                // SAFETY: the WRITING state grants exclusive access to the slot.
                let stored = unsafe { (*self.value.get()).write(value) as *const T };
                self.state.store(SEALED, Ordering::Release);
                // SAFETY: just written and sealed; never mutated again.
                Ok(unsafe { &*stored })
            }
            Err(e) => {
                self.state.store(POISONED, Ordering::Release);
                Err(WriteOnceError::Init(e))
            }
        }
    }

    fn lost_race<E>(&self, mut observed: u8) -> WriteOnceError<E> {
        while observed == WRITING {
            spin_loop();
            observed = self.state.load(Ordering::Acquire);
        }

        if observed == POISONED {
            WriteOnceError::Poisoned
        } else {
            WriteOnceError::AlreadyWritten
        }
    }
}

impl<T> Drop for WriteOnce<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == SEALED {
            // SAFETY: sealed values are initialized and dropped exactly once here.
            unsafe { self.value.get_mut().assume_init_drop() };
        }
    }
}

// Safety: shared only after SEALED; the write itself is single-writer.
unsafe impl<T: Sync + Send> Sync for WriteOnce<T> {}
unsafe impl<T: Send> Send for WriteOnce<T> {}
