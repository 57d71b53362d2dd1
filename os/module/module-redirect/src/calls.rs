//! Safe dispatch through a built [`RedirectTable`].
//!
//! PIE-side Rust code never calls a slot directly. Each helper resolves the
//! slot first and returns [`HostCallError::SlotMissing`] instead of calling
//! through an empty one.

use crate::{RedirectTable, Slot};
use core::cmp::Ordering;
use core::ffi::{CStr, c_int, c_longlong};
use core::ptr::{self, NonNull};
use kernel_host::abi::{Gfp, KMutex, KernelFpuEndFn, KfreeFn, MutexUnlockFn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HostCallError {
    #[error("redirect slot `{0}` is empty")]
    SlotMissing(Slot),
    #[error("host call failed with errno {0}")]
    Errno(c_int),
    #[error("host allocation of {0} bytes failed")]
    OutOfMemory(usize),
}

fn resolve<F>(value: Option<F>, slot: Slot) -> Result<F, HostCallError> {
    value.ok_or(HostCallError::SlotMissing(slot))
}

/// Host primitives of one table.
#[derive(Clone, Copy)]
pub struct HostCalls<'t> {
    table: &'t RedirectTable,
}

impl RedirectTable {
    #[must_use]
    pub const fn calls(&self) -> HostCalls<'_> {
        HostCalls { table: self }
    }
}

impl<'t> HostCalls<'t> {
    /// Lexicographic comparison via `memcmp`.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if `memcmp` is not redirected.
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering, HostCallError> {
        let memcmp = resolve(self.table.memcmp, Slot::Memcmp)?;
        let common = a.len().min(b.len());
        // SAFETY: both slices hold at least `common` bytes.
        let r = unsafe { memcmp(a.as_ptr().cast(), b.as_ptr().cast(), common) };
        Ok(r.cmp(&0).then(a.len().cmp(&b.len())))
    }

    /// Copy as much of `src` as fits into `dst`; returns the byte count.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if `memcpy` is not redirected.
    pub fn copy(&self, dst: &mut [u8], src: &[u8]) -> Result<usize, HostCallError> {
        let memcpy = resolve(self.table.memcpy, Slot::Memcpy)?;
        let n = dst.len().min(src.len());
        // SAFETY: distinct borrows, `n` bytes in bounds of both.
        unsafe { memcpy(dst.as_mut_ptr().cast(), src.as_ptr().cast(), n) };
        Ok(n)
    }

    /// # Errors
    /// [`HostCallError::SlotMissing`] if `memset` is not redirected.
    pub fn fill(&self, dst: &mut [u8], byte: u8) -> Result<(), HostCallError> {
        let memset = resolve(self.table.memset, Slot::Memset)?;
        // SAFETY: `dst.len()` writable bytes.
        unsafe { memset(dst.as_mut_ptr().cast(), c_int::from(byte), dst.len()) };
        Ok(())
    }

    /// # Errors
    /// [`HostCallError::SlotMissing`] if `get_random_bytes` is empty.
    pub fn random_bytes(&self, dst: &mut [u8]) -> Result<(), HostCallError> {
        let get_random_bytes = resolve(self.table.get_random_bytes, Slot::GetRandomBytes)?;
        // SAFETY: `dst.len()` writable bytes.
        unsafe { get_random_bytes(dst.as_mut_ptr().cast(), dst.len()) };
        Ok(())
    }

    /// Wall-clock seconds since the epoch.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if `ktime_get_real_seconds` is empty.
    pub fn real_seconds(&self) -> Result<i64, HostCallError> {
        let now = resolve(self.table.ktime_get_real_seconds, Slot::KtimeGetRealSeconds)?;
        // SAFETY: no arguments, no preconditions.
        Ok(unsafe { now() })
    }

    /// Parse with `kstrtoll` rules.
    ///
    /// # Errors
    /// [`HostCallError::Errno`] with the negative errno of a rejected string.
    pub fn parse_i64(&self, text: &CStr, base: u32) -> Result<i64, HostCallError> {
        let kstrtoll = resolve(self.table.kstrtoll, Slot::Kstrtoll)?;
        let mut value: c_longlong = 0;
        // SAFETY: `text` is NUL-terminated, `value` is writable.
        match unsafe { kstrtoll(text.as_ptr(), base, &raw mut value) } {
            0 => Ok(value),
            errno => Err(HostCallError::Errno(errno)),
        }
    }

    /// Emit one line through the host log at kernel level `level`.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if `printk` is empty.
    pub fn printk(&self, level: c_int, line: &CStr) -> Result<c_int, HostCallError> {
        let printk = resolve(self.table.printk, Slot::Printk)?;
        // SAFETY: `line` is NUL-terminated.
        Ok(unsafe { printk(level, line.as_ptr()) })
    }

    /// Allocate `size` bytes with `kmalloc`; freed when the box drops.
    ///
    /// # Errors
    /// [`HostCallError::OutOfMemory`] if the host returned `NULL`.
    pub fn alloc(&self, size: usize, flags: Gfp) -> Result<HostBox, HostCallError> {
        let kmalloc = resolve(self.table.kmalloc, Slot::Kmalloc)?;
        let kfree = resolve(self.table.kfree, Slot::Kfree)?;

        // SAFETY: any size and flag combination is valid.
        let raw = unsafe { kmalloc(size, flags) };
        let ptr = NonNull::new(raw.cast::<u8>()).ok_or(HostCallError::OutOfMemory(size))?;
        Ok(HostBox {
            ptr,
            len: size,
            kfree,
        })
    }

    /// Initialize a host mutex object.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if `mutex_init` is empty.
    pub fn init_mutex(&self, mutex: &KMutex, name: &CStr) -> Result<(), HostCallError> {
        let mutex_init = resolve(self.table.mutex_init, Slot::MutexInit)?;
        // SAFETY: the mutex object is interior-mutable and outlives the call.
        unsafe { mutex_init(ptr::from_ref(mutex).cast_mut(), name.as_ptr(), ptr::null_mut()) };
        Ok(())
    }

    /// Take a host mutex; released when the guard drops.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if either mutex slot is empty.
    pub fn lock<'m>(&self, mutex: &'m KMutex) -> Result<HostMutexGuard<'m>, HostCallError> {
        let mutex_lock = resolve(self.table.mutex_lock, Slot::MutexLock)?;
        let unlock = resolve(self.table.mutex_unlock, Slot::MutexUnlock)?;
        // SAFETY: as in `init_mutex`.
        unsafe { mutex_lock(ptr::from_ref(mutex).cast_mut()) };
        Ok(HostMutexGuard { mutex, unlock })
    }

    /// Run `f` inside a kernel FPU section.
    ///
    /// # Errors
    /// [`HostCallError::SlotMissing`] if FPU sections are not redirected.
    pub fn fpu_section<R>(&self, f: impl FnOnce() -> R) -> Result<R, HostCallError> {
        let begin = resolve(self.table.kernel_fpu_begin, Slot::KernelFpuBegin)?;
        let end = resolve(self.table.kernel_fpu_end, Slot::KernelFpuEnd)?;

        // SAFETY: the section is closed by `FpuSection` on this thread,
        // also when `f` unwinds.
        unsafe { begin() };
        let _section = FpuSection(end);
        Ok(f())
    }

    /// The table these calls dispatch through.
    #[must_use]
    pub const fn table(&self) -> &'t RedirectTable {
        self.table
    }
}

/// A `kmalloc` block, freed with `kfree` on drop.
pub struct HostBox {
    ptr: NonNull<u8>,
    len: usize,
    kfree: KfreeFn,
}

impl HostBox {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[u8] {
        // SAFETY: the block holds `len` bytes; `ZERO_SIZE_PTR` is only seen with `len == 0`.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub const fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in `as_slice`, and the box is uniquely borrowed.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for HostBox {
    fn drop(&mut self) {
        // SAFETY: the block came from the paired `kmalloc` and is freed once.
        unsafe { (self.kfree)(self.ptr.as_ptr().cast_const().cast()) };
    }
}

/// Closes a kernel FPU section on drop.
struct FpuSection(KernelFpuEndFn);

impl Drop for FpuSection {
    fn drop(&mut self) {
        // SAFETY: constructed only right after the matching `kernel_fpu_begin`.
        unsafe { (self.0)() };
    }
}

pub struct HostMutexGuard<'m> {
    mutex: &'m KMutex,
    unlock: MutexUnlockFn,
}

impl Drop for HostMutexGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: this guard holds the lock.
        unsafe { (self.unlock)(ptr::from_ref(self.mutex).cast_mut()) };
    }
}
