use crate::abi::KMutex;
use core::cell::Cell;
use core::ffi::{c_char, c_uint, c_void};
use std::time::Duration;

pub unsafe extern "C" fn mutex_init(lock: *mut KMutex, _name: *const c_char, _key: *mut c_void) {
    // SAFETY: `lock` points to a mutex object owned by the caller.
    unsafe { &*lock }.init();
}

pub unsafe extern "C" fn mutex_lock(lock: *mut KMutex) {
    unsafe { &*lock }.lock();
}

pub unsafe extern "C" fn mutex_unlock(lock: *mut KMutex) {
    // SAFETY: the caller holds the lock.
    unsafe { (*lock).unlock() };
}

std::thread_local! {
    static FPU_DEPTH: Cell<usize> = const { Cell::new(0) };
}

pub unsafe extern "C" fn kernel_fpu_begin() {
    FPU_DEPTH.with(|depth| {
        debug_assert_eq!(depth.get(), 0, "kernel FPU sections do not nest");
        depth.set(depth.get() + 1);
    });
}

pub unsafe extern "C" fn kernel_fpu_end() {
    FPU_DEPTH.with(|depth| {
        debug_assert!(depth.get() > 0, "kernel_fpu_end without kernel_fpu_begin");
        depth.set(depth.get().saturating_sub(1));
    });
}

/// Whether the calling thread is inside a `kernel_fpu_begin`/`end` section.
#[must_use]
pub fn fpu_section_active() -> bool {
    FPU_DEPTH.with(|depth| depth.get() > 0)
}

pub unsafe extern "C" fn msleep(ms: c_uint) {
    std::thread::sleep(Duration::from_millis(u64::from(ms)));
}
