//! Bindings to the running kernel's exports.
//!
//! Symbols are resolved by the module loader; a missing export fails
//! `insmod` before any of this code runs. The few primitives whose kernel
//! form does not match the redirect ABI get a small shim.

use crate::KernelSymbols;
use crate::abi::{CtypeTable, Gfp, KMutex};
use core::ffi::{c_char, c_int, c_longlong, c_uint, c_void};

/// Start of a kernel log-level prefix (`KERN_SOH`).
const KERN_SOH: u8 = 0x01;

#[allow(non_upper_case_globals)]
unsafe extern "C" {
    fn memcmp(a: *const c_void, b: *const c_void, n: usize) -> c_int;
    fn memcpy(dst: *mut c_void, src: *const c_void, n: usize) -> *mut c_void;
    fn memset(dst: *mut c_void, c: c_int, n: usize) -> *mut c_void;
    fn memmove(dst: *mut c_void, src: *const c_void, n: usize) -> *mut c_void;

    fn strncmp(a: *const c_char, b: *const c_char, n: usize) -> c_int;
    fn strlen(s: *const c_char) -> usize;
    fn strstr(haystack: *const c_char, needle: *const c_char) -> *mut c_char;
    fn strncpy(dst: *mut c_char, src: *const c_char, n: usize) -> *mut c_char;
    fn strncat(dst: *mut c_char, src: *const c_char, n: usize) -> *mut c_char;
    fn strncasecmp(a: *const c_char, b: *const c_char, n: usize) -> c_int;
    fn kstrtoll(s: *const c_char, base: c_uint, res: *mut c_longlong) -> c_int;

    fn _printk(fmt: *const c_char, ...) -> c_int;
    fn snprintf(buf: *mut c_char, size: usize, fmt: *const c_char, ...) -> c_int;
    static _ctype: CtypeTable;

    fn __kmalloc(size: usize, flags: Gfp) -> *mut c_void;
    fn kfree(ptr: *const c_void);
    fn ksize(ptr: *const c_void) -> usize;
    fn krealloc(ptr: *const c_void, size: usize, flags: Gfp) -> *mut c_void;
    fn kvmalloc_node(size: usize, flags: Gfp, node: c_int) -> *mut c_void;
    fn kvfree(ptr: *const c_void);
    fn is_vmalloc_addr(ptr: *const c_void) -> bool;
    #[cfg(feature = "slab-trace")]
    fn kmem_cache_alloc_trace(cache: *mut c_void, flags: Gfp, size: usize) -> *mut c_void;
    #[cfg(feature = "slab-trace")]
    fn kmalloc_order_trace(size: usize, flags: Gfp, order: c_uint) -> *mut c_void;

    fn get_random_bytes(buf: *mut c_void, len: usize);
    fn ktime_get_real_seconds() -> i64;
    fn ktime_get_with_offset(offset: c_int) -> i64;

    #[cfg(target_arch = "x86_64")]
    fn kernel_fpu_begin_mask(mask: c_uint);
    #[cfg(target_arch = "x86_64")]
    fn kernel_fpu_end();

    fn __mutex_init(lock: *mut KMutex, name: *const c_char, key: *mut c_void);
    fn mutex_lock(lock: *mut KMutex);
    fn mutex_unlock(lock: *mut KMutex);

    fn msleep(ms: c_uint);
}

/// `printk` is variadic and takes its level inline; the redirect ABI takes
/// a level and one preformatted line.
unsafe extern "C" fn printk_line(level: c_int, line: *const c_char) -> c_int {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let digit = b'0' + level.clamp(0, 7) as u8;
    let prefix = [KERN_SOH, digit, 0];
    // SAFETY: both arguments are NUL-terminated.
    unsafe { _printk(c"%s%s".as_ptr(), prefix.as_ptr().cast::<c_char>(), line) }
}

#[cfg(target_arch = "x86_64")]
unsafe extern "C" fn kernel_fpu_begin() {
    const KFPU_387: c_uint = 1 << 0;
    const KFPU_MXCSR: c_uint = 1 << 1;
    unsafe { kernel_fpu_begin_mask(KFPU_387 | KFPU_MXCSR) };
}

#[must_use]
pub fn symbols() -> KernelSymbols {
    KernelSymbols {
        memcmp,
        memcpy,
        memset,
        memmove,

        strncmp,
        strlen,
        strstr,
        strncpy,
        strncat,
        strncasecmp,
        kstrtoll,

        printk: printk_line,
        snprintf,
        // SAFETY: `_ctype` is an immutable table for the lifetime of the kernel.
        ctype: unsafe { &_ctype },

        kmalloc: __kmalloc,
        kfree,
        ksize,
        krealloc,
        kvmalloc_node: Some(kvmalloc_node),
        kvfree: Some(kvfree),
        is_vmalloc_addr,
        #[cfg(feature = "slab-trace")]
        kmem_cache_alloc_trace: Some(kmem_cache_alloc_trace),
        #[cfg(feature = "slab-trace")]
        kmalloc_order_trace: Some(kmalloc_order_trace),
        #[cfg(not(feature = "slab-trace"))]
        kmem_cache_alloc_trace: None,
        #[cfg(not(feature = "slab-trace"))]
        kmalloc_order_trace: None,

        get_random_bytes,
        ktime_get_real_seconds,
        ktime_get_with_offset,

        #[cfg(target_arch = "x86_64")]
        kernel_fpu_begin: Some(kernel_fpu_begin),
        #[cfg(target_arch = "x86_64")]
        kernel_fpu_end: Some(kernel_fpu_end),
        #[cfg(not(target_arch = "x86_64"))]
        kernel_fpu_begin: None,
        #[cfg(not(target_arch = "x86_64"))]
        kernel_fpu_end: None,

        mutex_init: __mutex_init,
        mutex_lock,
        mutex_unlock,

        msleep,
    }
}
