//! # Host primitives
//!
//! The routines a position-independent library image needs from the kernel
//! it is loaded into, collected into one [`KernelSymbols`] value.
//!
//! PIE-compiled code cannot call kernel symbols directly; the module copies
//! these addresses into a redirect table and the library calls through it.
//! This crate only *provides* the addresses. Which of them end up in the
//! table is decided by the build's capability set.
//!
//! ## Backends
//!
//! * `hosted` (default): user-space implementations with kernel semantics
//!   (`ZERO_SIZE_PTR`, `__GFP_ZERO`, `-EINVAL`/`-ERANGE` from `kstrtoll`, a
//!   one-word mutex object, ...). Used by the tests and the `modsim` tool.
//! * `linux`: the running kernel's exported symbols, bound through `extern`
//!   declarations and resolved by the module loader at `insmod` time.

#![cfg_attr(not(any(test, feature = "hosted")), no_std)]
#![allow(unsafe_code)]

pub mod abi;

#[cfg(feature = "hosted")]
pub mod hosted;

#[cfg(all(feature = "linux", not(feature = "hosted")))]
pub mod linux;

use abi::{
    CtypeTable, GetRandomBytesFn, IsVmallocAddrFn, KernelFpuBeginFn, KernelFpuEndFn, KfreeFn,
    KmallocFn, KmallocOrderTraceFn, KmemCacheAllocTraceFn, KreallocFn, KsizeFn, KstrtollFn,
    KtimeGetRealSecondsFn, KtimeGetWithOffsetFn, KvfreeFn, KvmallocNodeFn, MemcmpFn, MemcpyFn,
    MemmoveFn, MemsetFn, MsleepFn, MutexInitFn, MutexLockFn, MutexUnlockFn, PrintkFn, SnprintfFn,
    StrlenFn, StrncasecmpFn, StrncatFn, StrncmpFn, StrncpyFn, StrstrFn,
};

/// Addresses of every host primitive the module can redirect to.
///
/// Primitives every supported host exports are plain function pointers, so
/// a backend that forgets one does not compile. Primitives that depend on
/// the kernel version or architecture are `Option`s.
#[derive(Clone, Copy)]
pub struct KernelSymbols {
    pub memcmp: MemcmpFn,
    pub memcpy: MemcpyFn,
    pub memset: MemsetFn,
    pub memmove: MemmoveFn,

    pub strncmp: StrncmpFn,
    pub strlen: StrlenFn,
    pub strstr: StrstrFn,
    pub strncpy: StrncpyFn,
    pub strncat: StrncatFn,
    pub strncasecmp: StrncasecmpFn,
    pub kstrtoll: KstrtollFn,

    pub printk: PrintkFn,
    pub snprintf: SnprintfFn,
    pub ctype: &'static CtypeTable,

    pub kmalloc: KmallocFn,
    pub kfree: KfreeFn,
    pub ksize: KsizeFn,
    pub krealloc: KreallocFn,
    /// Absent before the kernel grew `kvmalloc`.
    pub kvmalloc_node: Option<KvmallocNodeFn>,
    pub kvfree: Option<KvfreeFn>,
    pub is_vmalloc_addr: IsVmallocAddrFn,
    /// Out-of-line slab entry points of `kmalloc`; gone since Linux 6.1.
    pub kmem_cache_alloc_trace: Option<KmemCacheAllocTraceFn>,
    pub kmalloc_order_trace: Option<KmallocOrderTraceFn>,

    pub get_random_bytes: GetRandomBytesFn,
    pub ktime_get_real_seconds: KtimeGetRealSecondsFn,
    pub ktime_get_with_offset: KtimeGetWithOffsetFn,

    /// Only on architectures with kernel-mode vector/FPU sections.
    pub kernel_fpu_begin: Option<KernelFpuBeginFn>,
    pub kernel_fpu_end: Option<KernelFpuEndFn>,

    pub mutex_init: MutexInitFn,
    pub mutex_lock: MutexLockFn,
    pub mutex_unlock: MutexUnlockFn,

    /// Not redirected; used by the module itself.
    pub msleep: MsleepFn,
}

/// The primitives of the active backend.
#[cfg(feature = "hosted")]
#[must_use]
pub fn kernel_symbols() -> KernelSymbols {
    hosted::symbols()
}

/// The primitives of the active backend.
#[cfg(all(feature = "linux", not(feature = "hosted")))]
#[must_use]
pub fn kernel_symbols() -> KernelSymbols {
    linux::symbols()
}
