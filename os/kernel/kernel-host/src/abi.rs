//! C-ABI shapes of the host primitives.
//!
//! Each alias is the exact signature the position-independent library calls
//! through. Changing one is an ABI break for the redirect table.

use core::ffi::{c_char, c_int, c_longlong, c_uint, c_void};
use kernel_sync::RawMutex;

/// Allocation flags (`gfp_t`).
pub type Gfp = c_uint;

/// Sleep-capable allocation from process context.
pub const GFP_KERNEL: Gfp = 0xcc0;
/// Allocation that must not sleep.
pub const GFP_ATOMIC: Gfp = 0xa20;
/// Zero the returned memory.
pub const GFP_ZERO: Gfp = 0x100;

/// Returned for zero-sized allocations; distinct from `NULL`, never dereferenced.
pub const ZERO_SIZE_PTR: *mut c_void = core::ptr::without_provenance_mut(16);

/// No NUMA preference for node-aware allocations.
pub const NUMA_NO_NODE: c_int = -1;

/// Clock offsets accepted by `ktime_get_with_offset`.
pub const TK_OFFS_REAL: c_int = 0;
pub const TK_OFFS_BOOT: c_int = 1;
pub const TK_OFFS_TAI: c_int = 2;

pub const EINVAL: c_int = 22;
pub const ERANGE: c_int = 34;

/// The kernel mutex object the mutex primitives operate on.
pub type KMutex = RawMutex;

/// Character classification table, as `_ctype[]` in `lib/ctype.c`.
#[repr(transparent)]
pub struct CtypeTable(pub [u8; 256]);

pub mod ctype {
    pub const UPPER: u8 = 0x01;
    pub const LOWER: u8 = 0x02;
    pub const DIGIT: u8 = 0x04;
    pub const CNTRL: u8 = 0x08;
    pub const PUNCT: u8 = 0x10;
    pub const SPACE: u8 = 0x20;
    pub const HEX: u8 = 0x40;
    pub const HARD_SPACE: u8 = 0x80;
}

pub type MemcmpFn = unsafe extern "C" fn(*const c_void, *const c_void, usize) -> c_int;
pub type MemcpyFn = unsafe extern "C" fn(*mut c_void, *const c_void, usize) -> *mut c_void;
pub type MemsetFn = unsafe extern "C" fn(*mut c_void, c_int, usize) -> *mut c_void;
pub type MemmoveFn = unsafe extern "C" fn(*mut c_void, *const c_void, usize) -> *mut c_void;

pub type StrncmpFn = unsafe extern "C" fn(*const c_char, *const c_char, usize) -> c_int;
pub type StrlenFn = unsafe extern "C" fn(*const c_char) -> usize;
pub type StrstrFn = unsafe extern "C" fn(*const c_char, *const c_char) -> *mut c_char;
pub type StrncpyFn = unsafe extern "C" fn(*mut c_char, *const c_char, usize) -> *mut c_char;
pub type StrncatFn = unsafe extern "C" fn(*mut c_char, *const c_char, usize) -> *mut c_char;
pub type StrncasecmpFn = unsafe extern "C" fn(*const c_char, *const c_char, usize) -> c_int;
pub type KstrtollFn = unsafe extern "C" fn(*const c_char, c_uint, *mut c_longlong) -> c_int;

/// Emit one preformatted, NUL-terminated line at a kernel log level.
pub type PrintkFn = unsafe extern "C" fn(c_int, *const c_char) -> c_int;
pub type SnprintfFn = unsafe extern "C" fn(*mut c_char, usize, *const c_char, ...) -> c_int;

pub type KmallocFn = unsafe extern "C" fn(usize, Gfp) -> *mut c_void;
pub type KfreeFn = unsafe extern "C" fn(*const c_void);
pub type KsizeFn = unsafe extern "C" fn(*const c_void) -> usize;
pub type KreallocFn = unsafe extern "C" fn(*const c_void, usize, Gfp) -> *mut c_void;
pub type KvmallocNodeFn = unsafe extern "C" fn(usize, Gfp, c_int) -> *mut c_void;
pub type KvfreeFn = unsafe extern "C" fn(*const c_void);
pub type IsVmallocAddrFn = unsafe extern "C" fn(*const c_void) -> bool;
/// `kmem_cache_alloc_trace(cache, flags, size)`; the cache is opaque here.
pub type KmemCacheAllocTraceFn = unsafe extern "C" fn(*mut c_void, Gfp, usize) -> *mut c_void;
/// `kmalloc_order_trace(size, flags, order)`.
pub type KmallocOrderTraceFn = unsafe extern "C" fn(usize, Gfp, c_uint) -> *mut c_void;

pub type GetRandomBytesFn = unsafe extern "C" fn(*mut c_void, usize);
pub type KtimeGetRealSecondsFn = unsafe extern "C" fn() -> i64;
pub type KtimeGetWithOffsetFn = unsafe extern "C" fn(c_int) -> i64;

pub type KernelFpuBeginFn = unsafe extern "C" fn();
pub type KernelFpuEndFn = unsafe extern "C" fn();

pub type MutexInitFn = unsafe extern "C" fn(*mut KMutex, *const c_char, *mut c_void);
pub type MutexLockFn = unsafe extern "C" fn(*mut KMutex);
pub type MutexUnlockFn = unsafe extern "C" fn(*mut KMutex);

pub type MsleepFn = unsafe extern "C" fn(c_uint);
