//! User-space implementations of the host primitives.
//!
//! The memory and string routines are the C library's own. Everything the
//! kernel does differently gets its own implementation here, following the
//! kernel's edge cases PIE code may rely on. None of these are exported
//! under their C names; they are only reachable through [`symbols`].

mod ctype;
mod heap;
mod printk;
mod random;
mod string;
mod sync;
mod time;

pub use ctype::CTYPE;
pub use sync::fpu_section_active;

use crate::KernelSymbols;

#[must_use]
pub fn symbols() -> KernelSymbols {
    KernelSymbols {
        memcmp: libc::memcmp,
        memcpy: libc::memcpy,
        memset: libc::memset,
        memmove: libc::memmove,

        strncmp: libc::strncmp,
        strlen: libc::strlen,
        strstr: libc::strstr,
        strncpy: libc::strncpy,
        strncat: libc::strncat,
        strncasecmp: libc::strncasecmp,
        kstrtoll: string::kstrtoll,

        printk: printk::printk,
        snprintf: libc::snprintf,
        ctype: &CTYPE,

        kmalloc: heap::kmalloc,
        kfree: heap::kfree,
        ksize: heap::ksize,
        krealloc: heap::krealloc,
        kvmalloc_node: Some(heap::kvmalloc_node),
        kvfree: Some(heap::kvfree),
        is_vmalloc_addr: heap::is_vmalloc_addr,
        kmem_cache_alloc_trace: Some(heap::kmem_cache_alloc_trace),
        kmalloc_order_trace: Some(heap::kmalloc_order_trace),

        get_random_bytes: random::get_random_bytes,
        ktime_get_real_seconds: time::ktime_get_real_seconds,
        ktime_get_with_offset: time::ktime_get_with_offset,

        kernel_fpu_begin: Some(sync::kernel_fpu_begin),
        kernel_fpu_end: Some(sync::kernel_fpu_end),

        mutex_init: sync::mutex_init,
        mutex_lock: sync::mutex_lock,
        mutex_unlock: sync::mutex_unlock,

        msleep: sync::msleep,
    }
}
