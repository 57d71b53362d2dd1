//! `kmalloc` family on top of the global allocator.
//!
//! Every block carries a header holding its usable size so `kfree` and
//! `ksize` work from the pointer alone. `kvmalloc` blocks are additionally
//! recorded so `is_vmalloc_addr` can answer for arbitrary addresses
//! without reading through them.

use crate::abi::{GFP_ZERO, Gfp, ZERO_SIZE_PTR};
use core::ffi::{c_int, c_uint, c_void};
use core::ptr;
use kernel_sync::SpinMutex;
use std::alloc::{Layout, alloc, alloc_zeroed, dealloc, realloc};
use std::collections::BTreeSet;

const HEADER: usize = 16;
const ALIGN: usize = 16;
const PAGE_SIZE: usize = 4096;

static VMALLOC_BLOCKS: SpinMutex<BTreeSet<usize>> = SpinMutex::new(BTreeSet::new());

fn layout_for(size: usize) -> Option<Layout> {
    Layout::from_size_align(size.checked_add(HEADER)?, ALIGN).ok()
}

/// `ZERO_OR_NULL_PTR()`.
fn zero_or_null(ptr: *const c_void) -> bool {
    ptr.addr() <= ZERO_SIZE_PTR.addr()
}

unsafe fn allocate(size: usize, flags: Gfp) -> *mut c_void {
    if size == 0 {
        return ZERO_SIZE_PTR;
    }
    let Some(layout) = layout_for(size) else {
        return ptr::null_mut();
    };

    // SAFETY: `layout` has non-zero size.
    let base = unsafe {
        if flags & GFP_ZERO == 0 {
            alloc(layout)
        } else {
            alloc_zeroed(layout)
        }
    };
    if base.is_null() {
        return ptr::null_mut();
    }

    // SAFETY: `base` is aligned for `usize` and at least HEADER bytes long.
    unsafe {
        base.cast::<usize>().write(size);
        base.add(HEADER).cast()
    }
}

/// Base pointer and usable size of a live block.
unsafe fn block(ptr: *const c_void) -> (*mut u8, usize) {
    // SAFETY: `ptr` came from `allocate`, so the header precedes it.
    unsafe {
        let base = ptr.cast::<u8>().cast_mut().sub(HEADER);
        (base, base.cast::<usize>().read())
    }
}

unsafe fn release(ptr: *const c_void) {
    // SAFETY: `ptr` is a live block from `allocate`.
    unsafe {
        let (base, size) = block(ptr);
        if let Some(layout) = layout_for(size) {
            dealloc(base, layout);
        }
    }
}

pub unsafe extern "C" fn kmalloc(size: usize, flags: Gfp) -> *mut c_void {
    unsafe { allocate(size, flags) }
}

pub unsafe extern "C" fn kfree(ptr: *const c_void) {
    if zero_or_null(ptr) {
        return;
    }
    VMALLOC_BLOCKS.lock().remove(&ptr.addr());
    unsafe { release(ptr) };
}

pub unsafe extern "C" fn ksize(ptr: *const c_void) -> usize {
    if zero_or_null(ptr) {
        return 0;
    }
    unsafe { block(ptr).1 }
}

pub unsafe extern "C" fn krealloc(ptr: *const c_void, new_size: usize, flags: Gfp) -> *mut c_void {
    if zero_or_null(ptr) {
        return unsafe { allocate(new_size, flags) };
    }
    if new_size == 0 {
        unsafe { kfree(ptr) };
        return ZERO_SIZE_PTR;
    }

    // SAFETY: `ptr` is a live block; the new layout keeps the alignment.
    unsafe {
        let (base, old_size) = block(ptr);
        let (Some(old_layout), Some(new_layout)) = (layout_for(old_size), layout_for(new_size))
        else {
            return ptr::null_mut();
        };

        let moved = realloc(base, old_layout, new_layout.size());
        if moved.is_null() {
            // The original block is left untouched, as with krealloc.
            return ptr::null_mut();
        }

        moved.cast::<usize>().write(new_size);
        if flags & GFP_ZERO != 0 && new_size > old_size {
            ptr::write_bytes(moved.add(HEADER + old_size), 0, new_size - old_size);
        }

        let data = moved.add(HEADER);
        let mut vmalloc = VMALLOC_BLOCKS.lock();
        if vmalloc.remove(&ptr.addr()) {
            vmalloc.insert(data.addr());
        }
        data.cast()
    }
}

/// Slab-cache allocation as emitted by `kmalloc()` for constant sizes.
/// There are no caches in user space; the object is an ordinary block.
pub unsafe extern "C" fn kmem_cache_alloc_trace(
    _cache: *mut c_void,
    flags: Gfp,
    size: usize,
) -> *mut c_void {
    unsafe { allocate(size, flags) }
}

/// Page-order allocation for sizes above the largest slab. The block spans
/// `PAGE_SIZE << order` bytes, which is what `ksize` reports afterwards.
pub unsafe extern "C" fn kmalloc_order_trace(size: usize, flags: Gfp, order: c_uint) -> *mut c_void {
    let span = PAGE_SIZE
        .checked_shl(order)
        .filter(|&span| span >= size)
        .unwrap_or(size);
    unsafe { allocate(span, flags) }
}

pub unsafe extern "C" fn kvmalloc_node(size: usize, flags: Gfp, _node: c_int) -> *mut c_void {
    let ptr = unsafe { allocate(size, flags) };
    if !zero_or_null(ptr) {
        VMALLOC_BLOCKS.lock().insert(ptr.addr());
    }
    ptr
}

pub unsafe extern "C" fn kvfree(ptr: *const c_void) {
    unsafe { kfree(ptr) }
}

pub unsafe extern "C" fn is_vmalloc_addr(ptr: *const c_void) -> bool {
    VMALLOC_BLOCKS.lock().contains(&ptr.addr())
}
