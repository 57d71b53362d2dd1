use core::ffi::c_void;

pub unsafe extern "C" fn get_random_bytes(buf: *mut c_void, len: usize) {
    if buf.is_null() || len == 0 {
        return;
    }

    // SAFETY: `len` writable bytes at `buf`.
    let out = unsafe { core::slice::from_raw_parts_mut(buf.cast::<u8>(), len) };
    if let Err(e) = getrandom::getrandom(out) {
        // get_random_bytes has no failure path; never hand back predictable bytes.
        log::error!("host entropy source failed: {e}");
        std::process::abort();
    }
}
