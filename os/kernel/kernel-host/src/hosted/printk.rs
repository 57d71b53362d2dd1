use core::ffi::{CStr, c_char, c_int};
use log::Level;

/// Route a kernel log line into the `log` facade.
pub unsafe extern "C" fn printk(level: c_int, line: *const c_char) -> c_int {
    if line.is_null() {
        return 0;
    }

    // SAFETY: `line` is NUL-terminated.
    let bytes = unsafe { CStr::from_ptr(line) }.to_bytes();
    let text = String::from_utf8_lossy(bytes);

    let level = match level {
        ..=3 => Level::Error,
        4 => Level::Warn,
        5 | 6 => Level::Info,
        _ => Level::Debug,
    };
    log::log!(target: "pie", level, "{}", text.trim_end_matches('\n'));

    c_int::try_from(bytes.len()).unwrap_or(c_int::MAX)
}
