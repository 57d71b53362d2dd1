//! `kstrtoll`, which user space has no equivalent for.

use crate::abi::{EINVAL, ERANGE};
use core::ffi::{CStr, c_char, c_int, c_longlong, c_uint};

pub unsafe extern "C" fn kstrtoll(s: *const c_char, base: c_uint, res: *mut c_longlong) -> c_int {
    if s.is_null() || res.is_null() {
        return -EINVAL;
    }

    // SAFETY: `s` is a NUL-terminated string.
    let input = unsafe { CStr::from_ptr(s) }.to_bytes();
    match parse_kstrtoll(input, base) {
        Ok(value) => {
            // SAFETY: `res` is writable; only written on success.
            unsafe { res.write(value) };
            0
        }
        Err(errno) => errno,
    }
}

/// Parse a signed integer with `kstrtoll` rules.
///
/// `base` 0 auto-detects `0x` (hex) and leading `0` (octal). A single
/// trailing newline is accepted. Returns `-EINVAL` for malformed input and
/// `-ERANGE` when the value does not fit.
///
/// # Errors
/// Negative errno as described above.
fn parse_kstrtoll(input: &[u8], base: c_uint) -> Result<i64, c_int> {
    let input = input.strip_suffix(b"\n").unwrap_or(input);
    let (negative, unsigned) = match input {
        [b'-', rest @ ..] => (true, rest),
        [b'+', rest @ ..] => (false, rest),
        _ => (false, input),
    };

    let (radix, digits) = detect_radix(unsigned, base)?;
    if digits.is_empty() {
        return Err(-EINVAL);
    }

    let mut magnitude: u64 = 0;
    for &b in digits {
        let digit = char::from(b).to_digit(radix).ok_or(-EINVAL)?;
        magnitude = magnitude
            .checked_mul(u64::from(radix))
            .and_then(|m| m.checked_add(u64::from(digit)))
            .ok_or(-ERANGE)?;
    }

    if negative {
        0i64.checked_sub_unsigned(magnitude).ok_or(-ERANGE)
    } else {
        i64::try_from(magnitude).map_err(|_| -ERANGE)
    }
}

fn detect_radix(digits: &[u8], base: c_uint) -> Result<(u32, &[u8]), c_int> {
    match base {
        0 => Ok(match (strip_hex_prefix(digits), digits) {
            (Some(rest), _) => (16, rest),
            (None, [b'0', rest @ ..]) if !rest.is_empty() => (8, rest),
            (None, _) => (10, digits),
        }),
        16 => Ok((16, strip_hex_prefix(digits).unwrap_or(digits))),
        2..=36 => Ok((base, digits)),
        _ => Err(-EINVAL),
    }
}

fn strip_hex_prefix(digits: &[u8]) -> Option<&[u8]> {
    match digits {
        [b'0', b'x' | b'X', rest @ ..] if !rest.is_empty() => Some(rest),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_with_sign_and_newline() {
        assert_eq!(parse_kstrtoll(b"-42\n", 10), Ok(-42));
        assert_eq!(parse_kstrtoll(b"+7", 10), Ok(7));
    }

    #[test]
    fn auto_detects_radix() {
        assert_eq!(parse_kstrtoll(b"0x1f", 0), Ok(31));
        assert_eq!(parse_kstrtoll(b"017", 0), Ok(15));
        assert_eq!(parse_kstrtoll(b"0", 0), Ok(0));
        assert_eq!(parse_kstrtoll(b"0X10", 16), Ok(16));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_kstrtoll(b"", 10), Err(-EINVAL));
        assert_eq!(parse_kstrtoll(b"12a", 10), Err(-EINVAL));
        assert_eq!(parse_kstrtoll(b"0x", 16), Err(-EINVAL));
        assert_eq!(parse_kstrtoll(b"1\n\n", 10), Err(-EINVAL));
        assert_eq!(parse_kstrtoll(b"1", 1), Err(-EINVAL));
    }

    #[test]
    fn range_limits() {
        assert_eq!(parse_kstrtoll(b"9223372036854775807", 10), Ok(i64::MAX));
        assert_eq!(parse_kstrtoll(b"-9223372036854775808", 10), Ok(i64::MIN));
        assert_eq!(parse_kstrtoll(b"9223372036854775808", 10), Err(-ERANGE));
        assert_eq!(parse_kstrtoll(b"99999999999999999999", 10), Err(-ERANGE));
    }
}
