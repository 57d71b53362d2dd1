//! Structured self-test failure codes.
//!
//! The self-test suite reports a failure as one negative integer that packs
//! the failing check's source line and an auxiliary value:
//! `-(line + (detail & 0x7ff) * 1_000_000)`. [`SelfTestFailure`] keeps the
//! two parts apart and converts to and from that packed form.

use core::fmt;

const LINE_RADIX: u32 = 1_000_000;
const DETAIL_MASK: u32 = 0x7ff;

/// A failed self-test check.
///
/// Built from its parts, the location is reduced below `1_000_000` and the
/// detail to 11 bits, so the packed code always fits an `i32`. Decoded from a
/// raw result, the code the suite returned is kept as is and is what
/// [`encode`](Self::encode) hands back, even when it is wider than the
/// packed form can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelfTestFailure {
    location: u32,
    detail: u32,
    code: i32,
}

impl SelfTestFailure {
    /// A failure without an auxiliary value.
    #[must_use]
    pub const fn at(location: u32) -> Self {
        Self::with_value(location, 0)
    }

    /// A failure carrying a non-negative value.
    #[must_use]
    pub const fn with_value(location: u32, value: u32) -> Self {
        let location = location % LINE_RADIX;
        let detail = value & DETAIL_MASK;
        Self {
            location,
            detail,
            code: pack(location, detail),
        }
    }

    /// A failure carrying a negative library error code.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn with_error(location: u32, code: i32) -> Self {
        Self::with_value(location, code.wrapping_neg() as u32)
    }

    /// Source line of the failing check.
    #[must_use]
    pub const fn location(self) -> u32 {
        self.location
    }

    /// Auxiliary value, 11 bits.
    #[must_use]
    pub const fn detail(self) -> u32 {
        self.detail
    }

    /// The detail read back as a library error code.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn error_code(self) -> i32 {
        -(self.detail as i32)
    }

    /// The negative result code, as the suite reports it.
    #[must_use]
    pub const fn encode(self) -> i32 {
        self.code
    }

    /// Unpack a negative self-test result; `None` for a passing result.
    #[must_use]
    pub const fn decode(code: i32) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        let magnitude = code.unsigned_abs();
        Some(Self {
            location: magnitude % LINE_RADIX,
            detail: (magnitude / LINE_RADIX) & DETAIL_MASK,
            code,
        })
    }

    /// Interpret a raw self-test return value.
    ///
    /// # Errors
    /// The decoded failure for any negative `code`.
    pub const fn check(code: i32) -> Result<(), Self> {
        match Self::decode(code) {
            None => Ok(()),
            Some(failure) => Err(failure),
        }
    }
}

/// `-(location + detail * 1_000_000)`; at most 2_047_999_999 in magnitude.
#[allow(clippy::cast_possible_wrap)]
const fn pack(location: u32, detail: u32) -> i32 {
    -((location + detail * LINE_RADIX) as i32)
}

impl fmt::Display for SelfTestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return code {}", self.code)?;
        if self.detail == 0 {
            write!(f, " (line {})", self.location)
        } else {
            write!(f, " (line {}, detail {})", self.location, self.detail)
        }
    }
}

impl core::error::Error for SelfTestFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_line_and_detail() {
        assert_eq!(SelfTestFailure::at(5).encode(), -5);
        assert_eq!(SelfTestFailure::with_value(1234, 7).encode(), -7_001_234);
        assert_eq!(SelfTestFailure::with_error(88, -173).encode(), -173_000_088);
    }

    #[test]
    fn decode_recovers_both_parts() {
        for (location, detail) in [(1, 0), (999_999, DETAIL_MASK), (4321, 1), (77, 1024)] {
            let failure = SelfTestFailure::with_value(location, detail);
            assert_eq!(SelfTestFailure::decode(failure.encode()), Some(failure));
        }
    }

    #[test]
    fn error_code_round_trips() {
        let failure = SelfTestFailure::with_error(300, -140);
        assert_eq!(failure.detail(), 140);
        assert_eq!(failure.error_code(), -140);
    }

    #[test]
    fn detail_is_masked_to_eleven_bits() {
        assert_eq!(SelfTestFailure::with_value(1, 0x801).detail(), 1);
    }

    #[test]
    fn non_negative_codes_pass() {
        assert_eq!(SelfTestFailure::check(0), Ok(()));
        assert_eq!(SelfTestFailure::check(17), Ok(()));
        assert_eq!(SelfTestFailure::check(-5), Err(SelfTestFailure::at(5)));
    }

    #[test]
    fn most_negative_code_still_fails() {
        let failure = SelfTestFailure::check(i32::MIN).expect_err("negative code");
        assert_eq!(failure.encode(), i32::MIN);
        assert_eq!(failure.location(), 483_648);
        assert_eq!(failure.detail(), 2147 & DETAIL_MASK);
        assert!(failure.to_string().starts_with("return code -2147483648"));
    }

    #[test]
    fn widest_parts_still_pack() {
        let failure = SelfTestFailure::with_value(u32::MAX, u32::MAX);
        assert_eq!(failure.location(), 967_295);
        assert_eq!(failure.detail(), DETAIL_MASK);
        assert_eq!(failure.encode(), -2_047_967_295);
    }

    #[test]
    fn display_includes_packed_code() {
        assert_eq!(
            SelfTestFailure::at(5).to_string(),
            "return code -5 (line 5)"
        );
    }
}
