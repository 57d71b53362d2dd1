use core::fmt;

/// Longest line the kernel log accepts in one record.
pub const LOG_LINE_MAX: usize = 1024;

/// Fixed-capacity line buffer.
///
/// Writes past the capacity are dropped rather than failing the whole
/// format operation, so an oversized message still produces its leading
/// part. Truncation never splits a UTF-8 sequence.
pub struct LineBuffer<const N: usize = LOG_LINE_MAX> {
    buf: [u8; N],
    len: usize,
    truncated: bool,
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineBuffer<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
            truncated: false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only whole `str` fragments (cut at char boundaries) are copied in.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Drop trailing newlines; the console terminates lines itself.
    pub fn trim_newlines(&mut self) {
        while self.len > 0 && matches!(self.buf[self.len - 1], b'\n' | b'\r') {
            self.len -= 1;
        }
    }
}

impl<const N: usize> fmt::Write for LineBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }

        let room = N - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }

        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        if take < s.len() {
            self.truncated = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn formats_within_capacity() {
        let mut line = LineBuffer::<32>::new();
        write!(line, "status {}", -125).unwrap();
        assert_eq!(line.as_str(), "status -125");
        assert!(!line.truncated());
    }

    #[test]
    fn truncates_at_capacity() {
        let mut line = LineBuffer::<8>::new();
        write!(line, "{}", "0123456789").unwrap();
        assert_eq!(line.as_str(), "01234567");
        assert!(line.truncated());

        // Later fragments are dropped too, even if they would fit.
        line.write_str("").unwrap();
        assert_eq!(line.len(), 8);
    }

    #[test]
    fn never_splits_a_code_point() {
        let mut line = LineBuffer::<4>::new();
        line.write_str("ab\u{00e9}\u{00e9}").unwrap();
        assert_eq!(line.as_str(), "ab\u{00e9}");
        assert!(line.truncated());
    }

    #[test]
    fn trailing_newlines_are_trimmed() {
        let mut line = LineBuffer::<16>::new();
        line.write_str("loaded.\n\n").unwrap();
        line.trim_newlines();
        assert_eq!(line.as_str(), "loaded.");
    }
}
