use core::fmt;

/// A status code returned by the crypto library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibStatus(pub i32);

impl LibStatus {
    /// Success of the crypto-only library.
    pub const SUCCESS: Self = Self(0);
    /// Success of the protocol library's init and cleanup.
    pub const PROTOCOL_SUCCESS: Self = Self(1);
    /// The FIPS in-core integrity hash does not match the image.
    pub const IN_CORE_INTEGRITY: Self = Self(-203);

    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for LibStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse failure classes reported to the module loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Errno {
    /// `ECANCELED`: activation was aborted.
    Canceled,
    /// `EFAULT`: the redirect table is unusable.
    Fault,
    /// `EBUSY`: the module is already active.
    Busy,
}

impl Errno {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Fault => 14,
            Self::Busy => 16,
            Self::Canceled => 125,
        }
    }

    /// The negative value a module init function returns.
    #[must_use]
    pub const fn host_code(self) -> i32 {
        -self.code()
    }
}
