use crate::{LibStatus, SelfTestFailure};
use module_redirect::{CertLookup, RedirectTable};

/// Which library image the module carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryFlavor {
    /// Cryptographic primitives only.
    CryptoOnly,
    /// Cryptography plus the TLS/DTLS protocol layer.
    Protocol,
}

impl LibraryFlavor {
    /// The flavor selected by this build's cargo features.
    pub const BUILD: Self = if cfg!(feature = "crypto-only") {
        Self::CryptoOnly
    } else {
        Self::Protocol
    };

    /// The status `init` and `cleanup` return on success.
    #[must_use]
    pub const fn success(self) -> LibStatus {
        match self {
            Self::CryptoOnly => LibStatus::SUCCESS,
            Self::Protocol => LibStatus::PROTOCOL_SUCCESS,
        }
    }
}

/// Arguments handed to the self-test entry point.
#[derive(Debug, Default)]
pub struct SelfTestArgs<'a> {
    pub argv: &'a [&'a str],
    /// Set by the suite to its overall result.
    pub return_code: i32,
}

/// The crypto library packaged in the module.
///
/// The lifecycle controller only drives this interface; the library's state
/// is its own.
pub trait CryptoLibrary {
    fn name(&self) -> &str;
    fn version(&self) -> &str;
    fn copyright(&self) -> &str;

    /// Where to find more about the library; appended to the ready banner.
    fn homepage(&self) -> Option<&str> {
        None
    }

    /// Bring up library state. `table` is the published redirect table when
    /// the build redirects host primitives.
    fn init(&mut self, table: Option<&RedirectTable>) -> LibStatus;

    fn cleanup(&mut self) -> LibStatus;

    /// Run the known-answer test suite.
    ///
    /// # Errors
    /// The first failing check.
    fn self_test(&mut self, args: Option<&mut SelfTestArgs<'_>>) -> Result<(), SelfTestFailure>;

    /// Human-readable text for a status code.
    fn error_string(&self, status: LibStatus) -> &str;

    /// Certificate-store lookups to place in the redirect table.
    fn cert_lookup(&self) -> Option<CertLookup> {
        None
    }
}
