use crate::LibStatus;
use log::error;
use module_redirect::FipsMarkers;

/// Validation generation of the FIPS module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FipsEdition {
    V140,
    V140_2,
    /// 140-2 with the validated DRBG only.
    V140_2Rand,
    V140_3,
}

impl FipsEdition {
    /// Label used in the POST banner.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::V140 => "140",
            Self::V140_2 => "140-2",
            Self::V140_2Rand => "140-2 rand",
            Self::V140_3 => "ready",
        }
    }
}

/// Called by the FIPS module whenever a self-check completes or fails.
///
/// `message` is the module's own text for `err`.
pub type FipsCallback = fn(ok: bool, err: LibStatus, message: &str, hash: Option<&str>);

/// The FIPS validation boundary of the library.
pub trait FipsModule {
    fn edition(&self) -> FipsEdition;

    /// Install `callback`; a non-success status aborts activation.
    fn set_failure_callback(&mut self, callback: FipsCallback) -> LibStatus;

    /// Run the power-on self-test and in-core integrity check.
    fn run_entry_validation(&mut self);

    /// Outcome of the last validation.
    fn status(&self) -> LibStatus;

    /// The hash computed over the in-core image, if available.
    fn core_hash(&self) -> Option<&str>;

    /// Human-readable text for a status code, as passed to the callback.
    fn error_string(&self, status: LibStatus) -> &str;

    /// Boundary markers to place in the redirect table.
    fn boundary_markers(&self) -> Option<FipsMarkers> {
        None
    }
}

/// Stands in for the FIPS module in builds without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoFips {}

impl FipsModule for NoFips {
    fn edition(&self) -> FipsEdition {
        match *self {}
    }

    fn set_failure_callback(&mut self, _callback: FipsCallback) -> LibStatus {
        match *self {}
    }

    fn run_entry_validation(&mut self) {
        match *self {}
    }

    fn status(&self) -> LibStatus {
        match *self {}
    }

    fn core_hash(&self) -> Option<&str> {
        match *self {}
    }

    fn error_string(&self, _status: LibStatus) -> &str {
        match *self {}
    }
}

/// The callback registered with the FIPS module during activation.
pub fn report_fips_failure(ok: bool, err: LibStatus, message: &str, hash: Option<&str>) {
    if !ok || err != LibStatus::SUCCESS {
        error!("FIPS error: {message} (status {err})");
    }
    if err == LibStatus::IN_CORE_INTEGRITY {
        error!("In-core integrity hash check failure.");
        error!(
            "Update the expected core hash with \"{}\" and rebuild.",
            hash.unwrap_or("<null>")
        );
    }
}
