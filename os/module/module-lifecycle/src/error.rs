use crate::{Errno, LibStatus, ModuleState, SelfTestFailure};
use alloc::string::String;
use module_redirect::BuildError;

/// Why FIPS integrity validation rejected the module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// Integrity checking is built in but no FIPS module was attached.
    #[error("no FIPS module attached")]
    Unavailable,
    #[error("registering the FIPS failure callback failed with status {0}")]
    CallbackRegistration(LibStatus),
    #[error("FIPS validation failed with status {0}")]
    Validation(LibStatus),
    /// The image does not match its expected in-core hash.
    #[error("in-core integrity hash mismatch (status {status}), computed hash {}", .computed_hash.as_deref().unwrap_or("<null>"))]
    InCoreHashMismatch {
        status: LibStatus,
        computed_hash: Option<String>,
    },
}

/// A failed activation. Each variant maps to a host status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationError {
    #[error(transparent)]
    RedirectTable(#[from] BuildError),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error("library init failed with status {0}")]
    LibraryInit(LibStatus),
    #[error("self-test failed with {0}")]
    SelfTest(#[from] SelfTestFailure),
    #[error("module cannot be activated from state {0:?}")]
    NotUnloaded(ModuleState),
}

impl ActivationError {
    #[must_use]
    pub const fn errno(&self) -> Errno {
        match self {
            Self::RedirectTable(_) => Errno::Fault,
            Self::NotUnloaded(_) => Errno::Busy,
            Self::Integrity(_) | Self::LibraryInit(_) | Self::SelfTest(_) => Errno::Canceled,
        }
    }

    /// The value returned from the module's init function.
    #[must_use]
    pub const fn host_code(&self) -> i32 {
        self.errno().host_code()
    }
}

/// Library cleanup reported a failure. Logged, never escalated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("library cleanup failed with status {0}")]
pub struct CleanupError(pub LibStatus);
