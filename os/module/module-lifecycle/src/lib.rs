//! # Module lifecycle
//!
//! Load and unload sequencing for a crypto library packaged as a kernel
//! module. [`ModuleLifecycle::activate`] fails closed: a missing redirect
//! slot, a failed integrity check, a failed library init or a failed
//! self-test each abort the load with a negative host status code, after
//! undoing whatever the failed attempt had already brought up.
//!
//! The library and the FIPS boundary are collaborators behind the
//! [`CryptoLibrary`] and [`FipsModule`] traits; build-time configuration is
//! a [`BuildProfile`]. Every step reports through the `log` facade.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod entry;
mod error;
mod fips;
mod library;
mod lifecycle;
mod profile;
mod selftest;
mod status;

pub use error::{ActivationError, CleanupError, IntegrityError};
pub use fips::{FipsCallback, FipsEdition, FipsModule, NoFips, report_fips_failure};
pub use library::{CryptoLibrary, LibraryFlavor, SelfTestArgs};
pub use lifecycle::{ModuleLifecycle, ModuleState};
pub use profile::{BuildProfile, HostSleep, Pause};
pub use selftest::SelfTestFailure;
pub use status::{Errno, LibStatus};

#[doc(hidden)]
pub mod __private {
    pub use kernel_sync::SpinMutex;

    use crate::{BuildProfile, CryptoLibrary, ModuleLifecycle};
    use kernel_host::KernelSymbols;
    use module_redirect::{REDIRECT_TABLE, SymbolSources};

    /// The process-wide controller `module_entry!` installs.
    pub const fn lifecycle<L: CryptoLibrary>(
        library: L,
        symbols: KernelSymbols,
    ) -> ModuleLifecycle<'static, L> {
        ModuleLifecycle::new(
            library,
            BuildProfile::BUILD,
            &REDIRECT_TABLE,
            SymbolSources::new(symbols),
        )
    }
}
