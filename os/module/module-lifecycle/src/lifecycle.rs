use crate::fips::report_fips_failure;
use crate::{
    ActivationError, BuildProfile, CleanupError, CryptoLibrary, FipsModule, HostSleep,
    IntegrityError, LibStatus, NoFips, Pause,
};
use alloc::string::String;
use log::{error, info, warn};
use module_redirect::{RedirectTable, SymbolSources, TableCell, build_into};

/// Where the module is in its load/unload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    Unloaded,
    TableBuilding,
    IntegrityChecking,
    LibraryInitializing,
    SelfTesting,
    Active,
    Deactivating,
    /// Activation failed; only [`ModuleLifecycle::deactivate`] remains.
    Failed,
}

/// Drives module activation and deactivation.
///
/// Activation runs, each step gated on the previous one:
///
/// 1. build and publish the redirect table (if PIE redirection is built in),
/// 2. FIPS integrity validation (if built in),
/// 3. library init,
/// 4. the self-test suite (if built in); a failure undoes step 3,
/// 5. the ready banner.
///
/// Nothing is retried. Deactivation runs library cleanup exactly once and
/// never fails.
pub struct ModuleLifecycle<'t, L, F = NoFips, P = HostSleep> {
    library: L,
    fips: Option<F>,
    profile: BuildProfile,
    table: &'t TableCell,
    sources: SymbolSources,
    pause: P,
    state: ModuleState,
}

impl<'t, L: CryptoLibrary> ModuleLifecycle<'t, L> {
    /// A controller that publishes its table into `table` and pauses with
    /// the host's `msleep`.
    pub const fn new(
        library: L,
        profile: BuildProfile,
        table: &'t TableCell,
        sources: SymbolSources,
    ) -> Self {
        Self {
            library,
            fips: None,
            profile,
            table,
            pause: HostSleep::new(sources.kernel.msleep),
            sources,
            state: ModuleState::Unloaded,
        }
    }
}

impl<'t, L, F, P> ModuleLifecycle<'t, L, F, P>
where
    L: CryptoLibrary,
    F: FipsModule,
    P: Pause,
{
    /// Attach the FIPS module that integrity validation runs against.
    pub fn with_fips<G: FipsModule>(self, fips: G) -> ModuleLifecycle<'t, L, G, P> {
        ModuleLifecycle {
            library: self.library,
            fips: Some(fips),
            profile: self.profile,
            table: self.table,
            sources: self.sources,
            pause: self.pause,
            state: self.state,
        }
    }

    /// Replace the post-failure pause.
    pub fn with_pause<Q: Pause>(self, pause: Q) -> ModuleLifecycle<'t, L, F, Q> {
        ModuleLifecycle {
            library: self.library,
            fips: self.fips,
            profile: self.profile,
            table: self.table,
            sources: self.sources,
            pause,
            state: self.state,
        }
    }

    pub const fn state(&self) -> ModuleState {
        self.state
    }

    pub const fn profile(&self) -> &BuildProfile {
        &self.profile
    }

    pub const fn library(&self) -> &L {
        &self.library
    }

    pub const fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }

    pub const fn fips(&self) -> Option<&F> {
        self.fips.as_ref()
    }

    /// The published redirect table, once built.
    pub fn table(&self) -> Option<&'t RedirectTable> {
        self.table.get()
    }

    /// Bring the module up.
    ///
    /// # Errors
    /// The first failing step. [`ActivationError::host_code`] is the value
    /// to hand back to the loader.
    pub fn activate(&mut self) -> Result<(), ActivationError> {
        if self.state != ModuleState::Unloaded {
            return Err(ActivationError::NotUnloaded(self.state));
        }

        match self.run_activation() {
            Ok(()) => {
                self.state = ModuleState::Active;
                Ok(())
            }
            Err(e) => {
                self.state = ModuleState::Failed;
                Err(e)
            }
        }
    }

    /// Tear the module down. Cleanup failures are logged and swallowed.
    pub fn deactivate(&mut self) {
        self.state = ModuleState::Deactivating;
        if self.cleanup_library().is_err() {
            warn!("unloading {} despite cleanup failure", self.library.name());
        }
        self.state = ModuleState::Unloaded;
    }

    fn run_activation(&mut self) -> Result<(), ActivationError> {
        let table = if self.profile.pie_redirect {
            self.state = ModuleState::TableBuilding;
            Some(self.build_table()?)
        } else {
            None
        };

        if self.profile.integrity {
            self.state = ModuleState::IntegrityChecking;
            self.verify_integrity()?;
        }

        self.state = ModuleState::LibraryInitializing;
        self.init_library(table)?;

        if self.profile.self_test {
            self.state = ModuleState::SelfTesting;
            self.run_self_test()?;
        }

        let (name, version) = (self.library.name(), self.library.version());
        match self.library.homepage() {
            Some(url) => info!("{name} {version} loaded. See {url} for information."),
            None => info!("{name} {version} loaded."),
        }
        info!("{}", self.library.copyright());
        Ok(())
    }

    fn build_table(&self) -> Result<&'t RedirectTable, ActivationError> {
        let mut sources = self.sources;
        if let Some(markers) = self.fips.as_ref().and_then(FipsModule::boundary_markers) {
            sources.fips = Some(markers);
        }
        if let Some(lookup) = self.library.cert_lookup() {
            sources.certs = Some(lookup);
        }

        Ok(build_into(self.table, self.profile.capabilities, &sources)?)
    }

    fn verify_integrity(&mut self) -> Result<(), IntegrityError> {
        let Some(fips) = self.fips.as_mut() else {
            error!("FIPS validation is required but no FIPS module is attached");
            return Err(IntegrityError::Unavailable);
        };

        let status = fips.set_failure_callback(report_fips_failure);
        if status != LibStatus::SUCCESS {
            error!(
                "registering the FIPS failure callback failed: {}",
                self.library.error_string(status)
            );
            return Err(IntegrityError::CallbackRegistration(status));
        }

        fips.run_entry_validation();

        let status = fips.status();
        if status != LibStatus::SUCCESS {
            error!(
                "FIPS status check failed: {}",
                self.library.error_string(status)
            );

            if status == LibStatus::IN_CORE_INTEGRITY {
                let computed_hash = fips.core_hash().map(String::from);
                error!(
                    "Update the expected core hash with \"{}\" and rebuild.",
                    computed_hash.as_deref().unwrap_or("<null>")
                );
                return Err(IntegrityError::InCoreHashMismatch {
                    status,
                    computed_hash,
                });
            }

            return Err(IntegrityError::Validation(status));
        }

        info!(
            "{} FIPS [{}] POST succeeded.",
            self.library.name(),
            fips.edition().label()
        );
        Ok(())
    }

    fn init_library(&mut self, table: Option<&RedirectTable>) -> Result<(), ActivationError> {
        let status = self.library.init(table);
        if status == self.profile.flavor.success() {
            return Ok(());
        }

        error!(
            "{} init failed: {}",
            self.library.name(),
            self.library.error_string(status)
        );
        Err(ActivationError::LibraryInit(status))
    }

    fn run_self_test(&mut self) -> Result<(), ActivationError> {
        match self.library.self_test(None) {
            Ok(()) => {
                info!("{} self-test passed.", self.library.name());
                Ok(())
            }
            Err(failure) => {
                error!(
                    "{} self-test failed with return code {}.",
                    self.library.name(),
                    failure.encode()
                );
                // The library is already initialized; undo that before failing.
                let _ = self.cleanup_library();
                self.pause.pause(self.profile.flush_delay);
                Err(failure.into())
            }
        }
    }

    fn cleanup_library(&mut self) -> Result<(), CleanupError> {
        let status = self.library.cleanup();
        if status == self.profile.flavor.success() {
            info!(
                "{} {} cleanup complete.",
                self.library.name(),
                self.library.version()
            );
            Ok(())
        } else {
            error!(
                "{} cleanup failed: {}",
                self.library.name(),
                self.library.error_string(status)
            );
            Err(CleanupError(status))
        }
    }
}
