use crate::LibraryFlavor;
use core::ffi::c_uint;
use core::time::Duration;
use kernel_host::abi::MsleepFn;
use module_redirect::Capabilities;

/// The build-time configuration the controller follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProfile {
    /// Build and publish the redirect table before anything else.
    pub pie_redirect: bool,
    /// Run FIPS integrity validation.
    pub integrity: bool,
    /// Run the self-test suite after library init.
    pub self_test: bool,
    pub flavor: LibraryFlavor,
    /// Redirect slots that must be populated.
    pub capabilities: Capabilities,
    /// Pause after a self-test failure so pending log output drains.
    pub flush_delay: Duration,
}

impl BuildProfile {
    pub const FLUSH_DELAY: Duration = Duration::from_millis(10);

    /// The profile selected by this build's cargo features.
    pub const BUILD: Self = Self {
        pie_redirect: cfg!(feature = "pie-redirect"),
        integrity: cfg!(feature = "fips"),
        self_test: cfg!(feature = "self-test"),
        flavor: LibraryFlavor::BUILD,
        capabilities: Capabilities::BUILD,
        flush_delay: Self::FLUSH_DELAY,
    };

    #[must_use]
    pub const fn with_pie_redirect(mut self, enabled: bool) -> Self {
        self.pie_redirect = enabled;
        self
    }

    #[must_use]
    pub const fn with_integrity(mut self, enabled: bool) -> Self {
        self.integrity = enabled;
        self
    }

    #[must_use]
    pub const fn with_self_test(mut self, enabled: bool) -> Self {
        self.self_test = enabled;
        self
    }

    #[must_use]
    pub const fn with_flavor(mut self, flavor: LibraryFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    #[must_use]
    pub const fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// A bounded, non-interruptible delay.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

impl<F: FnMut(Duration)> Pause for F {
    fn pause(&mut self, duration: Duration) {
        self(duration);
    }
}

/// Sleeps through the host's `msleep`.
#[derive(Clone, Copy)]
pub struct HostSleep(MsleepFn);

impl HostSleep {
    #[must_use]
    pub const fn new(msleep: MsleepFn) -> Self {
        Self(msleep)
    }
}

impl Pause for HostSleep {
    fn pause(&mut self, duration: Duration) {
        let ms = c_uint::try_from(duration.as_millis()).unwrap_or(c_uint::MAX);
        // SAFETY: msleep has no preconditions in process context.
        unsafe { (self.0)(ms) };
    }
}
