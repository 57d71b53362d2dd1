#![allow(dead_code)]

use kernel_printk::{MemoryConsole, PrintkLogger};
use log::LevelFilter;
use module_lifecycle::{
    BuildProfile, CryptoLibrary, FipsCallback, FipsEdition, FipsModule, LibStatus, LibraryFlavor,
    SelfTestArgs, SelfTestFailure,
};
use module_redirect::{Capabilities, Capability, FipsMarkers, RedirectTable};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};

pub static CONSOLE: MemoryConsole = MemoryConsole::new();
static LOG_LOCK: Mutex<()> = Mutex::new(());
static INSTALL: Once = Once::new();

/// Exclusive use of the captured log, starting empty.
pub fn capture_log() -> MutexGuard<'static, ()> {
    INSTALL.call_once(|| {
        PrintkLogger::new(LevelFilter::Debug, &CONSOLE)
            .init()
            .expect("logger is installed once per test binary");
    });
    let guard = LOG_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    CONSOLE.drain();
    guard
}

/// Everything on, FIPS boundary and certificate slots off.
pub fn profile() -> BuildProfile {
    BuildProfile::BUILD
        .with_pie_redirect(true)
        .with_integrity(true)
        .with_self_test(true)
        .with_flavor(LibraryFlavor::CryptoOnly)
        .with_capabilities(
            Capabilities::ALL
                .with(Capability::FipsBoundary, false)
                .with(Capability::CertLookup, false),
        )
}

#[derive(Debug)]
pub struct MockLibrary {
    pub init_calls: usize,
    pub cleanup_calls: usize,
    pub self_test_calls: usize,
    pub init_status: LibStatus,
    pub cleanup_status: LibStatus,
    pub self_test_result: Result<(), SelfTestFailure>,
    pub saw_table: Option<bool>,
    pub homepage: Option<&'static str>,
}

impl MockLibrary {
    pub const fn new() -> Self {
        Self {
            init_calls: 0,
            cleanup_calls: 0,
            self_test_calls: 0,
            init_status: LibStatus::SUCCESS,
            cleanup_status: LibStatus::SUCCESS,
            self_test_result: Ok(()),
            saw_table: None,
            homepage: None,
        }
    }

    pub const fn protocol() -> Self {
        let mut lib = Self::new();
        lib.init_status = LibStatus::PROTOCOL_SUCCESS;
        lib.cleanup_status = LibStatus::PROTOCOL_SUCCESS;
        lib
    }
}

impl CryptoLibrary for MockLibrary {
    fn name(&self) -> &str {
        "mockcrypt"
    }

    fn version(&self) -> &str {
        "5.7.2"
    }

    fn copyright(&self) -> &str {
        "Copyright (C) 2006-2024 Mock Crypto Inc. All Rights Reserved."
    }

    fn homepage(&self) -> Option<&str> {
        self.homepage
    }

    fn init(&mut self, table: Option<&RedirectTable>) -> LibStatus {
        self.init_calls += 1;
        self.saw_table = Some(table.is_some());
        self.init_status
    }

    fn cleanup(&mut self) -> LibStatus {
        self.cleanup_calls += 1;
        self.cleanup_status
    }

    fn self_test(&mut self, _args: Option<&mut SelfTestArgs<'_>>) -> Result<(), SelfTestFailure> {
        self.self_test_calls += 1;
        self.self_test_result
    }

    fn error_string(&self, status: LibStatus) -> &str {
        describe(status)
    }
}

fn describe(status: LibStatus) -> &'static str {
    match status.code() {
        -203 => "In Core Integrity check failure",
        -173 => "Bad function argument",
        _ => "unknown error number",
    }
}

unsafe extern "C" fn fips_first() -> core::ffi::c_int {
    0
}

unsafe extern "C" fn fips_last() -> core::ffi::c_int {
    0
}

#[derive(Debug)]
pub struct MockFips {
    pub edition: FipsEdition,
    pub callback_status: LibStatus,
    pub status: LibStatus,
    pub hash: Option<&'static str>,
    pub markers: bool,
    pub validation_runs: usize,
    callback: Option<FipsCallback>,
}

impl MockFips {
    pub const fn new() -> Self {
        Self {
            edition: FipsEdition::V140_3,
            callback_status: LibStatus::SUCCESS,
            status: LibStatus::SUCCESS,
            hash: None,
            markers: false,
            validation_runs: 0,
            callback: None,
        }
    }

    pub const fn failing(status: LibStatus, hash: Option<&'static str>) -> Self {
        let mut fips = Self::new();
        fips.status = status;
        fips.hash = hash;
        fips
    }
}

impl FipsModule for MockFips {
    fn edition(&self) -> FipsEdition {
        self.edition
    }

    fn set_failure_callback(&mut self, callback: FipsCallback) -> LibStatus {
        if self.callback_status == LibStatus::SUCCESS {
            self.callback = Some(callback);
        }
        self.callback_status
    }

    fn run_entry_validation(&mut self) {
        self.validation_runs += 1;
        if let Some(callback) = self.callback {
            callback(
                self.status == LibStatus::SUCCESS,
                self.status,
                describe(self.status),
                self.hash,
            );
        }
    }

    fn status(&self) -> LibStatus {
        self.status
    }

    fn core_hash(&self) -> Option<&str> {
        self.hash
    }

    fn error_string(&self, status: LibStatus) -> &str {
        describe(status)
    }

    fn boundary_markers(&self) -> Option<FipsMarkers> {
        self.markers.then_some(FipsMarkers {
            first: fips_first,
            last: fips_last,
        })
    }
}
