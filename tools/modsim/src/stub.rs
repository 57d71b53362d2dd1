//! Stand-ins for the crypto library and its FIPS boundary.

use crate::options::{Integrity, Options};
use core::cmp::Ordering;
use core::ffi::c_int;
use kernel_host::abi::{GFP_KERNEL, GFP_ZERO};
use module_lifecycle::{
    CryptoLibrary, FipsCallback, FipsEdition, FipsModule, LibStatus, SelfTestArgs,
    SelfTestFailure,
};
use module_redirect::{FipsMarkers, HostCallError, RedirectTable, redirect_table};

const BAD_FUNC_ARG: LibStatus = LibStatus(-173);
const MEMORY_E: LibStatus = LibStatus(-125);
const FIPS_NOT_ALLOWED: LibStatus = LibStatus(-197);

fn describe(status: LibStatus) -> &'static str {
    match status {
        LibStatus::SUCCESS => "no error",
        LibStatus::IN_CORE_INTEGRITY => "In Core Integrity check failure",
        BAD_FUNC_ARG => "Bad function argument",
        MEMORY_E => "Out of memory error",
        FIPS_NOT_ALLOWED => "FIPS mode not allowed error",
        _ => "unknown error number",
    }
}

pub struct StubLibrary {
    fail_init: bool,
    fail_selftest: Option<i32>,
}

impl StubLibrary {
    pub const fn new(options: &Options) -> Self {
        Self {
            fail_init: options.fail_init,
            fail_selftest: options.fail_selftest,
        }
    }
}

impl CryptoLibrary for StubLibrary {
    fn name(&self) -> &str {
        "modsim-crypt"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn copyright(&self) -> &str {
        "Copyright (C) the modsim authors. Licensed under the EUPL-1.2."
    }

    fn init(&mut self, table: Option<&RedirectTable>) -> LibStatus {
        if self.fail_init {
            return BAD_FUNC_ARG;
        }

        // Touch the host through the table the way the real image would.
        if let Some(table) = table {
            let calls = table.calls();
            let Ok(mut scratch) = calls.alloc(64, GFP_KERNEL | GFP_ZERO) else {
                return MEMORY_E;
            };
            if calls.random_bytes(scratch.as_mut_slice()).is_err() {
                return BAD_FUNC_ARG;
            }
            log::debug!(
                "seeded {} bytes at t={}",
                scratch.len(),
                calls.real_seconds().unwrap_or_default()
            );
        }

        LibStatus::SUCCESS
    }

    fn cleanup(&mut self) -> LibStatus {
        LibStatus::SUCCESS
    }

    fn self_test(&mut self, _args: Option<&mut SelfTestArgs<'_>>) -> Result<(), SelfTestFailure> {
        if let Some(code) = self.fail_selftest {
            return SelfTestFailure::check(code);
        }

        let Some(table) = redirect_table() else {
            return Ok(());
        };
        known_answers(table)
    }

    fn error_string(&self, status: LibStatus) -> &str {
        describe(status)
    }
}

fn host_failure(line: u32, e: HostCallError) -> SelfTestFailure {
    match e {
        HostCallError::Errno(errno) => SelfTestFailure::with_error(line, errno),
        HostCallError::SlotMissing(slot) => {
            #[allow(clippy::cast_possible_truncation)]
            SelfTestFailure::with_value(line, slot.index() as u32)
        }
        HostCallError::OutOfMemory(_) => SelfTestFailure::at(line),
    }
}

/// A few checks through the redirected primitives.
fn known_answers(table: &RedirectTable) -> Result<(), SelfTestFailure> {
    let calls = table.calls();

    if table.memcmp.is_some() {
        let order = calls
            .compare(b"abc", b"abd")
            .map_err(|e| host_failure(line!(), e))?;
        if order != Ordering::Less {
            return Err(SelfTestFailure::at(line!()));
        }
    }

    let parsed = calls
        .parse_i64(c"0x2a", 0)
        .map_err(|e| host_failure(line!(), e))?;
    if parsed != 42 {
        return Err(SelfTestFailure::at(line!()));
    }

    if table.kernel_fpu_begin.is_some() {
        calls
            .fpu_section(|| ())
            .map_err(|e| host_failure(line!(), e))?;
    }

    Ok(())
}

unsafe extern "C" fn fips_first() -> c_int {
    0
}

unsafe extern "C" fn fips_last() -> c_int {
    0
}

pub struct StubFips {
    integrity: Integrity,
    callback: Option<FipsCallback>,
    status: LibStatus,
    core_hash: Option<String>,
}

impl StubFips {
    pub const fn new(options: &Options) -> Self {
        Self {
            integrity: options.integrity,
            callback: None,
            status: LibStatus::SUCCESS,
            core_hash: None,
        }
    }
}

impl FipsModule for StubFips {
    fn edition(&self) -> FipsEdition {
        FipsEdition::V140_3
    }

    fn set_failure_callback(&mut self, callback: FipsCallback) -> LibStatus {
        self.callback = Some(callback);
        LibStatus::SUCCESS
    }

    fn run_entry_validation(&mut self) {
        match self.integrity {
            Integrity::Pass => self.status = LibStatus::SUCCESS,
            Integrity::Fail => self.status = FIPS_NOT_ALLOWED,
            Integrity::InCoreMismatch => {
                self.status = LibStatus::IN_CORE_INTEGRITY;
                self.core_hash = Some(format!(
                    "{:016X}{:016X}",
                    RedirectTable::LAYOUT_FINGERPRINT,
                    !RedirectTable::LAYOUT_FINGERPRINT
                ));
            }
        }

        if let Some(callback) = self.callback {
            callback(
                self.status == LibStatus::SUCCESS,
                self.status,
                describe(self.status),
                self.core_hash.as_deref(),
            );
        }
    }

    fn status(&self) -> LibStatus {
        self.status
    }

    fn core_hash(&self) -> Option<&str> {
        self.core_hash.as_deref()
    }

    fn error_string(&self, status: LibStatus) -> &str {
        describe(status)
    }

    fn boundary_markers(&self) -> Option<FipsMarkers> {
        Some(FipsMarkers {
            first: fips_first,
            last: fips_last,
        })
    }
}
