use crate::abi::{TK_OFFS_REAL, TK_OFFS_TAI};
use core::ffi::c_int;
use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// TAI is ahead of UTC by the accumulated leap seconds.
const TAI_OFFSET_SECS: i64 = 37;
const NSEC_PER_SEC: i64 = 1_000_000_000;

static BOOT: OnceLock<Instant> = OnceLock::new();

fn since_epoch() -> core::time::Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

fn real_ns() -> i64 {
    i64::try_from(since_epoch().as_nanos()).unwrap_or(i64::MAX)
}

fn boot_ns() -> i64 {
    let boot = BOOT.get_or_init(Instant::now);
    i64::try_from(boot.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

pub unsafe extern "C" fn ktime_get_real_seconds() -> i64 {
    i64::try_from(since_epoch().as_secs()).unwrap_or(i64::MAX)
}

pub unsafe extern "C" fn ktime_get_with_offset(offset: c_int) -> i64 {
    match offset {
        TK_OFFS_REAL => real_ns(),
        TK_OFFS_TAI => real_ns().saturating_add(TAI_OFFSET_SECS * NSEC_PER_SEC),
        // TK_OFFS_BOOT; the simulated machine never suspends.
        _ => boot_ns(),
    }
}
