//! # Module synchronization primitives
//!
//! The module runtime only needs two things from a synchronization layer:
//!
//! * [`WriteOnce`], a cell that is written exactly once during activation and
//!   read-only afterwards. A failed write poisons the cell permanently, so a
//!   half-built value can never be observed.
//! * [`RawMutex`], a single machine word with the shape of a kernel
//!   `struct mutex`. The host mutex primitives handed to PIE code operate on
//!   it through raw pointers; [`SpinMutex`] wraps it for Rust callers.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod raw_mutex;
mod spin_mutex;
mod write_once;

pub use raw_mutex::RawMutex;
pub use spin_mutex::{SpinMutex, SpinMutexGuard};
pub use write_once::{WriteOnce, WriteOnceError};
