//! # PIE redirect table
//!
//! Library code compiled as a position-independent image cannot call kernel
//! routines directly. It calls through a [`RedirectTable`] instead: one
//! word-sized slot per host primitive, filled in once during module
//! activation and read-only afterwards.
//!
//! Which slots exist is fixed by the layout; which of them must be filled
//! is decided by the build's [`Capabilities`]. [`build_into`] assigns every
//! in-scope slot, then checks each of them before publishing the table. A
//! table with an empty in-scope slot is never published.
//!
//! ```
//! use module_redirect::{Capabilities, SymbolSources, TableCell, build_into};
//!
//! static TABLE: TableCell = TableCell::new();
//!
//! let sources = SymbolSources::new(kernel_host::kernel_symbols());
//! let caps = Capabilities::NONE.with_mem_redirect(true);
//! let table = build_into(&TABLE, caps, &sources).unwrap();
//! assert!(table.memcpy.is_some());
//! assert!(table.strlen.is_none());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod calls;
mod capability;
mod error;
mod table;

pub use calls::{HostBox, HostCallError, HostCalls, HostMutexGuard};
pub use capability::{Capabilities, Capability};
pub use error::BuildError;
pub use table::{
    CertLookup, FipsMarkerFn, FipsMarkers, GetCaByNameFn, GetCaFn, REDIRECT_TABLE, RedirectTable,
    Slot, SymbolSources, TableCell, build_into, build_with, redirect_table,
};

#[cfg(any(feature = "hosted", feature = "linux"))]
pub use table::build;
