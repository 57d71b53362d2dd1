//! # printk-style logging
//!
//! Routes the `log` facade into kernel-log-shaped lines. Every record becomes
//! one line with a kernel severity ([`KernLevel`]) and the text
//! `"target: message"`, formatted into a fixed stack buffer and handed to a
//! [`Console`]. Nothing on the logging path allocates.
//!
//! ```text
//! error!(..) / info!(..)
//!     ↓
//! PrintkLogger (log::Log)
//!     ↓
//! LineBuffer<1024> (core::fmt::Write, truncating)
//!     ↓
//! Console::emit(level, line)
//! ```
//!
//! The logger is installed once:
//!
//! ```rust,no_run
//! use kernel_printk::{MemoryConsole, PrintkLogger};
//! use log::LevelFilter;
//!
//! static CONSOLE: MemoryConsole = MemoryConsole::new();
//!
//! PrintkLogger::new(LevelFilter::Info, &CONSOLE)
//!     .init()
//!     .expect("logger installed twice");
//! log::info!("module loading");
//! ```
//!
//! [`MemoryConsole`] keeps the emitted lines around; it backs the log
//! assertions in tests and the output of the simulation tool.

#![cfg_attr(not(any(test, doctest)), no_std)]

extern crate alloc;

mod console;
mod level;
mod line;
mod logger;

pub use console::{CapturedLine, Console, MemoryConsole};
pub use level::KernLevel;
pub use line::{LOG_LINE_MAX, LineBuffer};
pub use logger::{PrintkInitError, PrintkLogger};
