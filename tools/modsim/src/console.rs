use kernel_printk::{Console, KernLevel};
use std::io::Write;

/// Prints each line with its `<N>` marker, errors to stderr.
pub struct StdConsole;

impl Console for StdConsole {
    fn emit(&self, level: KernLevel, line: &str) {
        // A closed pipe must not abort the simulated unload.
        let _ = if level.is_error() {
            writeln!(std::io::stderr(), "{}{line}", level.prefix())
        } else {
            writeln!(std::io::stdout(), "{}{line}", level.prefix())
        };
    }
}
