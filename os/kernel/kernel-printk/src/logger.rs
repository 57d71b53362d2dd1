use crate::{Console, KernLevel, LineBuffer};
use core::fmt::Write;
use kernel_sync::WriteOnce;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: WriteOnce<PrintkLogger> = WriteOnce::new();

#[derive(Debug, thiserror::Error)]
pub enum PrintkInitError {
    #[error("a printk logger is already installed")]
    AlreadyInstalled,
    #[error("failed to register with the log facade: {0}")]
    SetLogger(SetLoggerError),
}

pub struct PrintkLogger {
    max_level: LevelFilter,
    console: &'static dyn Console,
}

impl PrintkLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, console: &'static dyn Console) -> Self {
        Self { max_level, console }
    }

    /// Call this once during early init.
    ///
    /// # Errors
    /// Fails if a printk logger (or any other `log` backend) is already set.
    pub fn init(self) -> Result<(), PrintkInitError> {
        let max_level = self.max_level;
        let logger = LOGGER
            .write(self)
            .map_err(|_| PrintkInitError::AlreadyInstalled)?;

        log::set_logger(logger).map_err(PrintkInitError::SetLogger)?;
        log::set_max_level(max_level);
        Ok(())
    }

    /// Format a record into a single console line.
    fn format(record: &Record<'_>) -> LineBuffer {
        let mut line = LineBuffer::new();
        // Ignore errors; LineBuffer truncates instead of failing.
        let _ = write!(line, "{}: {}", record.target(), record.args());
        line.trim_newlines();
        line
    }
}

impl Log for PrintkLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format(record);
        self.console
            .emit(KernLevel::from(record.level()), line.as_str());
    }

    fn flush(&self) {
        // Lines are handed over synchronously.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryConsole;
    use log::Level;

    fn record_at(level: Level, console: &'static MemoryConsole, max: LevelFilter) {
        let logger = PrintkLogger::new(max, console);
        logger.log(
            &Record::builder()
                .level(level)
                .target("cryptokm")
                .args(format_args!("self-test passed.\n"))
                .build(),
        );
    }

    #[test]
    fn lines_carry_target_and_kernel_level() {
        static CONSOLE: MemoryConsole = MemoryConsole::new();
        record_at(Level::Info, &CONSOLE, LevelFilter::Info);

        let lines = CONSOLE.drain();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, KernLevel::Info);
        assert_eq!(lines[0].text, "cryptokm: self-test passed.");
    }

    #[test]
    fn records_above_max_level_are_dropped() {
        static CONSOLE: MemoryConsole = MemoryConsole::new();
        record_at(Level::Debug, &CONSOLE, LevelFilter::Info);
        record_at(Level::Error, &CONSOLE, LevelFilter::Info);

        let lines = CONSOLE.drain();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, KernLevel::Err);
        assert!(lines[0].level.is_error());
    }

    #[test]
    fn warn_maps_to_kern_warning() {
        assert_eq!(KernLevel::from(Level::Warn).prefix(), "<4>");
        assert_eq!(KernLevel::from(Level::Trace), KernLevel::Debug);
    }
}
