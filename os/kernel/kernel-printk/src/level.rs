use core::fmt;
use log::Level;

/// Kernel log severities, numbered as in `<linux/kern_levels.h>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KernLevel {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl KernLevel {
    /// The `<N>` marker printk expects at the start of a line.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Emerg => "<0>",
            Self::Alert => "<1>",
            Self::Crit => "<2>",
            Self::Err => "<3>",
            Self::Warning => "<4>",
            Self::Notice => "<5>",
            Self::Info => "<6>",
            Self::Debug => "<7>",
        }
    }

    #[must_use]
    pub const fn is_error(self) -> bool {
        (self as u8) <= (Self::Err as u8)
    }
}

impl From<Level> for KernLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => Self::Err,
            Level::Warn => Self::Warning,
            Level::Info => Self::Info,
            Level::Debug | Level::Trace => Self::Debug,
        }
    }
}

impl fmt::Display for KernLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
