use crate::KernLevel;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use kernel_sync::SpinMutex;

/// Destination for formatted log lines.
pub trait Console: Sync {
    /// Emit one line. `line` carries no trailing newline.
    fn emit(&self, level: KernLevel, line: &str);
}

/// A line retained by [`MemoryConsole`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub level: KernLevel,
    pub text: String,
}

/// Console that keeps every emitted line in memory.
pub struct MemoryConsole {
    lines: SpinMutex<Vec<CapturedLine>>,
}

impl Default for MemoryConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConsole {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: SpinMutex::new(Vec::new()),
        }
    }

    /// Snapshot of all retained lines.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.with_lock(|lines| lines.clone())
    }

    /// Take all retained lines, leaving the console empty.
    pub fn drain(&self) -> Vec<CapturedLine> {
        self.lines.with_lock(core::mem::take)
    }

    /// Whether any retained line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .with_lock(|lines| lines.iter().any(|l| l.text.contains(needle)))
    }

    /// Number of retained lines at `level` or more severe.
    pub fn count_at_least(&self, level: KernLevel) -> usize {
        self.lines
            .with_lock(|lines| lines.iter().filter(|l| l.level <= level).count())
    }
}

impl Console for MemoryConsole {
    fn emit(&self, level: KernLevel, line: &str) {
        let text = line.to_string();
        self.lines
            .with_lock(|lines| lines.push(CapturedLine { level, text }));
    }
}
