use crate::Slot;

/// Why the redirect table could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// An in-scope slot is empty after population.
    #[error("redirect table incomplete: slot `{slot}` is empty")]
    Incomplete { slot: Slot },
    /// The consumer was compiled against a different table layout.
    #[error("redirect table layout mismatch: expected {expected:#018x}, have {actual:#018x}")]
    LayoutMismatch { expected: u64, actual: u64 },
    /// The process-wide table was already built.
    #[error("redirect table already built")]
    AlreadyBuilt,
    /// An earlier build failed; the table will never become valid.
    #[error("an earlier redirect table build failed")]
    Poisoned,
}
