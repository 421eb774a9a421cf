//! Message verbosity levels.

use serde::{Deserialize, Serialize};

/// How much the tool says on standard output.
///
/// `Verbose` carries a sub-level; everything above the first is forwarded to
/// the oracle as its own verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verbosity {
    /// No messages at all, not even statistics.
    Quiet,
    /// Normal comment lines.
    Default,
    /// Additional progress messages; the sub-level is forwarded to the oracle.
    Verbose(u8),
    /// Extensive per-step logging.
    Logging,
}

impl Verbosity {
    /// Returns whether any output is allowed.
    #[must_use]
    pub fn allows_messages(self) -> bool {
        self != Self::Quiet
    }

    /// Returns whether per-step logging is enabled.
    #[must_use]
    pub fn logging(self) -> bool {
        self == Self::Logging
    }

    /// The verbosity sub-level handed to the oracle (0 when not verbose).
    #[must_use]
    pub fn oracle_level(self) -> u8 {
        match self {
            Self::Verbose(level) => level.saturating_sub(1),
            Self::Logging => u8::MAX,
            _ => 0,
        }
    }
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Default
    }
}
