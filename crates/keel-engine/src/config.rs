//! Engine configuration.

use keel_base::Verbosity;
use serde::{Deserialize, Serialize};

/// Configuration of a backbone-extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Message level on standard output.
    pub verbosity: Verbosity,
    /// Whether `b` lines are printed (statistics-only mode when false).
    pub print_backbones: bool,
    /// Forward the oracle's progress reports.
    pub report: bool,
    /// Print statistics even in quiet mode.
    pub always_print_statistics: bool,
    /// Verify every classification against a second oracle.
    pub check: bool,
    /// Drop candidates falsified by each fresh model.
    pub filter: bool,
    /// Query root-level fixed literals before solving.
    pub use_fixed: bool,
    /// Try to flip candidate values in the last model.
    pub use_flip: bool,
    /// Let the oracle simplify learned clauses.
    pub use_inprocessing: bool,
    /// Use the disjunctive constrain shortcut after unsatisfiable calls.
    pub use_constrain: bool,
    /// Bias decision phases against the remaining candidates.
    pub set_phase: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Default,
            print_backbones: true,
            report: false,
            always_print_statistics: false,
            check: false,
            filter: true,
            use_fixed: true,
            use_flip: true,
            use_inprocessing: true,
            use_constrain: true,
            set_phase: true,
        }
    }
}

impl EngineConfig {
    /// The `plain` preset: every optimization disabled.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            filter: false,
            use_fixed: false,
            use_flip: false,
            use_inprocessing: false,
            use_constrain: false,
            set_phase: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_disables_all_optimizations() {
        let plain = EngineConfig::plain();
        assert!(!plain.filter);
        assert!(!plain.use_fixed);
        assert!(!plain.use_flip);
        assert!(!plain.use_inprocessing);
        assert!(!plain.use_constrain);
        assert!(!plain.set_phase);
        assert!(plain.print_backbones);
    }
}
