//! # keel-oracle
//!
//! The incremental CNF oracle abstraction used by the backbone engine, plus
//! the bundled CDCL solver implementing it.
//!
//! The engine only ever talks to the [`Oracle`] trait: one-shot assumptions
//! and constraint clauses, model values after a satisfiable call, root-level
//! fixed-literal queries, optional cheap model flipping, and clause-level
//! duplication for the checker sidecar.

pub mod bcp;
pub mod clause_db;
pub mod conflict;
pub mod decision;
pub mod heuristics;
pub mod solver;

pub use solver::{CdclOracle, OracleStats};

use keel_base::{Lit, Var};
use keel_format::DimacsCnf;

/// Verdict of a single oracle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveResult {
    /// A model was found.
    Sat,
    /// No model exists under the given assumptions and constraint.
    Unsat,
}

impl SolveResult {
    /// The conventional SAT-competition exit code for this verdict.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Sat => 10,
            Self::Unsat => 20,
        }
    }
}

/// Capability set required from an incremental CNF solver.
///
/// Assumptions and the constraint clause are consumed by the next [`solve`];
/// the implementation resets them once the call returns.
///
/// [`solve`]: Oracle::solve
pub trait Oracle {
    /// Ensures variables `1..=n` exist.
    fn reserve(&mut self, n: Var);

    /// Adds a permanent clause.
    fn add_clause(&mut self, lits: &[Lit]);

    /// Adds one assumption for the next `solve` only.
    fn assume(&mut self, lit: Lit);

    /// Appends a literal to the one-shot constraint clause; `0` terminates
    /// it. The next `solve` requires the disjunction of pushed literals.
    fn constrain(&mut self, lit: Lit);

    /// Runs the solver until a decisive verdict.
    fn solve(&mut self) -> SolveResult;

    /// In the post-SAT state, returns `v`'s assignment in the last model as
    /// a literal with absolute value `v`.
    fn value(&self, v: Var) -> Lit;

    /// Returns `+1` if `lit` has been derived at the root, `-1` if its
    /// negation has, and `0` otherwise.
    fn fixed(&self, lit: Lit) -> i32;

    /// Whether [`flip`](Oracle::flip) is available.
    fn supports_flip(&self) -> bool {
        false
    }

    /// Attempts to flip the last model's value of `lit` without solving
    /// again. On success the stored model is mutated; on failure it is
    /// unchanged.
    fn flip(&mut self, lit: Lit) -> bool {
        let _ = lit;
        false
    }

    /// Biases the decision phase of `var(lit)` so that `lit` is preferred.
    fn phase(&mut self, lit: Lit);

    /// Produces a duplicate solver reflecting the current clause state.
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Sets a named option; returns whether the name is known.
    fn set_option(&mut self, name: &str, value: i64) -> bool;

    /// Sets the prefix used in the oracle's own log lines.
    fn set_prefix(&mut self, prefix: &str);

    /// Loads a parsed DIMACS formula and returns its variable count.
    fn load_dimacs(&mut self, cnf: &DimacsCnf) -> Var {
        self.reserve(cnf.num_vars);
        for clause in &cnf.clauses {
            self.add_clause(clause);
        }
        cnf.num_vars
    }
}
