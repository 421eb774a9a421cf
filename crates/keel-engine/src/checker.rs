//! Checker sidecar.
//!
//! An optional second oracle, constructed as a clause-level copy of the
//! main one right after the first model. Every classification the driver
//! makes is replayed against it: a promoted literal must be unsatisfiable
//! to negate, a dropped candidate must be satisfiable to negate. The
//! checker never sees constrain clauses and keeps its own call tallies.

use crate::stats::{Profiler, Stats, TimerKind};
use keel_base::{Error, Lit, Result};
use keel_oracle::{Oracle, SolveResult};

/// Second-oracle verification of classifications.
#[derive(Debug)]
pub struct Checker<O: Oracle> {
    oracle: O,
    checked: u64,
}

impl<O: Oracle> Checker<O> {
    /// Wraps a copy of the main oracle.
    pub fn new(oracle: O) -> Self {
        Self { oracle, checked: 0 }
    }

    /// Number of classifications verified so far.
    #[must_use]
    pub fn checked(&self) -> u64 {
        self.checked
    }

    /// Verifies one classification: `backbone` tells whether `lit` was
    /// promoted or its variable dropped. Disagreement is fatal.
    pub fn verify(
        &mut self,
        lit: Lit,
        backbone: bool,
        stats: &Stats,
        profiler: &mut Profiler,
    ) -> Result<()> {
        self.oracle.assume(-lit);
        profiler.start(stats, TimerKind::Check);
        let result = self.oracle.solve();
        profiler.stop(stats);
        match result {
            SolveResult::Sat => Stats::inc(&stats.checker_sat),
            SolveResult::Unsat => Stats::inc(&stats.checker_unsat),
        }
        let agreed = match result {
            SolveResult::Unsat => backbone,
            SolveResult::Sat => !backbone,
        };
        if !agreed {
            let claim = if backbone { "backbone" } else { "dropped" };
            return Err(Error::Invariant(format!(
                "checker disagrees on {claim} literal {lit}"
            )));
        }
        self.checked += 1;
        Stats::inc(&stats.checked);
        Ok(())
    }
}
