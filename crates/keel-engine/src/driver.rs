//! The driver loop.
//!
//! Walks variables in order and decides each one with the cheapest step
//! that applies: the root-fixed shortcut, the disjunctive constrain step
//! after an unsatisfiable call, or a one-by-one assumption. The filter and
//! flip probes pick off further candidates from every fresh model.

use crate::candidates::CandidateSet;
use crate::checker::Checker;
use crate::config::EngineConfig;
use crate::emit::Emitter;
use crate::stats::{Profiler, Stats, TimerKind};
use keel_base::{Error, Lit, Result, Var, Verbosity};
use keel_oracle::{Oracle, SolveResult};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Why a variable was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DropReason {
    /// Refuted by the model of its own assumption step.
    Assumption,
    /// The witness of a constrained model.
    Witness,
    /// Swept up by the model filter.
    Filter,
    /// Flipped out of the model.
    Flip,
    /// Root-level fixed against its candidate.
    Fixed,
}

/// Outcome of one constrain step.
enum ConstrainOutcome {
    /// The constrained call was unsatisfiable; the tail was promoted.
    AllBackbones,
    /// A model refuted at least one candidate; re-examine the variable.
    Refuted,
    /// Fewer than two candidates remain; use the one-by-one step.
    TooFew,
}

/// The backbone-extraction engine. Owns the oracle, the candidate set, and
/// the optional checker for the duration of a run.
pub struct Engine<O: Oracle, W: Write> {
    pub(crate) oracle: O,
    pub(crate) checker: Option<Checker<O>>,
    pub(crate) config: EngineConfig,
    pub(crate) stats: Arc<Stats>,
    pub(crate) profiler: Profiler,
    pub(crate) emitter: Emitter<W>,
    pub(crate) candidates: CandidateSet,
    pub(crate) n: Var,
    /// Outcome of the most recent solve; gates the constrain branch.
    last: SolveResult,
    /// Scratch storage for constrain-clause collection.
    scratch: Vec<Lit>,
}

impl<O: Oracle, W: Write> Engine<O, W> {
    /// Creates an engine over a loaded oracle with `n` variables.
    ///
    /// Fails with a capability error when an enabled optimization is not
    /// supported by the oracle.
    pub fn new(mut oracle: O, n: Var, config: EngineConfig, out: W) -> Result<Self> {
        if config.use_flip && !oracle.supports_flip() {
            return Err(Error::Capability(
                "flip requested but the oracle cannot flip model values".to_string(),
            ));
        }
        match config.verbosity {
            Verbosity::Quiet => {
                oracle.set_option("quiet", 1);
            }
            Verbosity::Default => {}
            Verbosity::Verbose(_) | Verbosity::Logging => {
                oracle.set_option("verbose", i64::from(config.verbosity.oracle_level()));
            }
        }
        if config.report {
            oracle.set_option("report", 1);
        }
        oracle.set_option("inprocessing", i64::from(config.use_inprocessing));
        oracle.set_prefix("c ");
        let emitter = Emitter::new(out, config.verbosity, config.print_backbones);
        Ok(Self {
            oracle,
            checker: None,
            config,
            stats: Arc::new(Stats::new()),
            profiler: Profiler::new(),
            emitter,
            candidates: CandidateSet::empty(),
            n,
            last: SolveResult::Sat,
            scratch: Vec::new(),
        })
    }

    /// The shared statistics block, e.g. for a signal handler.
    #[must_use]
    pub fn stats(&self) -> Arc<Stats> {
        Arc::clone(&self.stats)
    }

    /// Access to the emitter, e.g. for banner messages.
    pub fn emitter(&mut self) -> &mut Emitter<W> {
        &mut self.emitter
    }

    /// Consumes the engine and returns the output sink.
    pub fn into_output(self) -> W {
        self.emitter.into_inner()
    }

    /// Runs backbone extraction to completion and returns the overall
    /// verdict.
    pub fn run(&mut self) -> Result<SolveResult> {
        let first = self.solve_oracle();
        if first == SolveResult::Unsat {
            self.emitter.verdict(false)?;
            return Ok(SolveResult::Unsat);
        }
        self.emitter.msg("first model found, initializing candidates")?;
        let oracle = &self.oracle;
        self.candidates = CandidateSet::init_from_first_model(self.n, |v| oracle.value(v))?;
        if self.config.check {
            self.checker = Some(Checker::new(self.oracle.copy()));
        }
        self.last = SolveResult::Sat;

        let mut v: Var = 1;
        while v <= self.n {
            if !self.candidates.is_candidate(v) {
                v += 1;
                continue;
            }
            if self.config.use_fixed && self.probe_fixed(v)? {
                continue;
            }
            if self.config.use_constrain && self.last == SolveResult::Unsat {
                match self.constrain_step(v)? {
                    ConstrainOutcome::AllBackbones => break,
                    ConstrainOutcome::Refuted => continue,
                    ConstrainOutcome::TooFew => {}
                }
            }
            // The collection pass may have decided v itself.
            if self.candidates.is_candidate(v) {
                self.one_by_one(v)?;
            }
            v += 1;
        }

        if self.candidates.remaining() != 0 {
            return Err(Error::Invariant(format!(
                "{} candidates left undecided after the driver loop",
                self.candidates.remaining()
            )));
        }
        if let Some(checker) = &self.checker {
            if checker.checked() != self.n as u64 {
                return Err(Error::Invariant(format!(
                    "checker verified {} classifications for {} variables",
                    checker.checked(),
                    self.n
                )));
            }
        }
        self.emitter.terminator()?;
        self.emitter.verdict(true)?;
        Ok(SolveResult::Sat)
    }

    /// One timed main-oracle call, charged to the statistics buckets.
    pub(crate) fn solve_oracle(&mut self) -> SolveResult {
        self.stats.begin_call();
        self.profiler.start(&self.stats, TimerKind::Solve);
        let result = self.oracle.solve();
        let delta = self.profiler.stop(&self.stats);
        self.stats.record_solve(delta, result == SolveResult::Sat);
        result
    }

    /// Decides `v` with a single assumption.
    fn one_by_one(&mut self, v: Var) -> Result<()> {
        let lit = self.candidates.literal(v);
        if self.config.set_phase {
            // Bias the next model against the remaining candidates so the
            // filter sweep refutes as many as possible.
            for w in (v + 1)..=self.n {
                if self.candidates.is_candidate(w) {
                    self.oracle.phase(-self.candidates.literal(w));
                }
            }
        }
        debug!(v, lit, "assumption step");
        self.oracle.assume(-lit);
        let result = self.solve_oracle();
        self.last = result;
        match result {
            SolveResult::Unsat => self.classify_backbone(v),
            SolveResult::Sat => {
                self.classify_dropped(v, DropReason::Assumption)?;
                self.filter_tail(v + 1)?;
                self.flip_tail(v + 1)
            }
        }
    }

    /// Tries to refute all remaining candidates at once with a constrain
    /// clause of their negations.
    fn constrain_step(&mut self, v: Var) -> Result<ConstrainOutcome> {
        self.scratch.clear();
        for w in v..=self.n {
            if !self.candidates.is_candidate(w) {
                continue;
            }
            if self.config.use_fixed {
                match self.oracle.fixed(self.candidates.literal(w)) {
                    1 => {
                        Stats::inc(&self.stats.fixed_hits);
                        self.classify_backbone(w)?;
                        continue;
                    }
                    -1 => {
                        Stats::inc(&self.stats.fixed_hits);
                        self.classify_dropped(w, DropReason::Fixed)?;
                        continue;
                    }
                    _ => {}
                }
            }
            let lit = self.candidates.literal(w);
            self.scratch.push(-lit);
        }
        if self.scratch.len() < 2 {
            return Ok(ConstrainOutcome::TooFew);
        }

        debug!(v, collected = self.scratch.len(), "constrain step");
        for i in 0..self.scratch.len() {
            self.oracle.constrain(self.scratch[i]);
        }
        self.oracle.constrain(0);
        let result = self.solve_oracle();
        self.last = result;

        if result == SolveResult::Unsat {
            // No model falsifies any remaining candidate: all backbones.
            for w in v..=self.n {
                if self.candidates.is_candidate(w) {
                    self.classify_backbone(w)?;
                }
            }
            return Ok(ConstrainOutcome::AllBackbones);
        }

        let witness = (v..=self.n)
            .find(|&w| {
                self.candidates.is_candidate(w)
                    && self.oracle.value(w) != self.candidates.literal(w)
            })
            .ok_or_else(|| {
                Error::Invariant("constrained model refutes no candidate".to_string())
            })?;
        self.classify_dropped(witness, DropReason::Witness)?;
        self.filter_tail(witness + 1)?;
        self.flip_tail(v)?;
        Ok(ConstrainOutcome::Refuted)
    }

    /// Confirms `v`'s candidate as backbone: emits, counts, and checks.
    pub(crate) fn classify_backbone(&mut self, v: Var) -> Result<()> {
        let lit = self.candidates.literal(v);
        debug!(v, lit, "backbone");
        self.candidates.promote(v);
        Stats::inc(&self.stats.backbones);
        self.emitter.backbone(lit)?;
        if let Some(checker) = self.checker.as_mut() {
            checker.verify(lit, true, &self.stats, &mut self.profiler)?;
        }
        Ok(())
    }

    /// Records that a model (or a root-level result) refuted `v`'s
    /// candidate.
    pub(crate) fn classify_dropped(&mut self, v: Var, reason: DropReason) -> Result<()> {
        let lit = self.candidates.literal(v);
        debug!(v, lit, ?reason, "dropped");
        self.candidates.drop_var(v);
        Stats::inc(&self.stats.dropped);
        match reason {
            DropReason::Filter => Stats::inc(&self.stats.filtered),
            DropReason::Flip => Stats::inc(&self.stats.flipped),
            DropReason::Assumption | DropReason::Witness | DropReason::Fixed => {}
        }
        if let Some(checker) = self.checker.as_mut() {
            checker.verify(lit, false, &self.stats, &mut self.profiler)?;
        }
        Ok(())
    }
}
