//! Shortcut probes.
//!
//! Three independently enableable refinement steps that decide variables
//! without a dedicated solver call: the model filter, the flip probe, and
//! the root-fixed query. The filter consumes a fresh model; the flip probe
//! always runs after a filter sweep, never before one.

use crate::driver::{DropReason, Engine};
use crate::stats::{Stats, TimerKind};
use keel_base::{Result, Var};
use keel_oracle::Oracle;
use std::io::Write;
use tracing::trace;

impl<O: Oracle, W: Write> Engine<O, W> {
    /// Queries the root-fixed state of `v`'s candidate. Returns whether the
    /// variable was decided.
    pub(crate) fn probe_fixed(&mut self, v: Var) -> Result<bool> {
        match self.oracle.fixed(self.candidates.literal(v)) {
            1 => {
                Stats::inc(&self.stats.fixed_hits);
                self.classify_backbone(v)?;
                Ok(true)
            }
            -1 => {
                Stats::inc(&self.stats.fixed_hits);
                self.classify_dropped(v, DropReason::Fixed)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Drops every candidate in `start..=n` whose conjectured literal the
    /// last model falsifies. Requires the oracle in the post-SAT state; the
    /// model's witness was already dropped before entering.
    pub(crate) fn filter_tail(&mut self, start: Var) -> Result<()> {
        if !self.config.filter {
            return Ok(());
        }
        for w in start..=self.n {
            if self.candidates.is_candidate(w)
                && self.oracle.value(w) != self.candidates.literal(w)
            {
                trace!(w, "filtered");
                self.classify_dropped(w, DropReason::Filter)?;
            }
        }
        Ok(())
    }

    /// Tries to flip each remaining candidate out of the last model, in
    /// rounds: a successful flip mutates the model and may enable flips of
    /// earlier or later variables, so rounds repeat until one passes with
    /// no success.
    pub(crate) fn flip_tail(&mut self, start: Var) -> Result<()> {
        if !self.config.use_flip {
            return Ok(());
        }
        self.profiler.start(&self.stats, TimerKind::Flip);
        let outcome = self.flip_rounds(start);
        self.profiler.stop(&self.stats);
        outcome
    }

    fn flip_rounds(&mut self, start: Var) -> Result<()> {
        loop {
            let mut flipped_any = false;
            for w in start..=self.n {
                if self.candidates.is_candidate(w)
                    && self.oracle.flip(self.candidates.literal(w))
                {
                    trace!(w, "flipped");
                    self.classify_dropped(w, DropReason::Flip)?;
                    flipped_any = true;
                }
            }
            if !flipped_any {
                return Ok(());
            }
        }
    }
}
