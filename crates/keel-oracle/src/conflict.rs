//! First-UIP conflict analysis.

use crate::bcp::Assignment;
use crate::clause_db::ClauseDb;
use crate::decision::DecisionEngine;
use keel_base::{var, Lit};

/// Conflict analyzer with reusable scratch buffers.
#[derive(Debug, Default, Clone)]
pub struct ConflictAnalyzer {
    seen: Vec<bool>,
}

impl ConflictAnalyzer {
    /// Creates an analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the conflict clause back to the first unique implication
    /// point. Returns the learned clause (asserting literal first) and the
    /// backjump level.
    ///
    /// Requires `asg.decision_level() > 0` and every literal of the conflict
    /// clause false under `asg`.
    pub fn analyze(
        &mut self,
        db: &ClauseDb,
        asg: &Assignment,
        decision: &mut DecisionEngine,
        conflict: usize,
        minimize: bool,
    ) -> (Vec<Lit>, usize) {
        debug_assert!(asg.decision_level() > 0);
        self.seen.clear();
        self.seen.resize(asg.assigns.len(), false);

        let current = asg.decision_level() as u32;
        let mut lemma: Vec<Lit> = Vec::new();
        let mut active: u32 = 0;
        let mut reason_id = conflict;
        let mut index = asg.trail.len();

        loop {
            let clause = db.clause(reason_id);
            // In reason clauses the propagated literal sits at index 0.
            let start = usize::from(reason_id != conflict);
            for &q in &clause.lits[start..] {
                debug_assert_eq!(asg.value_lit(q), Some(false));
                let v = var(q) as usize;
                if !self.seen[v] && asg.level_of(var(q)) > 0 {
                    self.seen[v] = true;
                    decision.bump(var(q));
                    if asg.level_of(var(q)) < current {
                        lemma.push(q);
                    } else {
                        active += 1;
                    }
                }
            }

            loop {
                index -= 1;
                if self.seen[var(asg.trail[index]) as usize] {
                    break;
                }
            }
            let p = asg.trail[index];
            self.seen[var(p) as usize] = false;
            active -= 1;
            if active == 0 {
                lemma.insert(0, -p);
                break;
            }
            reason_id = asg
                .reason_of(var(p))
                .expect("literal on the resolution path has a reason");
        }

        if minimize && lemma.len() > 1 {
            let to_clear: Vec<Lit> = lemma.clone();
            let asserting = lemma[0];
            lemma.retain(|&lit| lit == asserting || !self.redundant(db, asg, lit));
            for lit in to_clear {
                self.seen[var(lit) as usize] = false;
            }
        } else {
            for &lit in &lemma {
                self.seen[var(lit) as usize] = false;
            }
        }

        let bt_level = if lemma.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            for i in 2..lemma.len() {
                if asg.level_of(var(lemma[i])) > asg.level_of(var(lemma[max_i])) {
                    max_i = i;
                }
            }
            lemma.swap(1, max_i);
            asg.level_of(var(lemma[1])) as usize
        };

        (lemma, bt_level)
    }

    /// Local (non-recursive) redundancy: a lemma literal is redundant when
    /// every other literal of its reason clause is already in the lemma or
    /// fixed at the root.
    fn redundant(&self, db: &ClauseDb, asg: &Assignment, lit: Lit) -> bool {
        match asg.reason_of(var(lit)) {
            None => false,
            Some(id) => db.clause(id).lits[1..]
                .iter()
                .all(|&x| self.seen[var(x) as usize] || asg.level_of(var(x)) == 0),
        }
    }
}
