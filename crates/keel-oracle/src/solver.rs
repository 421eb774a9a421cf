//! The bundled incremental CDCL oracle.
//!
//! A MiniSat-family solver: watched-literal propagation, first-UIP clause
//! learning, activity-ordered decisions with phase saving, Luby restarts,
//! and assumption handling that places one assumption per decision level.
//!
//! One-shot constraint clauses are realized with a fresh activation
//! variable: the clause `(C or -z)` is added permanently, `z` is assumed
//! for the call, and the unit `-z` is added afterwards, so clauses learned
//! while the constraint was active stay sound for later calls. Activation
//! variables live above the external variable range and are never visible
//! to callers.

use crate::bcp::{Assignment, Watch, WatchTable};
use crate::clause_db::{ClauseDb, OccTable};
use crate::conflict::ConflictAnalyzer;
use crate::decision::DecisionEngine;
use crate::{Oracle, SolveResult};
use keel_base::{is_pos, var, Lit, Var};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Restart interval base (conflicts), scaled by the Luby sequence.
const RESTART_BASE: f64 = 100.0;

/// Option names the oracle recognizes.
const KNOWN_OPTIONS: &[&str] = &[
    "quiet",
    "verbose",
    "report",
    "phase",
    "inprocessing",
    "seed",
];

/// Counters kept by the bundled oracle.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleStats {
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of conflicts encountered.
    pub conflicts: u64,
    /// Number of propagated literals.
    pub propagations: u64,
    /// Number of restarts.
    pub restarts: u64,
}

/// The bundled CDCL solver.
#[derive(Debug, Clone)]
pub struct CdclOracle {
    /// Variable count visible to callers.
    external_vars: Var,
    /// Total variables including activation variables.
    internal_vars: Var,
    /// False once a root-level conflict proved the formula unsatisfiable.
    ok: bool,
    asg: Assignment,
    watches: WatchTable,
    db: ClauseDb,
    occs: OccTable,
    decision: DecisionEngine,
    analyzer: ConflictAnalyzer,
    /// Last model, `+1`/`-1` per variable (index 0 unused); empty before
    /// the first satisfiable call.
    model: Vec<i8>,
    assumptions: Vec<Lit>,
    constraint: Vec<Lit>,
    options: FxHashMap<String, i64>,
    prefix: String,
    stats: OracleStats,
}

impl Default for CdclOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl CdclOracle {
    /// Creates an empty solver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            external_vars: 0,
            internal_vars: 0,
            ok: true,
            asg: Assignment::new(),
            watches: WatchTable::new(),
            db: ClauseDb::new(),
            occs: OccTable::new(),
            decision: DecisionEngine::new(0),
            analyzer: ConflictAnalyzer::new(),
            model: Vec::new(),
            assumptions: Vec::new(),
            constraint: Vec::new(),
            options: FxHashMap::default(),
            prefix: String::from("c "),
            stats: OracleStats::default(),
        }
    }

    /// Returns the solver's counters.
    #[must_use]
    pub fn stats(&self) -> &OracleStats {
        &self.stats
    }

    /// Returns the number of stored clauses (original and learned).
    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.db.len()
    }

    fn option(&self, name: &str, default: i64) -> i64 {
        self.options.get(name).copied().unwrap_or(default)
    }

    fn minimize_learned(&self) -> bool {
        self.option("inprocessing", 1) != 0
    }

    fn new_var(&mut self) -> Var {
        self.internal_vars += 1;
        self.asg.push_var();
        self.decision.push_var();
        self.watches.grow(self.internal_vars as usize);
        self.occs.grow(self.internal_vars as usize);
        self.internal_vars
    }

    fn grow_to(&mut self, v: Var) {
        while self.internal_vars < v {
            self.new_var();
        }
    }

    /// Adds a permanent clause, simplifying against the root assignment.
    fn add_clause_permanent(&mut self, lits: &[Lit]) {
        debug_assert_eq!(self.asg.decision_level(), 0);
        for &l in lits {
            self.grow_to(var(l));
        }
        if !self.ok {
            return;
        }

        let mut sorted: Vec<Lit> = lits.to_vec();
        sorted.sort_unstable_by_key(|&l| (var(l), is_pos(l)));
        sorted.dedup();
        if sorted.windows(2).any(|w| w[0] == -w[1]) {
            return; // tautology
        }

        let mut reduced = Vec::with_capacity(sorted.len());
        for &l in &sorted {
            match self.asg.value_lit(l) {
                Some(true) => return, // satisfied at the root
                Some(false) => {}
                None => reduced.push(l),
            }
        }

        match reduced.len() {
            0 => {
                debug!(prefix = %self.prefix, "empty clause, formula unsatisfiable");
                self.ok = false;
            }
            1 => {
                self.asg.enqueue(reduced[0], None);
                if self.propagate().is_some() {
                    debug!(prefix = %self.prefix, "root conflict, formula unsatisfiable");
                    self.ok = false;
                }
            }
            _ => {
                let id = self.db.add_original(reduced.clone());
                self.watches.add(reduced[0], id, reduced[1]);
                self.watches.add(reduced[1], id, reduced[0]);
                for &l in &reduced {
                    self.occs.add(l, id);
                }
            }
        }
    }

    /// Propagates all queued literals; returns a conflict clause id if one
    /// arises.
    fn propagate(&mut self) -> Option<usize> {
        let mut conflict = None;
        while let Some(p) = self.asg.next_propagation() {
            self.stats.propagations += 1;
            let false_lit = -p;
            let ws = self.watches.take(false_lit);
            let mut kept = Vec::with_capacity(ws.len());
            let mut i = 0;
            while i < ws.len() {
                let Watch { clause_id, blocker } = ws[i];
                i += 1;

                // Try to avoid inspecting the clause.
                if self.asg.value_lit(blocker) == Some(true) {
                    kept.push(Watch { clause_id, blocker });
                    continue;
                }

                let clause = self.db.clause_mut(clause_id);
                if clause.lits[0] == false_lit {
                    clause.lits.swap(0, 1);
                }
                debug_assert_eq!(clause.lits[1], false_lit);
                let first = clause.lits[0];
                if first != blocker && self.asg.value_lit(first) == Some(true) {
                    kept.push(Watch {
                        clause_id,
                        blocker: first,
                    });
                    continue;
                }

                // Look for a replacement watch.
                let mut replaced = false;
                for k in 2..clause.lits.len() {
                    let other = clause.lits[k];
                    if self.asg.value_lit(other) != Some(false) {
                        clause.lits[1] = other;
                        clause.lits[k] = false_lit;
                        self.watches.add(other, clause_id, first);
                        replaced = true;
                        break;
                    }
                }
                if replaced {
                    continue;
                }

                // Unit or conflicting.
                kept.push(Watch {
                    clause_id,
                    blocker: first,
                });
                if self.asg.value_lit(first) == Some(false) {
                    conflict = Some(clause_id);
                    self.asg.freeze_queue();
                    kept.extend_from_slice(&ws[i..]);
                    i = ws.len();
                } else {
                    self.asg.enqueue(first, Some(clause_id));
                }
            }
            self.watches.put(false_lit, kept);
            if conflict.is_some() {
                break;
            }
        }
        conflict
    }

    fn backtrack(&mut self, level: usize) {
        if self.asg.decision_level() <= level {
            return;
        }
        let lim = self.asg.trail_lim[level];
        for k in (lim..self.asg.trail.len()).rev() {
            let lit = self.asg.trail[k];
            let v = var(lit);
            self.asg.unassign(v);
            self.decision.save_phase(v, is_pos(lit));
            self.decision.insert(v);
        }
        self.asg.trail.truncate(lim);
        self.asg.trail_lim.truncate(level);
        self.asg.qhead = lim;
    }

    fn extract_model(&mut self) {
        self.model = vec![0; self.internal_vars as usize + 1];
        for v in 1..=self.internal_vars {
            let value = self
                .asg
                .value_var(v)
                .expect("every variable is assigned in the SAT state");
            self.model[v as usize] = if value { 1 } else { -1 };
        }
    }

    fn model_satisfies(&self, lit: Lit) -> bool {
        let m = self.model[var(lit) as usize];
        if lit > 0 {
            m > 0
        } else {
            m < 0
        }
    }

    /// CDCL search under the given assumptions.
    fn search(&mut self, assumps: &[Lit]) -> SolveResult {
        let mut restart_seq: u32 = 0;
        let mut conflicts_here: u64 = 0;
        let mut restart_limit = RESTART_BASE * luby(2.0, restart_seq);

        loop {
            if let Some(conflict) = self.propagate() {
                self.stats.conflicts += 1;
                conflicts_here += 1;
                if self.asg.decision_level() == 0 {
                    self.ok = false;
                    return SolveResult::Unsat;
                }
                let minimize = self.minimize_learned();
                let (lemma, bt_level) = self.analyzer.analyze(
                    &self.db,
                    &self.asg,
                    &mut self.decision,
                    conflict,
                    minimize,
                );
                trace!(prefix = %self.prefix, ?lemma, bt_level, "learned clause");
                self.decision.decay();
                self.backtrack(bt_level);
                if lemma.len() == 1 {
                    self.asg.enqueue(lemma[0], None);
                } else {
                    let asserting = lemma[0];
                    let second = lemma[1];
                    let id = self.db.add_learned(lemma);
                    self.watches.add(asserting, id, second);
                    self.watches.add(second, id, asserting);
                    self.asg.enqueue(asserting, Some(id));
                }
                if conflicts_here as f64 >= restart_limit {
                    self.stats.restarts += 1;
                    restart_seq += 1;
                    conflicts_here = 0;
                    restart_limit = RESTART_BASE * luby(2.0, restart_seq);
                    self.backtrack(0);
                }
            } else {
                // Place the next assumption, or branch.
                let mut next: Lit = 0;
                while self.asg.decision_level() < assumps.len() {
                    let a = assumps[self.asg.decision_level()];
                    match self.asg.value_lit(a) {
                        Some(true) => self.asg.new_level(),
                        Some(false) => return SolveResult::Unsat,
                        None => {
                            next = a;
                            break;
                        }
                    }
                }
                if next == 0 {
                    match self.decision.pick(&self.asg) {
                        Some(lit) => next = lit,
                        None => {
                            self.extract_model();
                            return SolveResult::Sat;
                        }
                    }
                }
                self.stats.decisions += 1;
                self.asg.new_level();
                self.asg.enqueue(next, None);
            }
        }
    }
}

impl Oracle for CdclOracle {
    fn reserve(&mut self, n: Var) {
        self.external_vars = self.external_vars.max(n);
        self.grow_to(n);
    }

    fn add_clause(&mut self, lits: &[Lit]) {
        self.add_clause_permanent(lits);
        self.external_vars = self.external_vars.max(self.internal_vars);
    }

    fn assume(&mut self, lit: Lit) {
        debug_assert!(lit != 0);
        self.assumptions.push(lit);
    }

    fn constrain(&mut self, lit: Lit) {
        if lit != 0 {
            self.constraint.push(lit);
        }
    }

    fn solve(&mut self) -> SolveResult {
        let mut assumps = std::mem::take(&mut self.assumptions);
        let constraint = std::mem::take(&mut self.constraint);

        let mut deactivate = None;
        if !constraint.is_empty() {
            let z = self.new_var();
            let mut clause = constraint;
            clause.push(-z);
            self.add_clause_permanent(&clause);
            assumps.push(z);
            deactivate = Some(z);
        }

        let result = if self.ok {
            debug!(prefix = %self.prefix, assumptions = assumps.len(), "solve");
            self.search(&assumps)
        } else {
            SolveResult::Unsat
        };
        self.backtrack(0);

        if let Some(z) = deactivate {
            // Retire the activation variable; the constraint clause becomes
            // permanently satisfied and inert.
            self.add_clause_permanent(&[-z]);
        }
        debug!(prefix = %self.prefix, ?result, conflicts = self.stats.conflicts, "solved");
        result
    }

    fn value(&self, v: Var) -> Lit {
        assert!(
            !self.model.is_empty() && v >= 1 && v <= self.internal_vars,
            "value queried outside the post-SAT state"
        );
        if self.model[v as usize] > 0 {
            v
        } else {
            -v
        }
    }

    fn fixed(&self, lit: Lit) -> i32 {
        let v = var(lit);
        if v > self.internal_vars {
            return 0;
        }
        match self.asg.value_var(v) {
            Some(value) if self.asg.level_of(v) == 0 => {
                if value == is_pos(lit) {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        }
    }

    fn supports_flip(&self) -> bool {
        true
    }

    fn flip(&mut self, lit: Lit) -> bool {
        let v = var(lit);
        if self.model.is_empty() || v > self.internal_vars {
            return false;
        }
        // Root-fixed variables can never be flipped.
        if self.fixed(lit) != 0 {
            return false;
        }
        // The literal currently true at `v` loses support by the flip;
        // every original clause containing it needs another true literal.
        let cur = if self.model[v as usize] > 0 { v } else { -v };
        for &id in self.occs.of(cur) {
            let clause = self.db.clause(id);
            if !clause
                .lits
                .iter()
                .any(|&l| l != cur && self.model_satisfies(l))
            {
                return false;
            }
        }
        self.model[v as usize] = -self.model[v as usize];
        trace!(prefix = %self.prefix, lit, "flipped model value");
        true
    }

    fn phase(&mut self, lit: Lit) {
        self.decision.set_hint(lit);
    }

    fn copy(&self) -> Self {
        let mut other = Self::new();
        other.options = self.options.clone();
        other.prefix = self.prefix.clone();
        if let Some(&phase) = self.options.get("phase") {
            other.decision.set_default_phase(phase != 0);
        }
        other.reserve(self.external_vars);
        for clause in self.db.originals() {
            other.add_clause_permanent(&clause.lits);
        }
        for &lit in &self.asg.trail {
            if self.asg.level_of(var(lit)) == 0 {
                other.add_clause_permanent(&[lit]);
            }
        }
        if !self.ok {
            other.ok = false;
        }
        other
    }

    fn set_option(&mut self, name: &str, value: i64) -> bool {
        if !KNOWN_OPTIONS.contains(&name) {
            return false;
        }
        if name == "phase" {
            self.decision.set_default_phase(value != 0);
        }
        self.options.insert(name.to_string(), value);
        true
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }
}

/// The Luby restart sequence, scaled by `y`.
fn luby(y: f64, mut x: u32) -> f64 {
    let mut size: u64 = 1;
    let mut seq: u32 = 0;
    while size < u64::from(x) + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != u64::from(x) {
        size = (size - 1) / 2;
        seq -= 1;
        x %= size as u32;
    }
    y.powi(seq as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_prefix() {
        let expected = [1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 4.0, 1.0];
        for (x, &want) in expected.iter().enumerate() {
            assert_eq!(luby(2.0, x as u32), want);
        }
    }

    #[test]
    fn test_simple_sat() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1, 2]);
        solver.add_clause(&[-1, 3]);
        solver.add_clause(&[-2, -3]);
        assert_eq!(solver.solve(), SolveResult::Sat);
        let v1 = solver.value(1) > 0;
        let v2 = solver.value(2) > 0;
        let v3 = solver.value(3) > 0;
        assert!(v1 || v2);
        assert!(!v1 || v3);
        assert!(!v2 || !v3);
    }

    #[test]
    fn test_conflicting_units_unsat() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1]);
        solver.add_clause(&[-1]);
        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn test_empty_formula_sat() {
        let mut solver = CdclOracle::new();
        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn test_assumptions_are_one_shot() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1, 2]);
        solver.assume(-1);
        solver.assume(-2);
        assert_eq!(solver.solve(), SolveResult::Unsat);
        // Without assumptions the formula is satisfiable again.
        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn test_fixed_after_propagation() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1]);
        solver.add_clause(&[-1, 2]);
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.fixed(1), 1);
        assert_eq!(solver.fixed(-1), -1);
        assert_eq!(solver.fixed(2), 1);
        assert_eq!(solver.fixed(3), 0);
    }

    #[test]
    fn test_constrain_is_one_shot() {
        let mut solver = CdclOracle::new();
        solver.reserve(2);
        solver.add_clause(&[1, 2]);
        // Require one of the negations: some model must falsify 1 or 2.
        solver.constrain(-1);
        solver.constrain(-2);
        solver.constrain(0);
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert!(solver.value(1) < 0 || solver.value(2) < 0);
        // The constraint is consumed; nothing forces a negation now.
        assert_eq!(solver.solve(), SolveResult::Sat);
    }

    #[test]
    fn test_constrain_unsat_leaves_solver_usable() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1]);
        solver.add_clause(&[2]);
        solver.constrain(-1);
        solver.constrain(-2);
        solver.constrain(0);
        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.value(1), 1);
        assert_eq!(solver.value(2), 2);
    }

    #[test]
    fn test_flip_free_variable() {
        let mut solver = CdclOracle::new();
        solver.reserve(2);
        solver.add_clause(&[1, 2]);
        solver.add_clause(&[1, -2]);
        assert_eq!(solver.solve(), SolveResult::Sat);
        assert_eq!(solver.value(1), 1);
        // Variable 2 is free: both phases extend to models.
        let before = solver.value(2);
        assert!(solver.flip(before));
        assert_eq!(solver.value(2), -before);
        // Variable 1 supports both clauses alone; flipping it must fail.
        assert!(!solver.flip(1));
    }

    #[test]
    fn test_copy_preserves_clauses() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1]);
        solver.add_clause(&[-1, 2]);
        assert_eq!(solver.solve(), SolveResult::Sat);
        let mut twin = solver.copy();
        twin.assume(-2);
        assert_eq!(twin.solve(), SolveResult::Unsat);
        twin.assume(2);
        assert_eq!(twin.solve(), SolveResult::Sat);
    }

    #[test]
    fn test_pigeonhole_unsat() {
        let mut solver = CdclOracle::new();
        solver.add_clause(&[1, 2]);
        solver.add_clause(&[3, 4]);
        solver.add_clause(&[5, 6]);
        solver.add_clause(&[-1, -3]);
        solver.add_clause(&[-1, -5]);
        solver.add_clause(&[-3, -5]);
        solver.add_clause(&[-2, -4]);
        solver.add_clause(&[-2, -6]);
        solver.add_clause(&[-4, -6]);
        assert_eq!(solver.solve(), SolveResult::Unsat);
        assert_eq!(solver.solve(), SolveResult::Unsat);
    }

    #[test]
    fn test_set_option_known_names() {
        let mut solver = CdclOracle::new();
        assert!(solver.set_option("phase", 0));
        assert!(solver.set_option("verbose", 2));
        assert!(!solver.set_option("frobnicate", 1));
    }
}
