//! Decision heuristic: activity-ordered variable selection with phase
//! saving and per-variable phase hints.

use crate::bcp::Assignment;
use crate::heuristics::VsidsScores;
use keel_base::{Lit, Var};

const ABSENT: usize = usize::MAX;

/// Picks branching variables by maximum activity.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    scores: VsidsScores,
    /// Binary max-heap of variables, ordered by score.
    heap: Vec<Var>,
    /// Position of each variable in `heap`, or `ABSENT`.
    pos: Vec<usize>,
    /// Saved phase per variable, updated on unassignment.
    saved: Vec<Option<bool>>,
    /// Explicit phase bias per variable, set via the oracle `phase` call.
    hint: Vec<Option<bool>>,
    /// Polarity used before any phase has been saved.
    default_phase: bool,
}

impl DecisionEngine {
    /// Creates a decision engine for `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        let mut engine = Self {
            scores: VsidsScores::new(num_vars),
            heap: Vec::with_capacity(num_vars),
            pos: vec![ABSENT; num_vars + 1],
            saved: vec![None; num_vars + 1],
            hint: vec![None; num_vars + 1],
            default_phase: true,
        };
        for v in 1..=num_vars as Var {
            engine.insert(v);
        }
        engine
    }

    /// Adds one more variable and queues it for decisions.
    pub fn push_var(&mut self) {
        self.scores.push_var();
        self.pos.push(ABSENT);
        self.saved.push(None);
        self.hint.push(None);
        let v = (self.pos.len() - 1) as Var;
        self.insert(v);
    }

    /// Sets the polarity used for variables without a saved phase.
    pub fn set_default_phase(&mut self, phase: bool) {
        self.default_phase = phase;
    }

    /// Biases the decision phase of `var(lit)` so that `lit` is preferred.
    pub fn set_hint(&mut self, lit: Lit) {
        self.hint[lit.unsigned_abs() as usize] = Some(lit > 0);
    }

    /// Records the phase of an unassigned variable.
    pub fn save_phase(&mut self, v: Var, phase: bool) {
        self.saved[v as usize] = Some(phase);
    }

    /// Bumps a variable's activity and restores heap order.
    pub fn bump(&mut self, v: Var) {
        self.scores.bump(v);
        if self.pos[v as usize] != ABSENT {
            self.sift_up(self.pos[v as usize]);
        }
    }

    /// Decays all activities.
    pub fn decay(&mut self) {
        self.scores.decay();
    }

    /// Re-inserts an unassigned variable.
    pub fn insert(&mut self, v: Var) {
        if self.pos[v as usize] != ABSENT {
            return;
        }
        self.pos[v as usize] = self.heap.len();
        self.heap.push(v);
        self.sift_up(self.heap.len() - 1);
    }

    /// Picks the unassigned variable with the highest activity and returns
    /// it as a decision literal in its preferred phase.
    pub fn pick(&mut self, asg: &Assignment) -> Option<Lit> {
        while let Some(v) = self.pop() {
            if asg.value_var(v).is_none() {
                let phase = self.hint[v as usize]
                    .or(self.saved[v as usize])
                    .unwrap_or(self.default_phase);
                return Some(if phase { v } else { -v });
            }
        }
        None
    }

    fn pop(&mut self) -> Option<Var> {
        let top = *self.heap.first()?;
        self.pos[top as usize] = ABSENT;
        let last = self.heap.pop()?;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.pos[last as usize] = 0;
            self.sift_down(0);
        }
        Some(top)
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.score_at(i) <= self.score_at(parent) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = 2 * i + 2;
            let mut largest = i;
            if left < self.heap.len() && self.score_at(left) > self.score_at(largest) {
                largest = left;
            }
            if right < self.heap.len() && self.score_at(right) > self.score_at(largest) {
                largest = right;
            }
            if largest == i {
                break;
            }
            self.swap(i, largest);
            i = largest;
        }
    }

    fn score_at(&self, i: usize) -> f64 {
        self.scores.score(self.heap[i])
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.pos[self.heap[a] as usize] = a;
        self.pos[self.heap[b] as usize] = b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_highest_activity() {
        let mut asg = Assignment::new();
        for _ in 0..3 {
            asg.push_var();
        }
        let mut engine = DecisionEngine::new(3);
        engine.bump(2);
        engine.bump(2);
        engine.bump(3);
        let lit = engine.pick(&asg).unwrap();
        assert_eq!(lit.abs(), 2);
    }

    #[test]
    fn test_pick_skips_assigned() {
        let mut asg = Assignment::new();
        for _ in 0..2 {
            asg.push_var();
        }
        asg.enqueue(1, None);
        let mut engine = DecisionEngine::new(2);
        engine.bump(1);
        let lit = engine.pick(&asg).unwrap();
        assert_eq!(lit.abs(), 2);
        assert_eq!(engine.pick(&asg), None);
    }

    #[test]
    fn test_phase_hint_wins() {
        let asg = {
            let mut a = Assignment::new();
            a.push_var();
            a
        };
        let mut engine = DecisionEngine::new(1);
        engine.set_hint(-1);
        assert_eq!(engine.pick(&asg), Some(-1));
    }

    #[test]
    fn test_reinsert_after_pop() {
        let asg = {
            let mut a = Assignment::new();
            a.push_var();
            a
        };
        let mut engine = DecisionEngine::new(1);
        assert!(engine.pick(&asg).is_some());
        assert_eq!(engine.pick(&asg), None);
        engine.insert(1);
        assert!(engine.pick(&asg).is_some());
    }
}
