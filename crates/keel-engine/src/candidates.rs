//! The candidate set: the sole mutable data structure of the algorithm.
//!
//! Each variable is in exactly one of three states: CANDIDATE (carrying the
//! literal conjectured to be backbone), BACKBONE (confirmed), or DROPPED
//! (a model falsifying the conjectured literal was witnessed). States are
//! kept in two parallel arrays; transitions are monotone and happen at most
//! once per variable.

use keel_base::{Error, Lit, Result, Var};

/// Tri-state store over variables `1..=n` plus the derived counters.
#[derive(Debug, Default)]
pub struct CandidateSet {
    /// Conjectured backbone literal per variable; zero once decided.
    candidate: Vec<Lit>,
    /// Confirmed backbone literal per variable; zero unless BACKBONE.
    fixed: Vec<Lit>,
    backbones: u64,
    dropped: u64,
    n: Var,
}

impl CandidateSet {
    /// Creates an empty set covering no variables.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Initializes every variable as a candidate with its value in the
    /// first model.
    ///
    /// `model` maps a variable to its literal in that model.
    pub fn init_from_first_model<F>(n: Var, model: F) -> Result<Self>
    where
        F: Fn(Var) -> Lit,
    {
        let len = n as usize + 1;
        let mut candidate = Vec::new();
        let mut fixed = Vec::new();
        candidate
            .try_reserve_exact(len)
            .map_err(|_| Error::ResourceExhausted("candidate store".to_string()))?;
        fixed
            .try_reserve_exact(len)
            .map_err(|_| Error::ResourceExhausted("fixed store".to_string()))?;
        candidate.push(0);
        fixed.resize(len, 0);
        for v in 1..=n {
            candidate.push(model(v));
        }
        Ok(Self {
            candidate,
            fixed,
            backbones: 0,
            dropped: 0,
            n,
        })
    }

    /// Whether `v` is still under investigation.
    #[must_use]
    pub fn is_candidate(&self, v: Var) -> bool {
        self.candidate[v as usize] != 0
    }

    /// The conjectured backbone literal of `v`; zero once decided.
    #[must_use]
    pub fn literal(&self, v: Var) -> Lit {
        self.candidate[v as usize]
    }

    /// The confirmed backbone literal of `v`; zero unless BACKBONE.
    #[must_use]
    pub fn backbone_literal(&self, v: Var) -> Lit {
        self.fixed[v as usize]
    }

    /// Marks `v` as witnessed non-backbone.
    pub fn drop_var(&mut self, v: Var) {
        debug_assert!(self.is_candidate(v));
        self.candidate[v as usize] = 0;
        self.dropped += 1;
    }

    /// Confirms `v`'s candidate literal as backbone.
    pub fn promote(&mut self, v: Var) {
        debug_assert!(self.is_candidate(v));
        self.fixed[v as usize] = self.candidate[v as usize];
        self.candidate[v as usize] = 0;
        self.backbones += 1;
    }

    /// Number of confirmed backbone variables.
    #[must_use]
    pub fn backbones(&self) -> u64 {
        self.backbones
    }

    /// Number of dropped variables.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Number of still-undecided variables.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.n as u64 - self.backbones - self.dropped
    }
}
