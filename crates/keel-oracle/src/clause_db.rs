//! Clause database management.

use keel_base::{lit_index, Lit};

/// A clause stored in the database.
#[derive(Debug, Clone)]
pub struct StoredClause {
    /// Literals in the clause; the first two are watched.
    pub lits: Vec<Lit>,
    /// Whether this is a learned clause.
    pub learned: bool,
}

/// Arena of all clauses, original and learned.
#[derive(Debug, Default, Clone)]
pub struct ClauseDb {
    clauses: Vec<StoredClause>,
    num_learned: usize,
}

impl ClauseDb {
    /// Creates a new empty clause database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an original clause and returns its id.
    pub fn add_original(&mut self, lits: Vec<Lit>) -> usize {
        self.clauses.push(StoredClause {
            lits,
            learned: false,
        });
        self.clauses.len() - 1
    }

    /// Adds a learned clause and returns its id.
    pub fn add_learned(&mut self, lits: Vec<Lit>) -> usize {
        self.num_learned += 1;
        self.clauses.push(StoredClause {
            lits,
            learned: true,
        });
        self.clauses.len() - 1
    }

    /// Gets a clause by id.
    #[must_use]
    pub fn clause(&self, id: usize) -> &StoredClause {
        &self.clauses[id]
    }

    /// Gets a mutable clause by id.
    pub fn clause_mut(&mut self, id: usize) -> &mut StoredClause {
        &mut self.clauses[id]
    }

    /// Iterates over the original (irredundant) clauses.
    pub fn originals(&self) -> impl Iterator<Item = &StoredClause> {
        self.clauses.iter().filter(|c| !c.learned)
    }

    /// Returns the number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns whether the database is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of learned clauses.
    #[must_use]
    pub fn num_learned(&self) -> usize {
        self.num_learned
    }
}

/// Occurrence lists over the original clauses, used by the model-flip
/// capability to find the clauses a flipped-away literal must not break.
#[derive(Debug, Default, Clone)]
pub struct OccTable {
    occs: Vec<Vec<usize>>,
}

impl OccTable {
    /// Creates an empty occurrence table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures entries exist for variables up to `num_vars`.
    pub fn grow(&mut self, num_vars: usize) {
        self.occs.resize(num_vars * 2, Vec::new());
    }

    /// Records that `lit` occurs in clause `id`.
    pub fn add(&mut self, lit: Lit, id: usize) {
        self.occs[lit_index(lit)].push(id);
    }

    /// The ids of original clauses containing `lit`.
    #[must_use]
    pub fn of(&self, lit: Lit) -> &[usize] {
        &self.occs[lit_index(lit)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_original_and_learned() {
        let mut db = ClauseDb::new();
        let a = db.add_original(vec![1, 2]);
        let b = db.add_learned(vec![-1, 3]);
        assert_eq!(db.clause(a).lits, vec![1, 2]);
        assert!(db.clause(b).learned);
        assert_eq!(db.len(), 2);
        assert_eq!(db.num_learned(), 1);
        assert_eq!(db.originals().count(), 1);
    }

    #[test]
    fn test_occ_table() {
        let mut occs = OccTable::new();
        occs.grow(3);
        occs.add(1, 0);
        occs.add(-2, 0);
        occs.add(1, 4);
        assert_eq!(occs.of(1), &[0, 4]);
        assert_eq!(occs.of(-2), &[0]);
        assert!(occs.of(2).is_empty());
    }
}
