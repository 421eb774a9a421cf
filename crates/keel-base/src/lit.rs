//! Literal and variable primitives.
//!
//! Literals are plain signed integers in DIMACS convention: variable `v` is
//! in `[1, n]` and `-v` denotes its negation. Zero is reserved as the clause
//! and constraint terminator.

/// A variable index, `1..=n`.
pub type Var = i32;

/// A signed nonzero literal; `-v` negates variable `v`.
pub type Lit = i32;

/// Returns the variable of a literal.
#[must_use]
pub fn var(lit: Lit) -> Var {
    lit.abs()
}

/// Returns whether the literal is positive.
#[must_use]
pub fn is_pos(lit: Lit) -> bool {
    lit > 0
}

/// Maps a literal to a dense index (positive first), for watch and
/// occurrence tables sized `2 * num_vars`.
#[must_use]
pub fn lit_index(lit: Lit) -> usize {
    debug_assert!(lit != 0);
    if lit > 0 {
        (lit as usize - 1) * 2
    } else {
        ((-lit) as usize - 1) * 2 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_index_distinct() {
        assert_eq!(lit_index(1), 0);
        assert_eq!(lit_index(-1), 1);
        assert_eq!(lit_index(2), 2);
        assert_eq!(lit_index(-2), 3);
    }

    #[test]
    fn test_var() {
        assert_eq!(var(7), 7);
        assert_eq!(var(-7), 7);
    }
}
