//! Integration tests for the bundled CDCL oracle.

use keel_format::DimacsCnf;
use keel_oracle::{CdclOracle, Oracle, SolveResult};

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_dimacs_reports_variable_count() {
    let cnf = DimacsCnf::parse("p cnf 4 2\n1 -2 0\n3 4 0\n").unwrap();
    let mut solver = CdclOracle::new();
    assert_eq!(solver.load_dimacs(&cnf), 4);
    assert_eq!(solver.solve(), SolveResult::Sat);
}

#[test]
fn test_load_empty_clause_is_unsat() {
    let cnf = DimacsCnf::parse("p cnf 2 2\n1 2 0\n0\n").unwrap();
    let mut solver = CdclOracle::new();
    solver.load_dimacs(&cnf);
    assert_eq!(solver.solve(), SolveResult::Unsat);
}

#[test]
fn test_unconstrained_variables_get_values() {
    // Header declares more variables than the clauses mention.
    let cnf = DimacsCnf::parse("p cnf 3 1\n1 0\n").unwrap();
    let mut solver = CdclOracle::new();
    solver.load_dimacs(&cnf);
    assert_eq!(solver.solve(), SolveResult::Sat);
    for v in 1..=3 {
        assert_eq!(solver.value(v).abs(), v);
    }
}

// =============================================================================
// Incremental interface
// =============================================================================

#[test]
fn test_failed_assumption_then_plain_solve() {
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2]);
    solver.add_clause(&[-1, 2]);
    solver.assume(-2);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.value(2), 2);
}

#[test]
fn test_assumption_sequence_mimics_backbone_probing() {
    // 1 is backbone, 2 and 3 are free.
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2]);
    solver.add_clause(&[1, -2]);
    solver.add_clause(&[2, 3]);
    assert_eq!(solver.solve(), SolveResult::Sat);
    solver.assume(-1);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    solver.assume(-2);
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.value(2), -2);
    assert_eq!(solver.value(3), 3);
    solver.assume(-3);
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.value(3), -3);
}

#[test]
fn test_constrain_combined_with_assumption() {
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2, 3]);
    solver.assume(-1);
    solver.constrain(-2);
    solver.constrain(-3);
    solver.constrain(0);
    // Some model with -1 must falsify 2 or 3; (F, T, T) is excluded.
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert_eq!(solver.value(1), -1);
    assert!(solver.value(2) == -2 || solver.value(3) == -3);
}

#[test]
fn test_learned_units_become_root_fixed() {
    // Assuming -1 conflicts immediately, teaching the solver the unit 1.
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2]);
    solver.add_clause(&[1, -2]);
    assert_eq!(solver.fixed(1), 0);
    solver.assume(-1);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    assert_eq!(solver.fixed(1), 1);
    assert_eq!(solver.fixed(-1), -1);
}

// =============================================================================
// Model flipping
// =============================================================================

#[test]
fn test_flip_rejects_root_fixed_variable() {
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1]);
    solver.add_clause(&[2, 3]);
    assert_eq!(solver.solve(), SolveResult::Sat);
    assert!(!solver.flip(1));
    assert_eq!(solver.value(1), 1);
}

#[test]
fn test_flip_chain_in_loose_clause() {
    // (1 or 2 or 3) with everything true: two variables flip, the last
    // supporter does not.
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2, 3]);
    assert_eq!(solver.solve(), SolveResult::Sat);
    let mut flips = 0;
    for v in 1..=3 {
        if solver.flip(solver.value(v)) {
            flips += 1;
        }
    }
    assert_eq!(flips, 2);
    // Exactly one literal of the clause is still satisfied.
    let satisfied = (1..=3).filter(|&v| solver.value(v) == v).count();
    assert_eq!(satisfied, 1);
}

// =============================================================================
// Copies
// =============================================================================

#[test]
fn test_copy_is_independent() {
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1, 2]);
    assert_eq!(solver.solve(), SolveResult::Sat);
    let mut twin = solver.copy();
    // New clauses on the twin do not leak back.
    twin.add_clause(&[-1]);
    twin.add_clause(&[-2]);
    assert_eq!(twin.solve(), SolveResult::Unsat);
    assert_eq!(solver.solve(), SolveResult::Sat);
}

#[test]
fn test_copy_of_unsat_solver_is_unsat() {
    let mut solver = CdclOracle::new();
    solver.add_clause(&[1]);
    solver.add_clause(&[-1]);
    assert_eq!(solver.solve(), SolveResult::Unsat);
    let mut twin = solver.copy();
    assert_eq!(twin.solve(), SolveResult::Unsat);
}
