use super::*;
use crate::test_utils::{setup, with_vars};

// ========== IDENTICAL TERMS ==========

#[test]
fn unify_same_var() {
    let (_, terms) = setup();
    let mut bindings = with_vars(1);
    let v0 = terms.var(0);

    assert!(unify(v0, v0, &mut bindings, &terms));
    assert!(bindings.is_empty(), "Same var should bind nothing");
}

#[test]
fn unify_same_ground_term() {
    let (symbols, terms) = setup();
    let mut bindings = Bindings::new();
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let t = terms.app2(f, a, a);

    assert!(unify(t, t, &mut bindings, &terms));
    assert!(bindings.is_empty());
}

// ========== VAR vs TERM ==========

#[test]
fn unify_var_with_atom() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let a = terms.atom(symbols.intern("a"));

    assert!(unify(terms.var(0), a, &mut bindings, &terms));
    assert_eq!(bindings.get(0), Some(a));
}

#[test]
fn unify_atom_with_var() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let a = terms.atom(symbols.intern("a"));

    assert!(unify(a, terms.var(0), &mut bindings, &terms));
    assert_eq!(bindings.get(0), Some(a));
}

#[test]
fn unify_var_var_binds_younger_to_older() {
    let (_, terms) = setup();
    let mut bindings = with_vars(2);

    assert!(unify(terms.var(0), terms.var(1), &mut bindings, &terms));
    assert_eq!(bindings.get(1), Some(terms.var(0)));
    assert!(!bindings.is_bound(0));

    let mut bindings = with_vars(2);
    assert!(unify(terms.var(1), terms.var(0), &mut bindings, &terms));
    assert_eq!(bindings.get(1), Some(terms.var(0)));
}

#[test]
fn unify_number_with_var() {
    let (_, terms) = setup();
    let mut bindings = with_vars(1);
    assert!(unify(terms.int(42), terms.var(0), &mut bindings, &terms));
    assert_eq!(bindings.get(0), Some(terms.int(42)));
}

// ========== COMPOUNDS ==========

#[test]
fn unify_compounds_binds_arguments() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(2);
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let b = terms.atom(symbols.intern("b"));

    let left = terms.app2(f, terms.var(0), b);
    let right = terms.app2(f, a, terms.var(1));
    assert!(unify(left, right, &mut bindings, &terms));
    assert_eq!(bindings.get(0), Some(a));
    assert_eq!(bindings.get(1), Some(b));
}

#[test]
fn unify_shared_variable_must_agree() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let b = terms.atom(symbols.intern("b"));

    let left = terms.app2(f, terms.var(0), terms.var(0));
    assert!(!unify(left, terms.app2(f, a, b), &mut bindings, &terms));

    let mut bindings = with_vars(1);
    assert!(unify(left, terms.app2(f, a, a), &mut bindings, &terms));
}

#[test]
fn unify_through_existing_bindings() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(2);
    let a = terms.atom(symbols.intern("a"));
    bindings.bind(0, terms.var(1));
    bindings.bind(1, a);

    assert!(unify(terms.var(0), a, &mut bindings, &terms));
    assert_eq!(bindings.len(), 2, "No new binding needed");
}

// ========== FAILURES ==========

#[test]
fn unify_distinct_atoms_fails() {
    let (symbols, terms) = setup();
    let mut bindings = Bindings::new();
    let a = terms.atom(symbols.intern("a"));
    let b = terms.atom(symbols.intern("b"));
    assert!(!unify(a, b, &mut bindings, &terms));
}

#[test]
fn unify_distinct_numbers_fails() {
    let (_, terms) = setup();
    let mut bindings = Bindings::new();
    assert!(!unify(terms.int(1), terms.int(2), &mut bindings, &terms));
}

#[test]
fn unify_functor_mismatch_fails() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let g = symbols.intern("g");
    let x = terms.var(0);
    assert!(!unify(terms.app1(f, x), terms.app1(g, x), &mut bindings, &terms));
}

#[test]
fn unify_arity_mismatch_fails() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let x = terms.var(0);
    assert!(!unify(terms.app1(f, x), terms.app2(f, x, x), &mut bindings, &terms));
}

#[test]
fn unify_atom_with_compound_fails() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    assert!(!unify(terms.atom(f), terms.app1(f, terms.var(0)), &mut bindings, &terms));
}

#[test]
fn unify_atom_with_number_fails() {
    let (symbols, terms) = setup();
    let mut bindings = Bindings::new();
    let a = terms.atom(symbols.intern("a"));
    assert!(!unify(a, terms.int(0), &mut bindings, &terms));
}

#[test]
fn failed_unify_leaves_partial_bindings() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let b = terms.atom(symbols.intern("b"));

    let left = terms.app2(f, terms.var(0), a);
    let right = terms.app2(f, a, b);
    assert!(!unify(left, right, &mut bindings, &terms));
    assert!(bindings.is_bound(0), "Caller is responsible for undo");
}

#[test]
fn unify_or_undo_cleans_up_on_failure() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let b = terms.atom(symbols.intern("b"));

    let left = terms.app2(f, terms.var(0), a);
    let right = terms.app2(f, a, b);
    assert!(!unify_or_undo(left, right, &mut bindings, &terms));
    assert!(bindings.is_empty());
}

// ========== NO OCCURS-CHECK ==========

#[test]
fn unify_without_occurs_check_succeeds() {
    let (symbols, terms) = setup();
    let mut bindings = with_vars(1);
    let f = symbols.intern("f");
    let x = terms.var(0);
    assert!(unify(x, terms.app1(f, x), &mut bindings, &terms));
    assert!(bindings.is_bound(0));
}
