use super::*;
use crate::test_utils::setup;

#[test]
fn classifies_control_atoms() {
    let (symbols, terms) = setup();
    let b = Builtins::intern(&symbols);
    assert_eq!(Goal::classify(terms.atom(b.true_), &terms, &b), Goal::True);
    assert_eq!(Goal::classify(terms.atom(b.fail), &terms, &b), Goal::Fail);
    assert_eq!(Goal::classify(terms.atom(b.false_), &terms, &b), Goal::Fail);
    assert_eq!(Goal::classify(terms.atom(b.cut), &terms, &b), Goal::Cut);
}

#[test]
fn classifies_conjunction_and_disjunction() {
    let (symbols, terms) = setup();
    let b = Builtins::intern(&symbols);
    let p = terms.atom(symbols.intern("p"));
    let q = terms.atom(symbols.intern("q"));
    assert_eq!(
        Goal::classify(terms.app2(b.comma, p, q), &terms, &b),
        Goal::Conj(p, q)
    );
    assert_eq!(
        Goal::classify(terms.app2(b.semicolon, p, q), &terms, &b),
        Goal::Disj(p, q)
    );
}

#[test]
fn comma_with_other_arity_is_user_goal() {
    let (symbols, terms) = setup();
    let b = Builtins::intern(&symbols);
    let p = terms.atom(symbols.intern("p"));
    assert_eq!(
        Goal::classify(terms.app1(b.comma, p), &terms, &b),
        Goal::User(PredKey::new(b.comma, 1))
    );
}

#[test]
fn classifies_call_with_extra_arguments() {
    let (symbols, terms) = setup();
    let b = Builtins::intern(&symbols);
    let bug = terms.atom(symbols.intern("bug"));
    let x = terms.var(0);
    match Goal::classify(terms.app2(b.call, bug, x), &terms, &b) {
        Goal::Call { target, extra } => {
            assert_eq!(target, bug);
            assert_eq!(extra.as_slice(), &[x]);
        }
        other => panic!("expected call, got {:?}", other),
    }
}

#[test]
fn classifies_user_predicates_and_bad_goals() {
    let (symbols, terms) = setup();
    let b = Builtins::intern(&symbols);
    let father = symbols.intern("father");
    let goal = terms.app1(father, terms.var(0));
    assert_eq!(
        Goal::classify(goal, &terms, &b),
        Goal::User(PredKey::new(father, 1))
    );
    assert_eq!(
        Goal::classify(terms.atom(father), &terms, &b),
        Goal::User(PredKey::new(father, 0))
    );
    assert_eq!(Goal::classify(terms.var(7), &terms, &b), Goal::Unbound(7));
    assert_eq!(Goal::classify(terms.int(1), &terms, &b), Goal::NotCallable);
}

// ========== extend_goal ==========

#[test]
fn extend_atom_builds_compound() {
    let (symbols, terms) = setup();
    let bindings = Bindings::new();
    let bug = symbols.intern("bug");
    let spider = terms.atom(symbols.intern("spider"));
    let extended = extend_goal(terms.atom(bug), &[spider], &bindings, &terms);
    assert_eq!(extended, Some(terms.app1(bug, spider)));
}

#[test]
fn extend_compound_appends_arguments() {
    let (symbols, terms) = setup();
    let bindings = Bindings::new();
    let f = symbols.intern("f");
    let a = terms.atom(symbols.intern("a"));
    let c = terms.atom(symbols.intern("c"));
    let extended = extend_goal(terms.app1(f, a), &[c], &bindings, &terms);
    assert_eq!(extended, Some(terms.app2(f, a, c)));
}

#[test]
fn extend_without_extra_is_identity() {
    let (symbols, terms) = setup();
    let bindings = Bindings::new();
    let g = terms.atom(symbols.intern("g"));
    assert_eq!(extend_goal(g, &[], &bindings, &terms), Some(g));
}

#[test]
fn extend_follows_bindings() {
    let (symbols, terms) = setup();
    let mut bindings = Bindings::new();
    bindings.fresh_vars(1);
    let bug = symbols.intern("bug");
    bindings.bind(0, terms.atom(bug));
    let fly = terms.atom(symbols.intern("fly"));
    let extended = extend_goal(terms.var(0), &[fly], &bindings, &terms);
    assert_eq!(extended, Some(terms.app1(bug, fly)));
}

#[test]
fn extend_rejects_unbound_and_numbers() {
    let (_, terms) = setup();
    let mut bindings = Bindings::new();
    bindings.fresh_vars(1);
    assert_eq!(extend_goal(terms.var(0), &[], &bindings, &terms), None);
    assert_eq!(extend_goal(terms.int(3), &[], &bindings, &terms), None);
}
