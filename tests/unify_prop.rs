use proptest::prelude::*;
use sldlog::bindings::Bindings;
use sldlog::symbol::SymbolStore;
use sldlog::term::{TermId, TermStore};
use sldlog::unify::{unify, unify_or_undo};
use smallvec::SmallVec;

const MAX_VAR: u32 = 4;
const VAR_COUNT: u32 = MAX_VAR + 1;

const FUNCTOR_NAMES: [&str; 6] = ["a", "b", "c", "f", "g", "h"];

#[derive(Clone, Debug)]
enum RawTerm {
    Var(u32),
    Int(i64),
    App { f: usize, kids: Vec<RawTerm> },
}

fn raw_term_strategy() -> impl Strategy<Value = RawTerm> {
    let leaf = prop_oneof![
        (0..=MAX_VAR).prop_map(RawTerm::Var),
        (0i64..3).prop_map(RawTerm::Int),
        Just(RawTerm::App { f: 0, kids: vec![] }),
        Just(RawTerm::App { f: 1, kids: vec![] }),
        Just(RawTerm::App { f: 2, kids: vec![] }),
    ];

    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| RawTerm::App {
                f: 3,
                kids: vec![t]
            }),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| RawTerm::App {
                f: 4,
                kids: vec![a, b],
            }),
            (inner.clone(), inner).prop_map(|(a, b)| RawTerm::App {
                f: 5,
                kids: vec![a, b],
            }),
        ]
    })
}

fn build_term(raw: &RawTerm, symbols: &SymbolStore, terms: &TermStore) -> TermId {
    match raw {
        RawTerm::Var(v) => terms.var(*v),
        RawTerm::Int(n) => terms.int(*n),
        RawTerm::App { f, kids } => {
            let func = symbols.intern(FUNCTOR_NAMES[*f]);
            let child_ids: SmallVec<[TermId; 4]> = kids
                .iter()
                .map(|kid| build_term(kid, symbols, terms))
                .collect();
            terms.app(func, child_ids)
        }
    }
}

fn ground_term_strategy() -> impl Strategy<Value = RawTerm> {
    raw_term_strategy().prop_map(|raw| ground(&raw))
}

/// Replace each variable with a constant.
fn ground(raw: &RawTerm) -> RawTerm {
    match raw {
        RawTerm::Var(v) => RawTerm::App {
            f: (*v as usize) % 3,
            kids: vec![],
        },
        RawTerm::Int(n) => RawTerm::Int(*n),
        RawTerm::App { f, kids } => RawTerm::App {
            f: *f,
            kids: kids.iter().map(ground).collect(),
        },
    }
}

/// Give every variable occurrence its own index, starting at `next`.
///
/// Unifying two terms in which no variable repeats can never bind a variable
/// to a term containing itself, so the result is always acyclic.
fn linearize(raw: &RawTerm, next: &mut u32) -> RawTerm {
    match raw {
        RawTerm::Var(_) => {
            let v = *next;
            *next += 1;
            RawTerm::Var(v)
        }
        RawTerm::Int(n) => RawTerm::Int(*n),
        RawTerm::App { f, kids } => RawTerm::App {
            f: *f,
            kids: kids.iter().map(|k| linearize(k, next)).collect(),
        },
    }
}

fn bindings_for(var_count: u32) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.fresh_vars(var_count);
    bindings
}

fn fresh_bindings() -> Bindings {
    let mut bindings = Bindings::new();
    bindings.fresh_vars(VAR_COUNT);
    bindings
}

proptest! {
    #[test]
    fn unify_against_ground_makes_terms_equal(
        a in raw_term_strategy(),
        b in ground_term_strategy(),
    ) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let ta = build_term(&a, &symbols, &terms);
        let tb = build_term(&b, &symbols, &terms);
        let mut bindings = fresh_bindings();

        if unify(ta, tb, &mut bindings, &terms) {
            prop_assert_eq!(bindings.resolve(ta, &terms), tb);
        }
    }

    #[test]
    fn unify_linear_terms_makes_them_equal(a in raw_term_strategy(), b in raw_term_strategy()) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let mut next = 0;
        let a = linearize(&a, &mut next);
        let b = linearize(&b, &mut next);
        let ta = build_term(&a, &symbols, &terms);
        let tb = build_term(&b, &symbols, &terms);
        let mut bindings = bindings_for(next);

        if unify(ta, tb, &mut bindings, &terms) {
            prop_assert_eq!(
                bindings.resolve(ta, &terms),
                bindings.resolve(tb, &terms)
            );
        }
    }

    #[test]
    fn unify_is_symmetric(a in raw_term_strategy(), b in ground_term_strategy()) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let ta = build_term(&a, &symbols, &terms);
        let tb = build_term(&b, &symbols, &terms);

        let forward = unify(ta, tb, &mut fresh_bindings(), &terms);
        let backward = unify(tb, ta, &mut fresh_bindings(), &terms);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn unify_with_self_binds_nothing(a in raw_term_strategy()) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let ta = build_term(&a, &symbols, &terms);
        let mut bindings = fresh_bindings();
        prop_assert!(unify(ta, ta, &mut bindings, &terms));
        prop_assert!(bindings.is_empty());
    }

    #[test]
    fn undo_restores_exact_state(
        first in ground_term_strategy(),
        pairs in prop::collection::vec((raw_term_strategy(), ground_term_strategy()), 1..6),
    ) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let mut bindings = fresh_bindings();

        // Some bindings before the mark
        let t = build_term(&first, &symbols, &terms);
        unify_or_undo(terms.var(0), t, &mut bindings, &terms);

        let snapshot = bindings.clone();
        let mark = bindings.mark();
        for (a, b) in &pairs {
            let ta = build_term(a, &symbols, &terms);
            let tb = build_term(b, &symbols, &terms);
            unify(ta, tb, &mut bindings, &terms);
            bindings.fresh_vars(2);
        }
        bindings.undo_to(mark);
        prop_assert_eq!(bindings, snapshot);
    }

    #[test]
    fn failed_unify_or_undo_leaves_no_trace(a in raw_term_strategy(), b in ground_term_strategy()) {
        let symbols = SymbolStore::new();
        let terms = TermStore::new();
        let ta = build_term(&a, &symbols, &terms);
        let tb = build_term(&b, &symbols, &terms);
        let mut bindings = fresh_bindings();
        let before = bindings.clone();

        if !unify_or_undo(ta, tb, &mut bindings, &terms) {
            prop_assert_eq!(bindings, before);
        }
    }
}
