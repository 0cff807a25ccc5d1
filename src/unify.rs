use crate::bindings::Bindings;
use crate::term::{Term, TermId, TermStore};
use smallvec::SmallVec;

#[cfg(feature = "tracing")]
use crate::trace::trace;

/// Unify two terms, recording every binding it makes on the trail.
///
/// Returns false if the terms do not unify. A failed unification may leave
/// partial bindings behind: callers take a [`Bindings::mark`] beforehand and
/// undo to it on failure.
///
/// Uses an explicit worklist to avoid recursion. There is no occurs-check, so
/// `X = f(X)` succeeds and builds a cyclic binding.
pub fn unify(t1: TermId, t2: TermId, bindings: &mut Bindings, terms: &TermStore) -> bool {
    let mut worklist: SmallVec<[(TermId, TermId); 32]> = SmallVec::new();
    worklist.push((t1, t2));

    while let Some((a, b)) = worklist.pop() {
        let a_deref = bindings.deref(a, terms);
        let b_deref = bindings.deref(b, terms);

        if a_deref == b_deref {
            // Hashconsing makes identical structure identical ids
            continue;
        }

        match (terms.resolve(a_deref), terms.resolve(b_deref)) {
            (Some(Term::Var(idx_a)), Some(Term::Var(idx_b))) => {
                // Younger variable points at the older one
                if idx_a < idx_b {
                    bindings.bind(idx_b, a_deref);
                } else {
                    bindings.bind(idx_a, b_deref);
                }
            }
            (Some(Term::Var(idx)), Some(_)) => bindings.bind(idx, b_deref),
            (Some(_), Some(Term::Var(idx))) => bindings.bind(idx, a_deref),
            (Some(Term::App(f1, args1)), Some(Term::App(f2, args2))) => {
                if f1 != f2 || args1.len() != args2.len() {
                    #[cfg(feature = "tracing")]
                    trace!("unify_functor_mismatch");
                    return false;
                }
                // Reverse so pairs are popped left to right
                for (x, y) in args1.iter().zip(args2.iter()).rev() {
                    worklist.push((*x, *y));
                }
            }
            // Distinct atoms, distinct numbers, or mixed kinds
            _ => {
                #[cfg(feature = "tracing")]
                trace!("unify_clash");
                return false;
            }
        }
    }

    true
}

/// Unify under a trail mark, undoing any partial bindings if it fails.
pub fn unify_or_undo(t1: TermId, t2: TermId, bindings: &mut Bindings, terms: &TermStore) -> bool {
    let mark = bindings.mark();
    if unify(t1, t2, bindings, terms) {
        true
    } else {
        bindings.undo_to(mark);
        false
    }
}

#[cfg(test)]
#[path = "tests/unify.rs"]
mod tests;
