//! Goal classification.
//!
//! A goal is an ordinary term. Before the solver acts on one it dereferences
//! it and classifies it into one of a fixed set of forms. Conjunctions and
//! disjunctions are decomposed one level at a time, so cut scoping follows
//! the body's tree shape.

use smallvec::SmallVec;

use crate::bindings::Bindings;
use crate::database::{PredKey, MAX_CALL_ARITY};
use crate::symbol::Builtins;
use crate::term::{Term, TermId, TermStore};

/// The dereferenced form of a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Goal {
    /// `true`
    True,
    /// `fail` or `false`
    Fail,
    /// `(A, B)`
    Conj(TermId, TermId),
    /// `(A ; B)`
    Disj(TermId, TermId),
    /// `!`
    Cut,
    /// `call(G, Extra...)`: `G` with the extra arguments appended.
    Call {
        target: TermId,
        extra: SmallVec<[TermId; 4]>,
    },
    /// A goal resolved against the clause database.
    User(PredKey),
    /// An unbound variable in goal position.
    Unbound(u32),
    /// A number in goal position.
    NotCallable,
}

impl Goal {
    /// Classify a dereferenced goal term.
    pub fn classify(goal: TermId, terms: &TermStore, builtins: &Builtins) -> Goal {
        match terms.resolve(goal) {
            Some(Term::Var(idx)) => Goal::Unbound(idx),
            Some(Term::Atom(name)) => {
                if name == builtins.true_ {
                    Goal::True
                } else if name == builtins.fail || name == builtins.false_ {
                    Goal::Fail
                } else if name == builtins.cut {
                    Goal::Cut
                } else {
                    Goal::User(PredKey::new(name, 0))
                }
            }
            Some(Term::App(name, args)) => {
                if args.len() == 2 && name == builtins.comma {
                    Goal::Conj(args[0], args[1])
                } else if args.len() == 2 && name == builtins.semicolon {
                    Goal::Disj(args[0], args[1])
                } else if name == builtins.call && args.len() <= MAX_CALL_ARITY {
                    Goal::Call {
                        target: args[0],
                        extra: args[1..].iter().copied().collect(),
                    }
                } else {
                    Goal::User(PredKey::new(name, args.len()))
                }
            }
            Some(Term::Int(_)) | None => Goal::NotCallable,
        }
    }
}

/// Build the goal `call(Target, Extra...)` stands for.
///
/// An atom target becomes a compound over `extra`; a compound target gets
/// `extra` appended to its arguments. Returns `None` when the target is an
/// unbound variable or a number.
pub fn extend_goal(
    target: TermId,
    extra: &[TermId],
    bindings: &Bindings,
    terms: &TermStore,
) -> Option<TermId> {
    let target = bindings.deref(target, terms);
    match terms.resolve(target)? {
        Term::Atom(name) => Some(if extra.is_empty() {
            target
        } else {
            terms.app(name, extra.iter().copied().collect())
        }),
        Term::App(name, args) => {
            if extra.is_empty() {
                return Some(target);
            }
            let mut all = args;
            all.extend(extra.iter().copied());
            Some(terms.app(name, all))
        }
        Term::Var(_) | Term::Int(_) => None,
    }
}

#[cfg(test)]
#[path = "tests/goal.rs"]
mod tests;
