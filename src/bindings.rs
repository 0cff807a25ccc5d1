use crate::term::{Term, TermId, TermStore};
use smallvec::SmallVec;

/// A point in binding history that [`Bindings::undo_to`] can return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindMark {
    trail: usize,
    vars: u32,
}

impl BindMark {
    /// Trail length at the time of the mark.
    pub fn trail_len(&self) -> usize {
        self.trail
    }

    /// Number of variables allocated at the time of the mark.
    pub fn var_count(&self) -> u32 {
        self.vars
    }
}

/// Variable bindings for one proof, plus the trail that undoes them.
///
/// Variables are dense slots `0..var_count()`. `None` means unbound.
/// Every binding is recorded on the trail, and the trail is the only way
/// bindings are ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    slots: Vec<Option<TermId>>,
    trail: Vec<u32>,
}

impl Bindings {
    /// Create an empty binding store.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            trail: Vec::new(),
        }
    }

    /// Allocate `n` fresh unbound variables, returning the index of the first.
    pub fn fresh_vars(&mut self, n: u32) -> u32 {
        let base = self.slots.len() as u32;
        self.slots.resize(self.slots.len() + n as usize, None);
        base
    }

    /// Number of allocated variables.
    pub fn var_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Bind an unbound variable to a term and record it on the trail.
    pub fn bind(&mut self, var: u32, term: TermId) {
        let idx = var as usize;
        if idx >= self.slots.len() {
            self.slots.resize(idx + 1, None);
        }
        debug_assert!(self.slots[idx].is_none(), "rebinding bound variable {var}");
        self.slots[idx] = Some(term);
        self.trail.push(var);
    }

    /// Get the binding for a variable, if any.
    pub fn get(&self, var: u32) -> Option<TermId> {
        self.slots.get(var as usize).copied().flatten()
    }

    /// Check if a variable is bound.
    pub fn is_bound(&self, var: u32) -> bool {
        self.get(var).is_some()
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    /// Check if no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Iterator over (var_index, term_id) pairs for bound variables.
    pub fn iter(&self) -> impl Iterator<Item = (u32, TermId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|tid| (i as u32, tid)))
    }

    /// Record the current state.
    pub fn mark(&self) -> BindMark {
        BindMark {
            trail: self.trail.len(),
            vars: self.var_count(),
        }
    }

    /// Unbind everything recorded since `mark`, newest first, and release
    /// variables allocated after it.
    pub fn undo_to(&mut self, mark: BindMark) {
        while self.trail.len() > mark.trail {
            if let Some(var) = self.trail.pop() {
                self.slots[var as usize] = None;
            }
        }
        self.slots.truncate(mark.vars as usize);
    }

    /// Follow bound variables until reaching an unbound variable or a
    /// non-variable term. Never mutates.
    pub fn deref(&self, term: TermId, terms: &TermStore) -> TermId {
        let mut current = term;
        while let Some(idx) = terms.is_var(current) {
            match self.get(idx) {
                Some(bound) => current = bound,
                None => break,
            }
        }
        current
    }

    /// Build a copy of `term` with every bound variable replaced by its value,
    /// all the way down. Unbound variables are left in place.
    ///
    /// Uses an explicit stack, so long lists do not exhaust the call stack.
    pub fn resolve(&self, term: TermId, terms: &TermStore) -> TermId {
        let mut work_stack: Vec<(TermId, bool)> = vec![(term, false)];
        let mut result_stack: Vec<TermId> = Vec::new();

        while let Some((tid, children_done)) = work_stack.pop() {
            if children_done {
                if let Some(Term::App(func, args)) = terms.resolve(tid) {
                    let n = args.len();
                    let new_args: SmallVec<[TermId; 4]> =
                        result_stack.drain(result_stack.len() - n..).collect();
                    result_stack.push(terms.app(func, new_args));
                }
                continue;
            }

            let derefed = self.deref(tid, terms);
            match terms.resolve(derefed) {
                Some(Term::App(_, args)) => {
                    work_stack.push((derefed, true));
                    // Reverse so the leftmost argument is finished first
                    for arg in args.iter().rev() {
                        work_stack.push((*arg, false));
                    }
                }
                _ => result_stack.push(derefed),
            }
        }

        debug_assert_eq!(result_stack.len(), 1);
        result_stack.pop().unwrap_or(term)
    }
}

#[cfg(test)]
#[path = "tests/bindings.rs"]
mod tests;
