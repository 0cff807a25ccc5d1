//! Continuations and choice points.
//!
//! A continuation is the list of goals still to prove. It is persistent: a
//! choice point keeps the continuation it must resume with while the search
//! keeps extending the same tail, so the shared suffix is never copied.

use std::rc::Rc;

use crate::bindings::BindMark;
use crate::database::PredKey;
use crate::term::TermId;

/// One pending goal together with the cut barrier it runs under.
///
/// `cut_barrier` is the choice-stack depth a `!` in this goal cuts back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub goal: TermId,
    pub cut_barrier: usize,
}

struct ContNode {
    frame: Frame,
    next: Cont,
}

/// Persistent stack of frames. Cloning is O(1).
#[derive(Clone, Default)]
pub struct Cont(Option<Rc<ContNode>>);

impl Cont {
    /// The empty continuation: nothing left to prove.
    pub fn empty() -> Self {
        Cont(None)
    }

    /// A continuation holding a single frame.
    pub fn single(frame: Frame) -> Self {
        Cont::empty().push(frame)
    }

    /// New continuation with `frame` in front of this one.
    pub fn push(&self, frame: Frame) -> Cont {
        Cont(Some(Rc::new(ContNode {
            frame,
            next: self.clone(),
        })))
    }

    /// Split into the first frame and the rest.
    pub fn pop(&self) -> Option<(Frame, Cont)> {
        self.0
            .as_ref()
            .map(|node| (node.frame, node.next.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames().count()
    }

    /// Frames front to back.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        let mut cursor = self.0.as_deref();
        std::iter::from_fn(move || {
            let node = cursor?;
            cursor = node.next.0.as_deref();
            Some(node.frame)
        })
    }
}

impl Drop for Cont {
    // Unlink uniquely owned nodes one at a time so long continuations do not
    // recurse on drop.
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.next.0.take(),
                Err(_) => break,
            }
        }
    }
}

impl std::fmt::Debug for Cont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.frames()).finish()
    }
}

/// What to try when the search backtracks into a choice point.
#[derive(Debug, Clone)]
pub enum Alternative {
    /// Remaining clauses of `key`, starting at index `next`, for `goal`.
    Clauses {
        goal: TermId,
        key: PredKey,
        next: usize,
    },
    /// The right branch of a disjunction.
    Branch { goal: TermId, cut_barrier: usize },
}

/// Saved search state.
#[derive(Debug, Clone)]
pub struct ChoicePoint {
    /// Bindings to restore before resuming.
    pub mark: BindMark,
    pub alternative: Alternative,
    /// Goals to prove after the alternative succeeds.
    pub cont: Cont,
}

#[cfg(test)]
#[path = "tests/choice.rs"]
mod tests;
