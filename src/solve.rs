//! Depth-first SLD resolution with an explicit choice-point stack.
//!
//! The solver owns one [`Bindings`] store for the whole search. Every binding
//! goes on the trail, and every choice point remembers the trail mark it was
//! pushed at, so backtracking is a single `undo_to`.
//!
//! Cut barriers are choice-stack depths. A clause body runs under the depth
//! the stack had before the clause's own choice point was pushed, so `!`
//! removes the remaining clauses along with anything the body created.
//! `call/N` and variable goals run under the depth at the time of the call,
//! which makes them opaque to cut.

use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::bindings::{BindMark, Bindings};
use crate::choice::{Alternative, ChoicePoint, Cont, Frame};
use crate::database::{Database, PredKey};
use crate::goal::{extend_goal, Goal};
use crate::symbol::Builtins;
use crate::term::{format_term, TermId, TermStore};
use crate::unify::unify;

#[cfg(feature = "tracing")]
use crate::trace::{debug, debug_span, trace, warn};

/// Search limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveConfig {
    /// Maximum goal dispatches across the whole search. `None` is unlimited.
    pub max_steps: Option<u64>,
}

impl SolveConfig {
    pub fn with_max_steps(max_steps: u64) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }
}

/// Counters for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveStats {
    pub steps: u64,
    pub backtracks: u64,
    pub choice_points_pushed: u64,
    pub solutions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// An unbound variable was called.
    Instantiation,
    /// A number, or a `call/N` target that cannot name a predicate.
    NotCallable,
}

/// A malformed goal met during the search. The branch that met it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveFault {
    pub kind: FaultKind,
    /// The offending goal, rendered.
    pub goal: String,
}

impl fmt::Display for SolveFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FaultKind::Instantiation => write!(f, "goal is not instantiated: {}", self.goal),
            FaultKind::NotCallable => write!(f, "goal is not callable: {}", self.goal),
        }
    }
}

/// Where the next call to [`Solver::next_solution`] picks up.
enum Resume {
    /// Prove this continuation.
    Start(Cont),
    /// A solution was just reported; look for the next one.
    Backtrack,
    /// Search finished or stopped.
    Done,
}

/// A resumable proof search for one query.
///
/// Holds its own handle on the database, so clauses asserted elsewhere after
/// the solver was created are not seen by it.
pub struct Solver {
    db: Arc<Database>,
    terms: Arc<TermStore>,
    builtins: Builtins,
    bindings: Bindings,
    /// State right after the query variables were allocated.
    root: BindMark,
    choices: Vec<ChoicePoint>,
    resume: Resume,
    config: SolveConfig,
    stats: SolveStats,
    faults: Vec<SolveFault>,
    budget_exhausted: bool,
}

impl Solver {
    /// Start a search for `goal`, whose variables are `Var(0..var_count)`.
    pub fn new(db: Arc<Database>, goal: TermId, var_count: u32) -> Self {
        Self::with_config(db, goal, var_count, SolveConfig::default())
    }

    pub fn with_config(
        db: Arc<Database>,
        goal: TermId,
        var_count: u32,
        config: SolveConfig,
    ) -> Self {
        let terms = Arc::clone(db.terms());
        let builtins = *db.builtins();
        let mut bindings = Bindings::new();
        bindings.fresh_vars(var_count);
        let root = bindings.mark();
        let start = Cont::single(Frame {
            goal,
            cut_barrier: 0,
        });
        Self {
            db,
            terms,
            builtins,
            bindings,
            root,
            choices: Vec::new(),
            resume: Resume::Start(start),
            config,
            stats: SolveStats::default(),
            faults: Vec::new(),
            budget_exhausted: false,
        }
    }

    /// Run until the next solution or the end of the search.
    ///
    /// Returns true when a solution was found; [`Solver::bindings`] then holds
    /// it until the next call.
    pub fn next_solution(&mut self) -> bool {
        #[cfg(feature = "tracing")]
        let _span = debug_span!("next_solution", solutions = self.stats.solutions).entered();

        let mut next = match mem::replace(&mut self.resume, Resume::Done) {
            Resume::Start(cont) => Some(cont),
            Resume::Backtrack => self.backtrack(),
            Resume::Done => return false,
        };

        while let Some(cont) = next {
            let Some((frame, rest)) = cont.pop() else {
                self.stats.solutions += 1;
                #[cfg(feature = "tracing")]
                debug!(steps = self.stats.steps, "solution");
                self.resume = Resume::Backtrack;
                return true;
            };
            if !self.charge_step() {
                self.choices.clear();
                self.bindings.undo_to(self.root);
                return false;
            }
            next = self.dispatch(frame, rest);
        }

        #[cfg(feature = "tracing")]
        debug!(stats = ?self.stats, "search_exhausted");
        self.bindings.undo_to(self.root);
        false
    }

    /// Prove the goal in `frame`, then `rest`. Returns the continuation to
    /// carry on with, or `None` once every alternative is used up.
    fn dispatch(&mut self, frame: Frame, rest: Cont) -> Option<Cont> {
        let goal = self.bindings.deref(frame.goal, &self.terms);

        // A goal reached through a bound variable is called, not inlined
        if goal != frame.goal && self.terms.is_var(frame.goal).is_some() {
            return Some(rest.push(Frame {
                goal,
                cut_barrier: self.choices.len(),
            }));
        }

        match Goal::classify(goal, &self.terms, &self.builtins) {
            Goal::True => Some(rest),
            Goal::Fail => self.backtrack(),
            Goal::Conj(left, right) => {
                let barrier = frame.cut_barrier;
                Some(
                    rest.push(Frame {
                        goal: right,
                        cut_barrier: barrier,
                    })
                    .push(Frame {
                        goal: left,
                        cut_barrier: barrier,
                    }),
                )
            }
            Goal::Disj(left, right) => {
                self.push_choice(ChoicePoint {
                    mark: self.bindings.mark(),
                    alternative: Alternative::Branch {
                        goal: right,
                        cut_barrier: frame.cut_barrier,
                    },
                    cont: rest.clone(),
                });
                Some(rest.push(Frame {
                    goal: left,
                    cut_barrier: frame.cut_barrier,
                }))
            }
            Goal::Cut => {
                #[cfg(feature = "tracing")]
                trace!(
                    to = frame.cut_barrier,
                    from = self.choices.len(),
                    "cut"
                );
                self.choices.truncate(frame.cut_barrier);
                Some(rest)
            }
            Goal::Call { target, extra } => {
                match extend_goal(target, &extra, &self.bindings, &self.terms) {
                    Some(callee) => Some(rest.push(Frame {
                        goal: callee,
                        cut_barrier: self.choices.len(),
                    })),
                    None => {
                        let target = self.bindings.deref(target, &self.terms);
                        let kind = match self.terms.is_var(target) {
                            Some(_) => FaultKind::Instantiation,
                            None => FaultKind::NotCallable,
                        };
                        self.fault(kind, goal)
                    }
                }
            }
            Goal::User(key) => match self.try_clauses(goal, key, 0, rest) {
                Some(cont) => Some(cont),
                None => self.backtrack(),
            },
            Goal::Unbound(_) => self.fault(FaultKind::Instantiation, goal),
            Goal::NotCallable => self.fault(FaultKind::NotCallable, goal),
        }
    }

    /// Try the clauses of `key` from index `start` against `goal`.
    ///
    /// On the first head that unifies, pushes a choice point for the clauses
    /// after it (if any) and returns the continuation with the renamed body in
    /// front. Bindings are back at the entry mark when this returns `None`.
    fn try_clauses(
        &mut self,
        goal: TermId,
        key: PredKey,
        start: usize,
        cont: Cont,
    ) -> Option<Cont> {
        let clauses = self.db.clauses_for(key);
        let barrier = self.choices.len();
        let mark = self.bindings.mark();

        for (index, clause) in clauses.iter().enumerate().skip(start) {
            let base = self.bindings.fresh_vars(clause.var_count);
            let (head, body) = clause.rename(base, &self.terms);
            if unify(head, goal, &mut self.bindings, &self.terms) {
                #[cfg(feature = "tracing")]
                trace!(clause = index, of = clauses.len(), "clause_head_unified");
                if index + 1 < clauses.len() {
                    self.choices.push(ChoicePoint {
                        mark,
                        alternative: Alternative::Clauses {
                            goal,
                            key,
                            next: index + 1,
                        },
                        cont: cont.clone(),
                    });
                    self.stats.choice_points_pushed += 1;
                }
                return Some(cont.push(Frame {
                    goal: body,
                    cut_barrier: barrier,
                }));
            }
            self.bindings.undo_to(mark);
        }

        #[cfg(feature = "tracing")]
        trace!(
            pred = %key.display(self.db.symbols()),
            "no_matching_clause"
        );
        None
    }

    /// Resume from the newest choice point that still has a way forward.
    fn backtrack(&mut self) -> Option<Cont> {
        while let Some(choice) = self.choices.pop() {
            self.stats.backtracks += 1;
            self.bindings.undo_to(choice.mark);
            match choice.alternative {
                Alternative::Branch { goal, cut_barrier } => {
                    #[cfg(feature = "tracing")]
                    trace!(depth = self.choices.len(), "retry_branch");
                    return Some(choice.cont.push(Frame { goal, cut_barrier }));
                }
                Alternative::Clauses { goal, key, next } => {
                    #[cfg(feature = "tracing")]
                    trace!(depth = self.choices.len(), next, "retry_clauses");
                    if let Some(cont) = self.try_clauses(goal, key, next, choice.cont) {
                        return Some(cont);
                    }
                }
            }
        }
        None
    }

    fn push_choice(&mut self, choice: ChoicePoint) {
        self.choices.push(choice);
        self.stats.choice_points_pushed += 1;
    }

    fn fault(&mut self, kind: FaultKind, goal: TermId) -> Option<Cont> {
        let goal = self.bindings.resolve(goal, &self.terms);
        let goal = format_term(goal, &self.terms, self.db.symbols()).unwrap_or_else(|e| e);
        let fault = SolveFault { kind, goal };
        #[cfg(feature = "tracing")]
        warn!(%fault, "goal_fault");
        self.faults.push(fault);
        self.backtrack()
    }

    /// Count one dispatch against the budget. False once it is spent.
    fn charge_step(&mut self) -> bool {
        if let Some(max) = self.config.max_steps {
            if self.stats.steps >= max {
                #[cfg(feature = "tracing")]
                warn!(max_steps = max, "step_budget_exhausted");
                self.budget_exhausted = true;
                return false;
            }
        }
        self.stats.steps += 1;
        true
    }

    /// Current bindings. After a successful [`Solver::next_solution`] these
    /// describe that solution.
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn terms(&self) -> &Arc<TermStore> {
        &self.terms
    }

    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Malformed goals met so far, oldest first.
    pub fn faults(&self) -> &[SolveFault] {
        &self.faults
    }

    /// Whether the search stopped because the step budget ran out.
    pub fn budget_exhausted(&self) -> bool {
        self.budget_exhausted
    }

    /// Number of live choice points.
    pub fn choice_depth(&self) -> usize {
        self.choices.len()
    }
}

#[cfg(test)]
#[path = "tests/solve.rs"]
mod tests;
