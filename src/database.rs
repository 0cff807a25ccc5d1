//! Clause database: ordered clauses per predicate.
//!
//! Clauses are stored with clause-local variables `Var(0..var_count)` and
//! renamed apart at each activation. Order of assertion is preserved and is
//! the order in which the solver tries them.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::symbol::{Builtins, FuncId, SymbolStore};
use crate::term::{format_term, Term, TermId, TermStore};

/// Predicate indicator: name and arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredKey {
    pub name: FuncId,
    pub arity: usize,
}

impl PredKey {
    pub fn new(name: FuncId, arity: usize) -> Self {
        Self { name, arity }
    }

    /// Render as `name/arity`.
    pub fn display(&self, symbols: &SymbolStore) -> String {
        format!(
            "{}/{}",
            symbols.resolve(self.name).unwrap_or("?"),
            self.arity
        )
    }
}

/// A stored clause. Facts have body `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause {
    pub head: TermId,
    pub body: TermId,
    /// Number of clause-local variables (`Var(0)` .. `Var(var_count - 1)`).
    pub var_count: u32,
}

impl Clause {
    /// Head and body renamed so local `Var(i)` becomes `Var(base + i)`.
    pub fn rename(&self, base: u32, terms: &TermStore) -> (TermId, TermId) {
        if self.var_count == 0 {
            return (self.head, self.body);
        }
        (terms.shift_vars(self.head, base), terms.shift_vars(self.body, base))
    }
}

/// Reasons a clause is rejected at assertion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    /// The head is a variable or a number.
    HeadNotCallable(String),
    /// A goal position in the body holds a number.
    BodyNotCallable(String),
    /// The head would redefine a control construct.
    ControlConstruct(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::HeadNotCallable(head) => {
                write!(f, "clause head is not callable: {}", head)
            }
            DatabaseError::BodyNotCallable(goal) => {
                write!(f, "clause body goal is not callable: {}", goal)
            }
            DatabaseError::ControlConstruct(pred) => {
                write!(f, "cannot add clauses to control construct {}", pred)
            }
        }
    }
}

impl std::error::Error for DatabaseError {}

/// Highest `call/N` arity the solver dispatches as a meta-call.
pub const MAX_CALL_ARITY: usize = 8;

/// Ordered, append-only clause storage indexed by predicate.
///
/// Shares its symbol and term stores with everything that reads the clauses,
/// so clause terms stay valid for solvers and solutions created from it.
#[derive(Clone)]
pub struct Database {
    symbols: Arc<SymbolStore>,
    terms: Arc<TermStore>,
    builtins: Builtins,
    predicates: HashMap<PredKey, Vec<Clause>>,
    /// Predicates in order of first assertion.
    order: Vec<PredKey>,
    clause_count: usize,
}

impl Database {
    /// Create an empty database with fresh stores.
    pub fn new() -> Self {
        Self::with_stores(Arc::new(SymbolStore::new()), Arc::new(TermStore::new()))
    }

    /// Create an empty database over existing stores.
    pub fn with_stores(symbols: Arc<SymbolStore>, terms: Arc<TermStore>) -> Self {
        let builtins = Builtins::intern(&symbols);
        Self {
            symbols,
            terms,
            builtins,
            predicates: HashMap::new(),
            order: Vec::new(),
            clause_count: 0,
        }
    }

    pub fn symbols(&self) -> &Arc<SymbolStore> {
        &self.symbols
    }

    pub fn terms(&self) -> &Arc<TermStore> {
        &self.terms
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Append a clause given as head and body terms.
    ///
    /// Variables in both are clause-local indices, as produced by the reader.
    pub fn assert(&mut self, head: TermId, body: TermId) -> Result<PredKey, DatabaseError> {
        let key = match self.terms.functor(head) {
            Some((name, arity)) => PredKey::new(name, arity),
            None => return Err(DatabaseError::HeadNotCallable(self.render(head))),
        };
        if self.is_control(key) {
            return Err(DatabaseError::ControlConstruct(key.display(&self.symbols)));
        }
        self.check_body(body)?;

        let var_count = [head, body]
            .iter()
            .filter_map(|&t| self.terms.max_var(t))
            .max()
            .map_or(0, |max| max + 1);

        let clauses = self.predicates.entry(key).or_insert_with(|| {
            self.order.push(key);
            Vec::new()
        });
        clauses.push(Clause {
            head,
            body,
            var_count,
        });
        self.clause_count += 1;
        Ok(key)
    }

    /// Append a fact.
    pub fn assert_fact(&mut self, head: TermId) -> Result<PredKey, DatabaseError> {
        let body = self.terms.atom(self.builtins.true_);
        self.assert(head, body)
    }

    /// Append a clause term: `Head :- Body` or a bare head.
    pub fn assert_term(&mut self, clause: TermId) -> Result<PredKey, DatabaseError> {
        match self.terms.resolve(clause) {
            Some(Term::App(f, args)) if f == self.builtins.neck && args.len() == 2 => {
                self.assert(args[0], args[1])
            }
            _ => self.assert_fact(clause),
        }
    }

    /// Clauses for a predicate in assertion order; empty when unknown.
    pub fn clauses_for(&self, key: PredKey) -> &[Clause] {
        self.predicates.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Known predicates in order of first assertion.
    pub fn predicates(&self) -> &[PredKey] {
        &self.order
    }

    /// Total number of stored clauses.
    pub fn len(&self) -> usize {
        self.clause_count
    }

    pub fn is_empty(&self) -> bool {
        self.clause_count == 0
    }

    /// Whether `key` names a construct the solver interprets itself.
    pub fn is_control(&self, key: PredKey) -> bool {
        let b = &self.builtins;
        match key.arity {
            0 => [b.true_, b.fail, b.false_, b.cut].contains(&key.name),
            2 if key.name == b.comma || key.name == b.semicolon => true,
            n => key.name == b.call && (1..=MAX_CALL_ARITY).contains(&n),
        }
    }

    /// Reject numbers in goal positions, looking through `,` and `;`.
    fn check_body(&self, body: TermId) -> Result<(), DatabaseError> {
        let mut stack: SmallVec<[TermId; 8]> = SmallVec::new();
        stack.push(body);
        while let Some(goal) = stack.pop() {
            match self.terms.resolve(goal) {
                Some(Term::Int(_)) | None => {
                    return Err(DatabaseError::BodyNotCallable(self.render(goal)))
                }
                Some(Term::App(f, args))
                    if args.len() == 2
                        && (f == self.builtins.comma || f == self.builtins.semicolon) =>
                {
                    stack.push(args[1]);
                    stack.push(args[0]);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn render(&self, term: TermId) -> String {
        format_term(term, &self.terms, &self.symbols).unwrap_or_else(|e| e)
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/database.rs"]
mod tests;
