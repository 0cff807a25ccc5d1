//! Machine - consult text into a database and run queries against it.

use std::fmt;
use std::sync::Arc;

use crate::database::{Database, DatabaseError, PredKey};
use crate::engine::Solutions;
use crate::parser::{parse_query, ParseError, ParsedTerm, Parser};
use crate::solution::Solution;
use crate::solve::{SolveConfig, Solver};
use crate::symbol::SymbolStore;
use crate::term::{Term, TermId, TermStore};

#[cfg(feature = "tracing")]
use crate::trace::{debug, warn};

/// Errors from consulting or querying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    Parse(ParseError),
    Database(DatabaseError),
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::Parse(e) => write!(f, "{}", e),
            MachineError::Database(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for MachineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MachineError::Parse(e) => Some(e),
            MachineError::Database(e) => Some(e),
        }
    }
}

impl From<ParseError> for MachineError {
    fn from(e: ParseError) -> Self {
        MachineError::Parse(e)
    }
}

impl From<DatabaseError> for MachineError {
    fn from(e: DatabaseError) -> Self {
        MachineError::Database(e)
    }
}

/// A clause database plus the settings queries run with.
///
/// Queries hold their own snapshot of the database: asserting while a
/// [`Solutions`] stream is alive copies the clauses instead of changing what
/// the running query sees.
#[derive(Clone, Default)]
pub struct Machine {
    db: Arc<Database>,
    config: SolveConfig,
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `config` for every query this machine runs.
    pub fn with_config(mut self, config: SolveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> SolveConfig {
        self.config
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn symbols(&self) -> &Arc<SymbolStore> {
        self.db.symbols()
    }

    pub fn terms(&self) -> &Arc<TermStore> {
        self.db.terms()
    }

    /// Read clauses from `text` and add them in order. `:- Goal.` directives
    /// run once, when reached.
    ///
    /// Stops at the first clause that fails to read or assert; clauses before
    /// it stay asserted.
    pub fn consult(&mut self, text: &str) -> Result<&mut Self, MachineError> {
        let symbols = Arc::clone(self.symbols());
        let terms = Arc::clone(self.terms());
        let directive = self.db.builtins().neck;
        let mut parser = Parser::new(text, &symbols, &terms);

        while let Some(clause) = parser.next_clause()? {
            match terms.resolve(clause.term) {
                Some(Term::App(f, args)) if f == directive && args.len() == 1 => {
                    self.run_directive(args[0], &clause);
                }
                _ => {
                    Arc::make_mut(&mut self.db).assert_term(clause.term)?;
                }
            }
        }

        #[cfg(feature = "tracing")]
        debug!(clauses = self.db.len(), "consulted");
        Ok(self)
    }

    fn run_directive(&self, goal: TermId, clause: &ParsedTerm) {
        let mut solver =
            Solver::with_config(Arc::clone(&self.db), goal, clause.var_count, self.config);
        if !solver.next_solution() {
            #[cfg(feature = "tracing")]
            warn!("directive failed");
        }
    }

    /// Add one clause built outside the reader. Variables in `head` and
    /// `body` are clause-local, `Var(0)` upward.
    pub fn assert_clause(&mut self, head: TermId, body: TermId) -> Result<PredKey, MachineError> {
        Ok(Arc::make_mut(&mut self.db).assert(head, body)?)
    }

    /// Lazily enumerate the solutions of `query`.
    pub fn query(&self, query: &str) -> Result<Solutions, MachineError> {
        let parsed = parse_query(query, self.symbols(), self.terms())?;
        Ok(self.query_parsed(parsed))
    }

    /// Solutions of an already-read query.
    pub fn query_parsed(&self, parsed: ParsedTerm) -> Solutions {
        Solutions::new(
            Arc::clone(&self.db),
            parsed.term,
            parsed.var_count,
            parsed.var_names,
            self.config,
        )
    }

    /// Whether `query` has at least one solution. Stops after the first.
    pub fn can_prove(&self, query: &str) -> Result<bool, MachineError> {
        Ok(self.query(query)?.next().is_some())
    }

    /// Every solution of `query`, in the order the search finds them.
    pub fn prove_all(&self, query: &str) -> Result<Vec<Solution>, MachineError> {
        Ok(self.query(query)?.collect())
    }

    /// Predicate indicators (`name/arity`) in order of first assertion.
    pub fn predicate_names(&self) -> Vec<String> {
        self.db
            .predicates()
            .iter()
            .map(|key| key.display(self.symbols()))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/machine.rs"]
mod tests;
