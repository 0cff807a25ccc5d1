//! Engine - lazy solution streams over a [`Solver`].
//!
//! `Solutions` turns a resumable search into an iterator of [`Solution`]
//! snapshots. Each call to `next` resumes the search where the previous
//! solution left it, so taking only the first solution never explores the
//! rest of the search tree.

use std::sync::Arc;

use crate::database::Database;
use crate::solution::Solution;
use crate::solve::{SolveConfig, SolveFault, SolveStats, Solver};
use crate::term::TermId;

/// A query in progress.
pub struct Solutions {
    solver: Solver,
    /// Query variable names with their variable indices.
    names: Vec<(String, u32)>,
}

impl Solutions {
    /// Start solving `goal`. Its variables must be `Var(0..var_count)`;
    /// `names` picks out the ones reported in each solution.
    pub fn new(
        db: Arc<Database>,
        goal: TermId,
        var_count: u32,
        names: Vec<(String, u32)>,
        config: SolveConfig,
    ) -> Self {
        Self {
            solver: Solver::with_config(db, goal, var_count, config),
            names,
        }
    }

    pub fn stats(&self) -> SolveStats {
        self.solver.stats()
    }

    pub fn faults(&self) -> &[SolveFault] {
        self.solver.faults()
    }

    pub fn budget_exhausted(&self) -> bool {
        self.solver.budget_exhausted()
    }

    /// Get reference to the underlying solver.
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    /// Collect all remaining solutions.
    pub fn collect_solutions(&mut self) -> Vec<Solution> {
        self.by_ref().collect()
    }
}

impl Iterator for Solutions {
    type Item = Solution;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.solver.next_solution() {
            return None;
        }
        let db = self.solver.database();
        Some(Solution::capture(
            &self.names,
            self.solver.bindings(),
            Arc::clone(db.symbols()),
            Arc::clone(db.terms()),
        ))
    }
}

/// Convenience function to run a query and collect all solutions.
pub fn query(
    db: Arc<Database>,
    goal: TermId,
    var_count: u32,
    names: Vec<(String, u32)>,
) -> Vec<Solution> {
    Solutions::new(db, goal, var_count, names, SolveConfig::default()).collect()
}

/// Convenience function to run a query and get the first solution.
pub fn query_first(
    db: Arc<Database>,
    goal: TermId,
    var_count: u32,
    names: Vec<(String, u32)>,
) -> Option<Solution> {
    Solutions::new(db, goal, var_count, names, SolveConfig::default()).next()
}

/// Whether `goal` has at least one solution. Stops at the first.
pub fn can_prove(db: Arc<Database>, goal: TermId, var_count: u32) -> bool {
    Solver::new(db, goal, var_count).next_solution()
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests;
