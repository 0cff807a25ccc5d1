//! Solution snapshots.

use std::fmt;
use std::sync::Arc;

use crate::bindings::Bindings;
use crate::symbol::SymbolStore;
use crate::term::{format_term, TermId, TermStore};

/// The query's named variables as they stood when one proof succeeded.
///
/// Every value is fully resolved, so a solution stays valid after the search
/// moves on. Variables that were still unbound print as `_G<id>`.
#[derive(Clone)]
pub struct Solution {
    values: Vec<(String, TermId)>,
    symbols: Arc<SymbolStore>,
    terms: Arc<TermStore>,
}

impl Solution {
    /// Snapshot `names` (query variable name and index) under `bindings`.
    pub fn capture(
        names: &[(String, u32)],
        bindings: &Bindings,
        symbols: Arc<SymbolStore>,
        terms: Arc<TermStore>,
    ) -> Self {
        let values = names
            .iter()
            .map(|(name, var)| {
                let value = bindings.resolve(terms.var(*var), &terms);
                (name.clone(), value)
            })
            .collect();
        Self {
            values,
            symbols,
            terms,
        }
    }

    /// Value of the named variable.
    pub fn get(&self, name: &str) -> Option<TermId> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    /// Canonical rendering of the named variable's value.
    pub fn format(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| self.render(value))
    }

    /// Name and value pairs in order of first occurrence in the query.
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermId)> + '_ {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn terms(&self) -> &TermStore {
        &self.terms
    }

    fn render(&self, value: TermId) -> String {
        format_term(value, &self.terms, &self.symbols).unwrap_or_else(|e| e)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str("true");
        }
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} = {}", name, self.render(*value))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(n, v)| (n, self.render(*v))))
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/solution.rs"]
mod tests;
