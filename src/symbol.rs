use lasso::{Spur, ThreadedRodeo};

/// A unique identifier for an atom or functor name.
/// This is an interned string ID for fast equality comparison.
pub type FuncId = Spur;

/// Thread-safe symbol store for interning atom and functor names.
///
/// Guarantees:
/// - Same string always produces same FuncId
/// - Different strings always produce different FuncIds
/// - FuncId can be resolved back to the original string
pub struct SymbolStore {
    rodeo: ThreadedRodeo,
}

impl SymbolStore {
    /// Create a new empty symbol store.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Intern a symbol string, returning its unique FuncId.
    /// If the symbol was already interned, returns the existing FuncId.
    pub fn intern(&self, name: &str) -> FuncId {
        self.rodeo.get_or_intern(name)
    }

    /// Resolve a FuncId back to its string representation.
    /// Returns None if the FuncId was not created by this store.
    pub fn resolve(&self, id: FuncId) -> Option<&str> {
        self.rodeo.try_resolve(&id)
    }

    /// Check if a symbol string has already been interned.
    pub fn contains(&self, name: &str) -> bool {
        self.rodeo.contains(name)
    }

    /// Get the FuncId for a symbol if it exists, without interning.
    pub fn get(&self, name: &str) -> Option<FuncId> {
        self.rodeo.get(name)
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Names the solver and reader give fixed meaning to, interned once per store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Builtins {
    pub true_: FuncId,
    pub fail: FuncId,
    pub false_: FuncId,
    pub comma: FuncId,
    pub semicolon: FuncId,
    pub cut: FuncId,
    pub call: FuncId,
    pub neck: FuncId,
    pub query: FuncId,
    pub dot: FuncId,
    pub nil: FuncId,
    pub curly: FuncId,
    pub minus: FuncId,
}

impl Builtins {
    /// Intern every reserved name into `symbols`.
    pub fn intern(symbols: &SymbolStore) -> Self {
        Self {
            true_: symbols.intern("true"),
            fail: symbols.intern("fail"),
            false_: symbols.intern("false"),
            comma: symbols.intern(","),
            semicolon: symbols.intern(";"),
            cut: symbols.intern("!"),
            call: symbols.intern("call"),
            neck: symbols.intern(":-"),
            query: symbols.intern("?-"),
            dot: symbols.intern("."),
            nil: symbols.intern("[]"),
            curly: symbols.intern("{}"),
            minus: symbols.intern("-"),
        }
    }
}

#[cfg(test)]
#[path = "tests/symbol.rs"]
mod tests;
