use crate::symbol::{FuncId, SymbolStore};
use hashbrown::HashMap;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};

/// Unique identifier for a term in the term store.
/// TermIds are stable and can be compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Get the raw u32 value (for debugging/display).
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A logical term.
///
/// Structure is immutable once interned. A `Var` carries only its identity;
/// whether it is bound lives in [`crate::bindings::Bindings`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A logic variable, identified by index.
    Var(u32),
    /// A constant name. The empty list is the atom `[]`.
    Atom(FuncId),
    /// An integer constant.
    Int(i64),
    /// A compound: functor applied to one or more arguments.
    App(FuncId, SmallVec<[TermId; 4]>),
}

/// Number of shards for hashcons maps (power of 2 for fast modulo).
const NUM_SHARDS: usize = 16;

/// Thread-safe term store with hashconsing.
///
/// Guarantees:
/// - Structurally equal terms get the same TermId
/// - TermId can be resolved back to the term
/// - All terms (including variables) are hashconsed
pub struct TermStore {
    /// Central storage of all terms, indexed by TermId.
    nodes: RwLock<Vec<Term>>,
    /// Sharded hashcons maps for reducing contention.
    shards: [RwLock<HashMap<Term, TermId>>; NUM_SHARDS],
}

impl TermStore {
    /// Create a new empty term store.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| RwLock::new(HashMap::new()));
        Self {
            nodes: RwLock::new(Vec::new()),
            shards,
        }
    }

    /// Intern a term, returning its TermId.
    /// If the term already exists, returns the existing TermId.
    fn intern(&self, term: Term) -> TermId {
        let shard = &self.shards[Self::shard_index(&term)];

        // Fast path: check if term exists (read lock)
        if let Some(&id) = shard.read().get(&term) {
            return id;
        }

        let mut map = shard.write();
        // Double-check after acquiring write lock
        if let Some(&id) = map.get(&term) {
            return id;
        }

        let id = {
            let mut nodes = self.nodes.write();
            let id = TermId(nodes.len() as u32);
            nodes.push(term.clone());
            id
        };
        map.insert(term, id);
        id
    }

    /// Create a variable term.
    /// Variables are hashconsed: same index always returns same TermId.
    pub fn var(&self, index: u32) -> TermId {
        self.intern(Term::Var(index))
    }

    /// Create an atom.
    pub fn atom(&self, name: FuncId) -> TermId {
        self.intern(Term::Atom(name))
    }

    /// Create an integer.
    pub fn int(&self, value: i64) -> TermId {
        self.intern(Term::Int(value))
    }

    /// Create a compound term. An empty argument list yields the atom.
    pub fn app(&self, func: FuncId, args: SmallVec<[TermId; 4]>) -> TermId {
        if args.is_empty() {
            self.atom(func)
        } else {
            self.intern(Term::App(func, args))
        }
    }

    /// Create a unary compound.
    pub fn app1(&self, func: FuncId, arg: TermId) -> TermId {
        self.app(func, smallvec::smallvec![arg])
    }

    /// Create a binary compound.
    pub fn app2(&self, func: FuncId, left: TermId, right: TermId) -> TermId {
        self.app(func, smallvec::smallvec![left, right])
    }

    /// Build a list from `items` ending in `tail` using the `.`/2 and `[]` names.
    pub fn list(&self, dot: FuncId, items: &[TermId], tail: TermId) -> TermId {
        items
            .iter()
            .rev()
            .fold(tail, |acc, &item| self.app2(dot, item, acc))
    }

    /// Resolve a TermId to its term.
    /// Returns None if the TermId is invalid.
    pub fn resolve(&self, id: TermId) -> Option<Term> {
        self.nodes.read().get(id.0 as usize).cloned()
    }

    /// Check if a term is a variable.
    pub fn is_var(&self, id: TermId) -> Option<u32> {
        match self.resolve(id)? {
            Term::Var(idx) => Some(idx),
            _ => None,
        }
    }

    /// Check if a term is a compound, returning functor and arguments.
    pub fn is_app(&self, id: TermId) -> Option<(FuncId, SmallVec<[TermId; 4]>)> {
        match self.resolve(id)? {
            Term::App(f, args) => Some((f, args)),
            _ => None,
        }
    }

    /// Name and arity of an atom or compound; None for variables and numbers.
    pub fn functor(&self, id: TermId) -> Option<(FuncId, usize)> {
        match self.resolve(id)? {
            Term::Atom(f) => Some((f, 0)),
            Term::App(f, args) => Some((f, args.len())),
            Term::Var(_) | Term::Int(_) => None,
        }
    }

    /// Number of distinct terms interned so far.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild `term` with every `Var(i)` replaced by `Var(i + offset)`.
    ///
    /// Ground subterms are returned unchanged, so renaming a fact with few
    /// variables touches only the spine that leads to them.
    ///
    /// Uses explicit work and result stacks, so clauses holding long lists do
    /// not exhaust the call stack.
    pub fn shift_vars(&self, term: TermId, offset: u32) -> TermId {
        if offset == 0 {
            return term;
        }
        let mut work_stack: Vec<(TermId, bool)> = vec![(term, false)];
        let mut result_stack: Vec<TermId> = Vec::new();

        while let Some((tid, children_done)) = work_stack.pop() {
            match self.resolve(tid) {
                Some(Term::Var(idx)) => result_stack.push(self.var(idx + offset)),
                Some(Term::App(func, args)) if children_done => {
                    let new_args: SmallVec<[TermId; 4]> =
                        result_stack.drain(result_stack.len() - args.len()..).collect();
                    if new_args == args {
                        result_stack.push(tid);
                    } else {
                        result_stack.push(self.app(func, new_args));
                    }
                }
                Some(Term::App(_, args)) => {
                    work_stack.push((tid, true));
                    // Reverse so the leftmost argument is finished first
                    for arg in args.iter().rev() {
                        work_stack.push((*arg, false));
                    }
                }
                _ => result_stack.push(tid),
            }
        }

        debug_assert_eq!(result_stack.len(), 1);
        result_stack.pop().unwrap_or(term)
    }

    /// Largest variable index occurring in `term`, if any.
    pub fn max_var(&self, term: TermId) -> Option<u32> {
        let mut stack: SmallVec<[TermId; 16]> = SmallVec::new();
        stack.push(term);
        let mut max = None;
        while let Some(t) = stack.pop() {
            match self.resolve(t) {
                Some(Term::Var(idx)) => max = max.max(Some(idx)),
                Some(Term::App(_, args)) => stack.extend(args.iter().copied()),
                _ => {}
            }
        }
        max
    }

    /// Get the shard index for a term (for hashconsing distribution).
    fn shard_index(term: &Term) -> usize {
        let mut hasher = FxHasher::default();
        term.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }
}

impl Default for TermStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a term in canonical `functor(arg, arg)` form.
///
/// Lists are not re-sugared: `[a]` prints as `'.'(a, [])`. Unbound variables
/// print as `_G<index>`.
pub fn format_term(
    term: TermId,
    terms: &TermStore,
    symbols: &SymbolStore,
) -> Result<String, String> {
    /// Output still to produce, newest on top.
    enum Pending {
        Term(TermId),
        Text(&'static str),
    }

    fn name_of(symbols: &SymbolStore, func: FuncId) -> Result<&str, String> {
        symbols
            .resolve(func)
            .ok_or_else(|| format!("Unknown symbol for func id {:?}", func))
    }

    let mut out = String::new();
    let mut stack = vec![Pending::Term(term)];
    while let Some(pending) = stack.pop() {
        let term = match pending {
            Pending::Text(text) => {
                out.push_str(text);
                continue;
            }
            Pending::Term(term) => term,
        };
        match terms.resolve(term) {
            Some(Term::Var(idx)) => {
                out.push_str("_G");
                out.push_str(&idx.to_string());
            }
            Some(Term::Int(n)) => out.push_str(&n.to_string()),
            Some(Term::Atom(func)) => push_atom(name_of(symbols, func)?, &mut out),
            Some(Term::App(func, args)) => {
                push_atom(name_of(symbols, func)?, &mut out);
                out.push('(');
                stack.push(Pending::Text(")"));
                for (i, arg) in args.iter().enumerate().rev() {
                    stack.push(Pending::Term(*arg));
                    if i > 0 {
                        stack.push(Pending::Text(", "));
                    }
                }
            }
            None => return Err(format!("Unknown term id {:?}", term)),
        }
    }
    Ok(out)
}

pub(crate) const SYMBOL_CHARS: &str = "+-*/\\^<>=~:.?@#&$";

/// Append an atom name, quoting it when it would not read back as the same atom.
fn push_atom(name: &str, out: &mut String) {
    if atom_needs_quotes(name) {
        out.push('\'');
        for ch in name.chars() {
            match ch {
                '\'' => out.push_str("\\'"),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                _ => out.push(ch),
            }
        }
        out.push('\'');
    } else {
        out.push_str(name);
    }
}

fn atom_needs_quotes(name: &str) -> bool {
    if matches!(name, "[]" | "!" | ";" | "{}") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        None => true,
        Some(first) if first.is_ascii_lowercase() => {
            !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) if name == "." => true,
        Some(_) => !name.chars().all(|c| SYMBOL_CHARS.contains(c)),
    }
}
