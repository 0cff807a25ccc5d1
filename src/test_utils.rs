use crate::bindings::Bindings;
use crate::machine::Machine;
use crate::symbol::SymbolStore;
use crate::term::TermStore;

pub(crate) fn setup() -> (SymbolStore, TermStore) {
    (SymbolStore::new(), TermStore::new())
}

/// Bindings with `n` fresh unbound variables, `Var(0)` .. `Var(n - 1)`.
pub(crate) fn with_vars(n: u32) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.fresh_vars(n);
    bindings
}

/// A machine that has consulted `program`.
pub(crate) fn machine(program: &str) -> Machine {
    let mut machine = Machine::new();
    machine.consult(program).expect("program should consult");
    machine
}

/// Render every solution of `query` for variable `name`.
pub(crate) fn answers(machine: &Machine, query: &str, name: &str) -> Vec<String> {
    machine
        .prove_all(query)
        .expect("query should parse")
        .iter()
        .map(|s| s.format(name).expect("variable should be in the query"))
        .collect()
}
