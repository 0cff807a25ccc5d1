pub mod bindings;
pub mod choice;
pub mod database;
pub mod engine;
pub mod goal;
pub mod machine;
pub mod parser;
pub mod repl;
pub mod solution;
pub mod solve;
pub mod symbol;
pub mod term;
pub mod trace;
pub mod unify;

#[cfg(test)]
pub(crate) mod test_utils;
