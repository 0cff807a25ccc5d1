//! Repl - line-oriented command processor.
//!
//! Supports:
//! - `<clause>.` to add a clause
//! - `?- <goal>.` to run a query and show its first answer
//! - `next` / `more <n>` to continue the active query
//! - `reset`, `load <file>`, `list`, `help`, `quit`/`exit`

use std::io::{self, BufRead, Write};

use crate::engine::Solutions;
use crate::machine::{Machine, MachineError};
use crate::solve::SolveConfig;

/// What the caller should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Print(String),
    Quit,
}

/// REPL errors.
#[derive(Debug)]
pub enum ReplError {
    /// Reading or asserting clauses, or reading a query.
    Machine(MachineError),
    /// IO error.
    Io(io::Error),
    /// Malformed command.
    Usage(String),
}

impl std::fmt::Display for ReplError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplError::Machine(e) => write!(f, "{}", e),
            ReplError::Io(e) => write!(f, "IO error: {}", e),
            ReplError::Usage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ReplError {}

impl From<MachineError> for ReplError {
    fn from(e: MachineError) -> Self {
        ReplError::Machine(e)
    }
}

impl From<io::Error> for ReplError {
    fn from(e: io::Error) -> Self {
        ReplError::Io(e)
    }
}

/// REPL state.
pub struct Repl {
    machine: Machine,
    active: Option<Solutions>,
    answer_count: usize,
    prompt: String,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            machine: Machine::new(),
            active: None,
            answer_count: 0,
            prompt: "?- ".to_string(),
        }
    }

    /// Run queries under `config`.
    pub fn with_config(mut self, config: SolveConfig) -> Self {
        self.machine = self.machine.with_config(config);
        self
    }

    /// Set the prompt.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    /// Run the REPL with the given input and output streams.
    pub fn run<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> io::Result<()> {
        writeln!(output, "sldlog. Type 'help' for commands.")?;
        loop {
            write!(output, "{}", self.prompt)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                break;
            }

            match self.process_line(&line) {
                Ok(ReplAction::Continue) => {}
                Ok(ReplAction::Quit) => break,
                Ok(ReplAction::Print(msg)) => writeln!(output, "{}", msg.trim_end())?,
                Err(e) => writeln!(output, "Error: {}", e)?,
            }
        }
        Ok(())
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, input: &str) -> Result<ReplAction, ReplError> {
        let line = input.trim();

        if line.is_empty() || line.starts_with('%') {
            return Ok(ReplAction::Continue);
        }

        match line {
            "help" => return Ok(ReplAction::Print(help_text().to_string())),
            "quit" | "exit" | "halt." => return Ok(ReplAction::Quit),
            "list" => return Ok(ReplAction::Print(self.list_predicates())),
            "next" => return self.next_answers(1).map(ReplAction::Print),
            "reset" => {
                self.reset_active_query();
                return Ok(ReplAction::Print("Query reset.".to_string()));
            }
            _ => {}
        }

        if let Some(rest) = line.strip_prefix("more ") {
            let count: usize = rest
                .trim()
                .parse()
                .map_err(|_| ReplError::Usage("Invalid count for 'more'. Usage: more <n>".to_string()))?;
            if count == 0 {
                return Err(ReplError::Usage("Count for 'more' must be > 0".to_string()));
            }
            return self.next_answers(count).map(ReplAction::Print);
        }

        if let Some(path) = line.strip_prefix("load ") {
            self.reset_active_query();
            return self.load_file(path.trim()).map(ReplAction::Print);
        }

        if let Some(query) = line.strip_prefix("?-") {
            self.reset_active_query();
            return self.run_query(query.trim()).map(ReplAction::Print);
        }

        self.reset_active_query();
        self.machine.consult(line)?;
        Ok(ReplAction::Continue)
    }

    /// Consult a file. Returns a summary line.
    pub fn load_file(&mut self, path: &str) -> Result<String, ReplError> {
        let content = std::fs::read_to_string(path)?;
        let before = self.machine.database().len();
        self.machine.consult(&content)?;
        let added = self.machine.database().len() - before;
        Ok(format!("Loaded {} clause(s) from '{}'", added, path))
    }

    fn list_predicates(&self) -> String {
        let names = self.machine.predicate_names();
        if names.is_empty() {
            "No predicates defined.".to_string()
        } else {
            names.join("\n")
        }
    }

    fn run_query(&mut self, query: &str) -> Result<String, ReplError> {
        let solutions = self.machine.query(query)?;
        self.active = Some(solutions);
        self.answer_count = 0;
        self.next_answers(1)
    }

    fn next_answers(&mut self, count: usize) -> Result<String, ReplError> {
        let solutions = match self.active.as_mut() {
            Some(solutions) => solutions,
            None => return Ok("No active query. Run a query first.".to_string()),
        };

        let mut output = String::new();
        let mut exhausted = false;
        for _ in 0..count {
            match solutions.next() {
                Some(solution) => {
                    self.answer_count += 1;
                    output.push_str(&format!("{}. {}\n", self.answer_count, solution));
                }
                None => {
                    exhausted = true;
                    break;
                }
            }
        }

        if exhausted {
            for fault in solutions.faults() {
                output.push_str(&format!("Warning: {}\n", fault));
            }
            if solutions.budget_exhausted() {
                output.push_str("Step limit reached.\n");
            }
            output.push_str(if self.answer_count == 0 {
                "false.\n"
            } else {
                "No more answers.\n"
            });
            self.reset_active_query();
        } else {
            output.push_str("Type 'next' for more answers.\n");
        }
        Ok(output)
    }

    fn reset_active_query(&mut self) {
        self.active = None;
        self.answer_count = 0;
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn help_text() -> &'static str {
    r#"sldlog - Horn clause resolution

Commands:
  <clause>.      Add a clause (e.g., parent(X) :- father(X).)
  ?- <goal>.     Run a query and show the first answer
  next           Show the next answer from the active query
  more <n>       Show the next N answers from the active query
  reset          Clear the active query
  load <file>    Consult a file
  list           List defined predicates
  help           Show this help
  quit/exit      Exit the REPL

Control constructs:
  true, fail, false, (A, B), (A ; B), !, call/1..8
"#
}

#[cfg(test)]
#[path = "tests/repl.rs"]
mod tests;
