//! sldlog CLI - consult files, then answer queries from stdin.
//!
//! Usage: `sldlog [--max-steps N] [FILE...]`

use std::io::{stdin, stdout, BufReader};

use sldlog::repl::Repl;
use sldlog::solve::SolveConfig;
use sldlog::trace::init_subscriber;

fn main() {
    init_subscriber();

    let mut config = SolveConfig::default();
    let mut files = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--max-steps" {
            match args.next().and_then(|n| n.parse().ok()) {
                Some(n) => config.max_steps = Some(n),
                None => {
                    eprintln!("Error: --max-steps needs a number");
                    std::process::exit(2);
                }
            }
        } else {
            files.push(arg);
        }
    }

    let mut repl = Repl::new().with_config(config);
    for file in &files {
        match repl.load_file(file) {
            Ok(summary) => println!("{}", summary),
            Err(e) => {
                eprintln!("Error: {}: {}", file, e);
                std::process::exit(1);
            }
        }
    }

    let mut input = BufReader::new(stdin().lock());
    let mut output = stdout().lock();
    if let Err(e) = repl.run(&mut input, &mut output) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
