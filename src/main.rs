//! loxrs entry point.
//!
//! Usage (spec §6):
//! - no args → interactive REPL
//! - one path argument → compile and run that file
//! - anything else → usage message, exit 64
//!
//! Exit codes mirror clox's `main`: 0 success, 64 usage error, 65 compile
//! error, 70 runtime error, 74 I/O error reading the script file.

use std::fs;
use std::process::ExitCode;

use loxrs::repl;
use loxrs::vm::{self, InterpretError};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match args.len() {
        1 => {
            repl::repl_interpret();
            ExitCode::SUCCESS
        }
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: loxrs [path]");
            ExitCode::from(64)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Could not read file \"{}\": {}", path, e);
            return ExitCode::from(74);
        }
    };

    match vm::run_source(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(InterpretError::Compile(_)) => ExitCode::from(65),
        Err(InterpretError::Runtime(_)) => ExitCode::from(70),
    }
}
