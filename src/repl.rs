//! # Interactive REPL (collaborator)
//!
//! Reads one line at a time and feeds it straight to a single, persistent
//! [`Vm`], so globals and interned strings accumulate across inputs the way
//! a script's top-level scope would (spec §4.7).
//!
//! This deliberately diverges from a subprocess-per-line REPL: a Lox session
//! has no meaningful way to serialize VM state back out to a temp file
//! between lines, so the REPL talks to one in-process `Vm` for its whole
//! lifetime instead.

use std::io::{self, Write};

use crate::vm::Vm;

pub fn repl_interpret() {
    println!("loxrs REPL. Type `exit` or `quit` to leave, or press Ctrl+D.");

    let mut vm = Vm::new();
    let stdout = io::stdout();

    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        let bytes_read = match io::stdin().read_line(&mut line) {
            Ok(n) => n,
            Err(_) => break,
        };
        if bytes_read == 0 {
            println!();
            break;
        }

        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        let mut handle = stdout.lock();
        // Diagnostics are already printed to stderr by the compiler and the
        // VM on failure; the REPL just keeps going with a clean stack.
        let _ = vm.interpret(&line, &mut handle);
    }
}
