//! # Error Handling for loxrs
//!
//! Two error kinds, matching spec §7: [`CompileError`] (lexical, syntactic,
//! or semantic-at-compile-time) and [`RuntimeError`] (type mismatch,
//! undefined variable).
//!
//! ## Compile errors
//! [`CompileError`] carries no payload: by the time one is returned, every
//! individual diagnostic has already been printed to stderr by
//! `Compiler::error_at` (spec §7: "Compile errors are reported via
//! `errorAt`... every error sets `hadError`"). The `Err` variant is only a
//! signal to the caller that compilation failed and the chunk must be
//! discarded — "The compiler never returns a partial chunk to the VM if
//! `hadError`."
//!
//! ## Runtime errors
//! [`RuntimeError`] carries a descriptive message. The VM's `run` loop
//! formats it to stderr with a `[line N] in script` trailer (spec §4.3) and
//! resets the operand stack, exactly once per failing `interpret` call.

use std::fmt;

/// Signals that compilation failed. Diagnostics were already printed as
/// they were discovered; this carries no additional information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileError;

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "compilation failed")
    }
}

impl std::error::Error for CompileError {}

/// Errors raised while executing a compiled chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A unary/binary operator was applied to a value of the wrong type,
    /// e.g. `-"x"` or `"a" < nil`. The message is the exact user-facing
    /// text (spec §4.3: "Operands must be numbers.", "Operand must be a
    /// number.", "Operands must be two numbers or two strings.").
    TypeMismatch(String),
    /// `GET_GLOBAL`/`SET_GLOBAL` referenced a name that is not in the
    /// globals table.
    UndefinedVariable(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::TypeMismatch(msg) => write!(f, "{}", msg),
            RuntimeError::UndefinedVariable(name) => {
                write!(f, "Undefined variable '{}'.", name)
            }
        }
    }
}

impl std::error::Error for RuntimeError {}
