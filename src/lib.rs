//! loxrs: a single-pass bytecode compiler and stack-based virtual machine
//! for a small Lox-family scripting language.
//!
//! Module map:
//! - [`scanner`] – byte-driven lexer
//! - [`compiler`] – Pratt parser + bytecode emitter + scope resolution
//! - [`chunk`] – compiled instruction stream, constant pool, line map
//! - [`value`] – the runtime `Value` tagged union
//! - [`object`] – heap-allocated object kinds (`ObjString`) and the heap
//! - [`table`] – open-addressed hash table and string interner
//! - [`vm`] – the fetch-decode-dispatch loop
//! - [`error`] – compile/runtime error types
//! - [`debug`] – bytecode disassembler (gated behind `print_code`)
//! - [`repl`] – interactive REPL collaborator

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod object;
pub mod repl;
pub mod scanner;
pub mod table;
pub mod value;
pub mod vm;
