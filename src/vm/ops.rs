//! Arithmetic, comparison, and concatenation instruction handlers.
//!
//! Split out of `vm.rs`'s dispatch loop purely to keep that `match` focused
//! on control flow; these all follow the same shape: pop two operands, check
//! types, push one result or raise a [`RuntimeError`].

use super::Vm;
use crate::error::RuntimeError;
use crate::value::Value;

/// `+`: numeric addition or string concatenation (spec §4.3 `OP_ADD`), the
/// one binary operator overloaded on operand type.
pub(super) fn add(vm: &mut Vm, line: u32) -> Result<(), RuntimeError> {
    let b = vm.peek(0);
    let a = vm.peek(1);
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => {
            vm.pop();
            vm.pop();
            vm.push(Value::Number(x + y));
            Ok(())
        }
        _ => match (a.as_string(), b.as_string()) {
            (Some(x), Some(y)) => {
                let mut bytes = x.bytes.clone();
                bytes.extend_from_slice(&y.bytes);
                vm.pop();
                vm.pop();
                let obj = vm.strings.intern(&bytes, &mut vm.heap);
                vm.push(Value::Obj(obj));
                Ok(())
            }
            _ => Err(vm.runtime_error(
                RuntimeError::TypeMismatch("Operands must be two numbers or two strings.".to_string()),
                line,
            )),
        },
    }
}

/// `-`, `*`, `/`: strictly numeric binary operators.
pub(super) fn binary_numeric(
    vm: &mut Vm,
    line: u32,
    op: fn(f64, f64) -> f64,
) -> Result<(), RuntimeError> {
    let (a, b) = match (vm.peek(1).as_number(), vm.peek(0).as_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(vm.runtime_error(
                RuntimeError::TypeMismatch("Operands must be numbers.".to_string()),
                line,
            ));
        }
    };
    vm.pop();
    vm.pop();
    vm.push(Value::Number(op(a, b)));
    Ok(())
}

/// `>`, `<`: strictly numeric comparison operators. `>=`/`<=` are
/// synthesized by the compiler from `Less`/`Greater` plus `Not`.
pub(super) fn binary_comparison(
    vm: &mut Vm,
    line: u32,
    op: fn(f64, f64) -> bool,
) -> Result<(), RuntimeError> {
    let (a, b) = match (vm.peek(1).as_number(), vm.peek(0).as_number()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(vm.runtime_error(
                RuntimeError::TypeMismatch("Operands must be numbers.".to_string()),
                line,
            ));
        }
    };
    vm.pop();
    vm.pop();
    vm.push(Value::Bool(op(a, b)));
    Ok(())
}
