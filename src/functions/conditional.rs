use crate::ast::{Kind, Value};
use crate::error::EvalError;
use crate::functions::{Arity, Brackets, FunctionDescriptor, FunctionTable, OperandPolicy};
use calcexpr_macros::builtin;

pub fn register(table: &mut FunctionTable) {
    table.register(FunctionDescriptor::new(
        "if",
        Brackets::Round,
        Arity::Fixed(3),
        OperandPolicy::Conditional,
        if_,
        branch_kind,
    ));
}

/// A vector when either branch is one, so a scalar branch can be promoted.
pub fn branch_kind(args: &[Kind]) -> Kind {
    match args {
        [_, then_kind, else_kind] if then_kind == else_kind => *then_kind,
        _ => Kind::Vector,
    }
}

/// The condition holds when every element of it is non-zero.
#[builtin("if")]
fn if_(condition: Value, then: Value, otherwise: Value) -> Result<Value, EvalError> {
    if condition.is_truthy() {
        Ok(then)
    } else {
        Ok(otherwise)
    }
}
