use crate::ast::Value;
use crate::error::EvalError;
use crate::functions::{
    broadcast_kind, Arity, Brackets, Builtin, FunctionDescriptor, FunctionTable, OperandPolicy,
};
use calcexpr_macros::builtin;

pub fn register(table: &mut FunctionTable) {
    let elementwise = |name: &'static str, arity: Arity, call: Builtin| {
        FunctionDescriptor::new(
            name,
            Brackets::Round,
            arity,
            OperandPolicy::Elementwise,
            call,
            broadcast_kind,
        )
    };

    table.register(elementwise("sqrt", Arity::Fixed(1), sqrt));
    table.register(elementwise("abs", Arity::Fixed(1), abs));
    table.register(elementwise("sin", Arity::Fixed(1), sin));
    table.register(elementwise("cos", Arity::Fixed(1), cos));
    table.register(elementwise("min", Arity::Fixed(2), min));
    table.register(elementwise("max", Arity::Fixed(2), max));
    table.register(elementwise("pow", Arity::Fixed(2), pow));
    table.register(elementwise("log", Arity::Fixed(2), log));
}

#[builtin]
fn sqrt(x: Value) -> Result<Value, EvalError> {
    x.try_map(|n| {
        if n < 0.0 {
            Err(EvalError::NegativeSqrt)
        } else {
            Ok(n.sqrt())
        }
    })
}

#[builtin]
fn abs(x: Value) -> Result<Value, EvalError> {
    Ok(x.map(f64::abs))
}

#[builtin]
fn sin(x: Value) -> Result<Value, EvalError> {
    Ok(x.map(f64::sin))
}

#[builtin]
fn cos(x: Value) -> Result<Value, EvalError> {
    Ok(x.map(f64::cos))
}

#[builtin]
fn min(a: Value, b: Value) -> Result<Value, EvalError> {
    a.zip_with(&b, |l, r| Ok(l.min(r)))
}

#[builtin]
fn max(a: Value, b: Value) -> Result<Value, EvalError> {
    a.zip_with(&b, |l, r| Ok(l.max(r)))
}

#[builtin]
fn pow(base: Value, exponent: Value) -> Result<Value, EvalError> {
    base.zip_with(&exponent, |b, e| {
        if e < 0.0 {
            Err(EvalError::NegativeExponent)
        } else {
            Ok(b.powf(e))
        }
    })
}

/// `log(value, base)`.
#[builtin]
fn log(value: Value, base: Value) -> Result<Value, EvalError> {
    value.zip_with(&base, |v, b| {
        if v <= 0.0 || b <= 0.0 || b == 1.0 {
            Err(EvalError::LogDomain)
        } else {
            Ok(v.log(b))
        }
    })
}
