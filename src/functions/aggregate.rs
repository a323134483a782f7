use crate::ast::{Kind, Value};
use crate::error::{EvalError, EvalResult};
use crate::functions::{
    broadcast_kind, scalar_kind, Arity, Brackets, FunctionDescriptor, FunctionTable, OperandPolicy,
};

/// Largest integer whose factorial is still finite as an `f64`.
const MAX_FINITE_FACTORIAL: f64 = 170.0;

pub fn register(table: &mut FunctionTable) {
    table.register(FunctionDescriptor::new(
        "sum",
        Brackets::Square,
        Arity::Variadic,
        OperandPolicy::Aggregate,
        sum,
        scalar_kind,
    ));
    table.register(FunctionDescriptor::new(
        "mean",
        Brackets::Square,
        Arity::Variadic,
        OperandPolicy::Aggregate,
        mean,
        broadcast_kind,
    ));
    table.register(FunctionDescriptor::new(
        "fact",
        Brackets::Square,
        Arity::Variadic,
        OperandPolicy::Elementwise,
        fact,
        fact_kind,
    ));
}

fn require_arguments(name: &str, args: &[Value]) -> EvalResult<()> {
    if args.is_empty() {
        Err(EvalError::MissingArguments(name.to_string()))
    } else {
        Ok(())
    }
}

/// Adds up every element of every argument.
pub fn sum(args: &[Value]) -> EvalResult<Value> {
    require_arguments("sum", args)?;
    Ok(Value::Scalar(args.iter().flat_map(|arg| arg.elements()).sum()))
}

/// Adds the arguments together (broadcasting vectors) and divides by their count.
pub fn mean(args: &[Value]) -> EvalResult<Value> {
    require_arguments("mean", args)?;
    let mut total = args[0].clone();
    for arg in &args[1..] {
        total = (total + arg.clone())?;
    }
    total / Value::Scalar(args.len() as f64)
}

/// Factorial of each element. Several arguments are gathered into one vector.
pub fn fact(args: &[Value]) -> EvalResult<Value> {
    require_arguments("fact", args)?;
    if let [single] = args {
        return single.try_map(factorial);
    }
    let gathered: Vec<f64> = args.iter().flat_map(|arg| arg.elements()).copied().collect();
    Value::Vector(gathered).try_map(factorial)
}

fn fact_kind(args: &[Kind]) -> Kind {
    match args {
        [single] => *single,
        _ => Kind::Vector,
    }
}

fn factorial(n: f64) -> EvalResult<f64> {
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(EvalError::InvalidFactorial(n));
    }
    if n > MAX_FINITE_FACTORIAL {
        return Ok(f64::INFINITY);
    }
    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_flattens_arguments() {
        let args = [Value::Vector(vec![1.0, 2.0]), Value::Scalar(3.0)];
        assert_eq!(sum(&args), Ok(Value::Scalar(6.0)));
    }

    #[test]
    fn test_mean_of_scalars() {
        let args = [Value::Scalar(2.0), Value::Scalar(4.0), Value::Scalar(6.0)];
        assert_eq!(mean(&args), Ok(Value::Scalar(4.0)));
    }

    #[test]
    fn test_mean_broadcasts_vectors() {
        let args = [Value::Vector(vec![2.0, 4.0]), Value::Scalar(2.0)];
        assert_eq!(mean(&args), Ok(Value::Vector(vec![2.0, 3.0])));
    }

    #[test]
    fn test_empty_aggregates_fail() {
        assert_eq!(sum(&[]), Err(EvalError::MissingArguments("sum".to_string())));
        assert_eq!(mean(&[]), Err(EvalError::MissingArguments("mean".to_string())));
    }

    #[test]
    fn test_fact() {
        assert_eq!(fact(&[Value::Scalar(5.0)]), Ok(Value::Scalar(120.0)));
        assert_eq!(fact(&[Value::Scalar(0.0)]), Ok(Value::Scalar(1.0)));
        assert_eq!(
            fact(&[Value::Scalar(3.0), Value::Scalar(4.0)]),
            Ok(Value::Vector(vec![6.0, 24.0]))
        );
        assert_eq!(fact(&[Value::Scalar(2.5)]), Err(EvalError::InvalidFactorial(2.5)));
        assert_eq!(fact(&[Value::Scalar(-1.0)]), Err(EvalError::InvalidFactorial(-1.0)));
        assert_eq!(fact(&[Value::Scalar(171.0)]), Ok(Value::Scalar(f64::INFINITY)));
    }

    #[test]
    fn test_fact_kind() {
        assert_eq!(fact_kind(&[Kind::Scalar]), Kind::Scalar);
        assert_eq!(fact_kind(&[Kind::Scalar, Kind::Scalar]), Kind::Vector);
    }
}
