//! Validation, variable substitution, parsing and evaluation of arithmetic
//! expressions over scalars and vectors.
//!
//! ```
//! use std::collections::HashMap;
//! use calcexpr_rs::{Calculator, Value};
//!
//! let calculator = Calculator::new();
//! let scalars = HashMap::from([("a".to_string(), 2.0)]);
//! let vectors = HashMap::from([("v".to_string(), vec![1.0, 2.0, 3.0])]);
//! let value = calculator.calculate("a * sum[v]", &scalars, &vectors).unwrap();
//! assert_eq!(value, Value::Scalar(12.0));
//! ```

pub mod ast;
pub mod calculator;
pub mod error;
pub mod functions;
mod text;
pub mod validation;
pub mod variables;

pub use ast::{Kind, Value};
pub use calculator::{CalculationJob, Calculator, CalculatorOptions};
pub use error::{CalculatorError, ErrorKind, EvalError};
pub use variables::{parse_value_input, Bindings, VariableValues};

/// Evaluates a variable-free expression with default options.
pub fn evaluate_expression(expression: &str) -> Result<Value, CalculatorError> {
    Calculator::new().calculate_with_bindings(expression, &Bindings::new())
}
