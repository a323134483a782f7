use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

use crate::ast::{Kind, Operator};
use crate::error::{EvalError, EvalResult};

/// A runtime value: a single number or a non-empty list of numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Scalar(_) => Kind::Scalar,
            Value::Vector(_) => Kind::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(n) => Some(*n),
            Value::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(items) => Some(items),
            Value::Scalar(_) => None,
        }
    }

    /// All elements in order; a scalar yields itself.
    pub fn elements(&self) -> &[f64] {
        match self {
            Value::Scalar(n) => std::slice::from_ref(n),
            Value::Vector(items) => items,
        }
    }

    /// True when every element is non-zero.
    pub fn is_truthy(&self) -> bool {
        self.elements().iter().all(|n| *n != 0.0)
    }

    /// Wraps a scalar into a one-element vector when `kind` asks for a vector.
    pub fn promote(self, kind: Kind) -> Value {
        match (self, kind) {
            (Value::Scalar(n), Kind::Vector) => Value::Vector(vec![n]),
            (value, _) => value,
        }
    }

    /// Applies `f` to every element, keeping the kind.
    pub fn try_map<F>(&self, f: F) -> EvalResult<Value>
    where
        F: Fn(f64) -> EvalResult<f64>,
    {
        match self {
            Value::Scalar(n) => f(*n).map(Value::Scalar),
            Value::Vector(items) => items
                .iter()
                .map(|n| f(*n))
                .collect::<EvalResult<Vec<f64>>>()
                .map(Value::Vector),
        }
    }

    pub fn map<F>(&self, f: F) -> Value
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Value::Scalar(n) => Value::Scalar(f(*n)),
            Value::Vector(items) => Value::Vector(items.iter().map(|n| f(*n)).collect()),
        }
    }

    /// Elementwise combination with broadcasting. Two vectors must have equal length.
    pub fn zip_with<F>(&self, other: &Value, f: F) -> EvalResult<Value>
    where
        F: Fn(f64, f64) -> EvalResult<f64>,
    {
        match (self, other) {
            (Value::Scalar(l), Value::Scalar(r)) => f(*l, *r).map(Value::Scalar),
            (Value::Vector(larr), Value::Vector(rarr)) => {
                if larr.len() != rarr.len() {
                    return Err(EvalError::LengthMismatch {
                        left: larr.len(),
                        right: rarr.len(),
                    });
                }
                let mut out = Vec::with_capacity(larr.len());
                for (l, r) in larr.iter().zip(rarr.iter()) {
                    out.push(f(*l, *r)?);
                }
                Ok(Value::Vector(out))
            }
            (Value::Vector(arr), Value::Scalar(scalar)) => arr
                .iter()
                .map(|l| f(*l, *scalar))
                .collect::<EvalResult<Vec<f64>>>()
                .map(Value::Vector),
            (Value::Scalar(scalar), Value::Vector(arr)) => arr
                .iter()
                .map(|r| f(*scalar, *r))
                .collect::<EvalResult<Vec<f64>>>()
                .map(Value::Vector),
        }
    }

    /// Reduces an elementwise predicate to a single 1.0/0.0 scalar that holds
    /// only when the predicate holds for every pair.
    pub fn compare<F>(&self, other: &Value, predicate: F) -> EvalResult<Value>
    where
        F: Fn(f64, f64) -> EvalResult<bool>,
    {
        let pairs = self.zip_with(other, |l, r| predicate(l, r).map(|holds| holds as u8 as f64))?;
        Ok(Value::Scalar(if pairs.is_truthy() { 1.0 } else { 0.0 }))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(n) => write!(f, "{}", n),
            Value::Vector(items) => {
                let items: Vec<String> = items.iter().map(|n| n.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

impl Add for Value {
    type Output = EvalResult<Value>;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |l, r| Operator::Add.apply(l, r))
    }
}

impl Sub for Value {
    type Output = EvalResult<Value>;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |l, r| Operator::Subtract.apply(l, r))
    }
}

impl Mul for Value {
    type Output = EvalResult<Value>;

    fn mul(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |l, r| Operator::Multiply.apply(l, r))
    }
}

impl Div for Value {
    type Output = EvalResult<Value>;

    fn div(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |l, r| Operator::Divide.apply(l, r))
    }
}

impl Rem for Value {
    type Output = EvalResult<Value>;

    fn rem(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |l, r| Operator::Modulo.apply(l, r))
    }
}
