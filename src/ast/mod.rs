use std::fmt;

use crate::error::{EvalError, EvalResult};

mod evaluator;
mod parser;
mod value;

pub use evaluator::Evaluator;
pub use parser::{normalize_decimal_commas, ExpressionParser as Parser, Rule};
pub use value::Value;

/// Static shape of a node's result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    Scalar,
    Vector,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar => f.write_str("scalar"),
            Kind::Vector => f.write_str("vector"),
        }
    }
}

/// Typed expression tree. Every node knows the kind it yields and the
/// 0-based character index it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Constant(Value),
    VectorLiteral {
        elements: Vec<ASTNode>,
        position: usize,
    },
    Variable {
        name: String,
        kind: Kind,
        position: usize,
    },
    Negate {
        operand: Box<ASTNode>,
        position: usize,
    },
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
        kind: Kind,
        position: usize,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
        kind: Kind,
        position: usize,
    },
    Conditional {
        condition: Box<ASTNode>,
        then_branch: Box<ASTNode>,
        else_branch: Box<ASTNode>,
        kind: Kind,
        position: usize,
    },
}

impl ASTNode {
    pub fn kind(&self) -> Kind {
        match self {
            ASTNode::Constant(value) => value.kind(),
            ASTNode::VectorLiteral { .. } => Kind::Vector,
            ASTNode::Negate { operand, .. } => operand.kind(),
            ASTNode::Variable { kind, .. }
            | ASTNode::BinaryOperation { kind, .. }
            | ASTNode::FunctionCall { kind, .. }
            | ASTNode::Conditional { kind, .. } => *kind,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum OperatorClass {
    Arithmetic,
    Comparison,
}

/// Result kind for each (operator class, left, right) combination.
/// Arithmetic broadcasts a scalar over a vector; comparisons always reduce.
const RESOLUTION: [(OperatorClass, Kind, Kind, Kind); 8] = [
    (OperatorClass::Arithmetic, Kind::Scalar, Kind::Scalar, Kind::Scalar),
    (OperatorClass::Arithmetic, Kind::Scalar, Kind::Vector, Kind::Vector),
    (OperatorClass::Arithmetic, Kind::Vector, Kind::Scalar, Kind::Vector),
    (OperatorClass::Arithmetic, Kind::Vector, Kind::Vector, Kind::Vector),
    (OperatorClass::Comparison, Kind::Scalar, Kind::Scalar, Kind::Scalar),
    (OperatorClass::Comparison, Kind::Scalar, Kind::Vector, Kind::Scalar),
    (OperatorClass::Comparison, Kind::Vector, Kind::Scalar, Kind::Scalar),
    (OperatorClass::Comparison, Kind::Vector, Kind::Vector, Kind::Scalar),
];

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThanOrEqual
                | Operator::Equal
                | Operator::NotEqual
        )
    }

    fn class(&self) -> OperatorClass {
        if self.is_comparison() {
            OperatorClass::Comparison
        } else {
            OperatorClass::Arithmetic
        }
    }

    /// Looks up the result kind of `left <op> right`.
    pub fn resolve(&self, left: Kind, right: Kind) -> EvalResult<Kind> {
        let class = self.class();
        RESOLUTION
            .iter()
            .find(|(c, l, r, _)| *c == class && *l == left && *r == right)
            .map(|(_, _, _, result)| *result)
            .ok_or(EvalError::NoOverload {
                operator: self.symbol(),
                left,
                right,
            })
    }

    /// Scalar semantics of the operator. Comparisons yield 1.0 or 0.0.
    pub fn apply(&self, left: f64, right: f64) -> EvalResult<f64> {
        match self {
            Operator::Add => Ok(left + right),
            Operator::Subtract => Ok(left - right),
            Operator::Multiply => Ok(left * right),
            Operator::Divide => {
                if right == 0.0 {
                    Err(EvalError::DivisionByZero)
                } else {
                    Ok(left / right)
                }
            }
            Operator::Modulo => {
                if right == 0.0 {
                    Err(EvalError::ModuloByZero)
                } else {
                    Ok(left % right)
                }
            }
            Operator::Power => Ok(left.powf(right)),
            Operator::GreaterThan => Ok(if left > right { 1.0 } else { 0.0 }),
            Operator::LessThan => Ok(if left < right { 1.0 } else { 0.0 }),
            Operator::GreaterThanOrEqual => Ok(if left >= right { 1.0 } else { 0.0 }),
            Operator::LessThanOrEqual => Ok(if left <= right { 1.0 } else { 0.0 }),
            Operator::Equal => Ok(if left == right { 1.0 } else { 0.0 }),
            Operator::NotEqual => Ok(if left != right { 1.0 } else { 0.0 }),
        }
    }

    /// Applies the operator to two values of any kind.
    pub fn apply_values(&self, left: Value, right: Value) -> EvalResult<Value> {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
            Operator::Modulo => left % right,
            Operator::Power => left.zip_with(&right, |l, r| Operator::Power.apply(l, r)),
            _ => left.compare(&right, |l, r| self.apply(l, r).map(|v| v != 0.0)),
        }
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" | "×" | "⋅" => Ok(Operator::Multiply),
            "/" | "÷" => Ok(Operator::Divide),
            "%" => Ok(Operator::Modulo),
            "^" => Ok(Operator::Power),
            ">" => Ok(Operator::GreaterThan),
            "<" => Ok(Operator::LessThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<=" => Ok(Operator::LessThanOrEqual),
            "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}
