use std::fmt;

use thiserror::Error;

use crate::ast::Kind;

/// Broad family an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed text: brackets, quotes, commas, operators, characters.
    Syntax,
    /// Well-formed text that means nothing: unknown names, arity, kinds.
    Semantic,
    /// A value outside a function's or operator's domain.
    Math,
    /// Anything the pipeline could not classify.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Semantic => "semantic error",
            ErrorKind::Math => "math error",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

/// Failures raised while building or evaluating a tree, before a position is attached.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function '{function}' expects {expected} argument(s), got {supplied}")]
    Arity {
        function: String,
        expected: usize,
        supplied: usize,
    },

    #[error("Function '{0}' requires at least one argument")]
    MissingArguments(String),

    #[error("Function '{function}' must be called with {brackets}")]
    WrongBrackets {
        function: String,
        brackets: &'static str,
    },

    #[error("Variable '{0}' has no value")]
    UnboundVariable(String),

    #[error("Variable '{name}' was bound as a {actual} but the expression was built for a {expected}")]
    KindChanged {
        name: String,
        expected: Kind,
        actual: Kind,
    },

    #[error("Vectors must have the same length, got {left} and {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Vector elements must be scalars")]
    NestedVector,

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    #[error("Modulo by zero is not allowed")]
    ModuloByZero,

    #[error("Invalid argument for sqrt: the value must not be negative")]
    NegativeSqrt,

    #[error("Factorial is defined only for non-negative integers, got {0}")]
    InvalidFactorial(f64),

    #[error("The second argument of 'pow' must not be negative")]
    NegativeExponent,

    #[error("log requires a positive argument and a positive base other than 1")]
    LogDomain,

    #[error("Operator '{operator}' is not defined for {left} and {right} operands")]
    NoOverload {
        operator: &'static str,
        left: Kind,
        right: Kind,
    },
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::WrongBrackets { .. } => ErrorKind::Syntax,
            EvalError::UnknownFunction(_)
            | EvalError::Arity { .. }
            | EvalError::MissingArguments(_)
            | EvalError::UnboundVariable(_)
            | EvalError::KindChanged { .. }
            | EvalError::LengthMismatch { .. }
            | EvalError::NestedVector => ErrorKind::Semantic,
            EvalError::DivisionByZero
            | EvalError::ModuloByZero
            | EvalError::NegativeSqrt
            | EvalError::InvalidFactorial(_)
            | EvalError::NegativeExponent
            | EvalError::LogDomain => ErrorKind::Math,
            EvalError::NoOverload { .. } => ErrorKind::Internal,
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

/// The single error type surfaced by [`crate::Calculator`].
///
/// `position` is a 1-based character position in the text the caller
/// supplied, or `0` when no position applies. Constructors take 0-based
/// character indices and convert.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CalculatorError {
    kind: ErrorKind,
    message: String,
    position: usize,
    variable_positions: Vec<(String, usize)>,
}

impl CalculatorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, index: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            position: index + 1,
            variable_positions: Vec::new(),
        }
    }

    pub fn syntax(message: impl Into<String>, index: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, index)
    }

    pub fn semantic(message: impl Into<String>, index: usize) -> Self {
        Self::new(ErrorKind::Semantic, message, index)
    }

    pub fn math(message: impl Into<String>, index: usize) -> Self {
        Self::new(ErrorKind::Math, message, index)
    }

    /// An error with no meaningful location.
    pub fn unpositioned(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            position: 0,
            variable_positions: Vec::new(),
        }
    }

    /// An error tied to several variables. The first entry becomes the primary position.
    pub fn with_variables(
        kind: ErrorKind,
        message: impl Into<String>,
        variables: Vec<(String, Option<usize>)>,
    ) -> Self {
        let variable_positions: Vec<(String, usize)> = variables
            .into_iter()
            .map(|(name, index)| (name, index.map_or(0, |index| index + 1)))
            .collect();
        Self {
            kind,
            message: message.into(),
            position: variable_positions.first().map_or(0, |(_, position)| *position),
            variable_positions,
        }
    }

    /// Reports variables whose supplied values could not be read, one bullet per name.
    pub fn invalid_variables(variables: Vec<(String, Option<usize>)>) -> Self {
        let message = format_variable_errors(&variables);
        Self::with_variables(ErrorKind::Semantic, message, variables)
    }

    /// Attaches a node position to an evaluation failure.
    pub fn from_eval(error: EvalError, index: usize) -> Self {
        Self::new(error.kind(), error.to_string(), index)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn variable_positions(&self) -> Option<&[(String, usize)]> {
        if self.variable_positions.is_empty() {
            None
        } else {
            Some(&self.variable_positions)
        }
    }

    /// Message followed by the position, when there is one.
    pub fn report(&self) -> String {
        if self.position == 0 {
            format!("{}: {}", self.kind, self.message)
        } else {
            format!("{}: {} (position {})", self.kind, self.message, self.position)
        }
    }

    /// Translates every stored position through `map`, which works on 0-based indices.
    pub(crate) fn remap_positions<F>(mut self, map: F) -> Self
    where
        F: Fn(usize) -> usize,
    {
        let remap = |position: usize| if position == 0 { 0 } else { map(position - 1) + 1 };
        self.position = remap(self.position);
        for (_, position) in &mut self.variable_positions {
            *position = remap(*position);
        }
        self
    }

    /// Rewraps an internal failure under a generic message at position 0.
    pub(crate) fn generalize(self) -> Self {
        if self.kind != ErrorKind::Internal {
            return self;
        }
        Self::unpositioned(
            ErrorKind::Internal,
            format!("Calculation failed: {}", self.message),
        )
    }
}

/// Renders `• name (position N)` lines, stripping any quotes from the names.
pub fn format_variable_errors(variables: &[(String, Option<usize>)]) -> String {
    let lines: Vec<String> = variables
        .iter()
        .map(|(name, index)| {
            let name = name.trim_matches('"');
            match index {
                Some(index) => format!("• {} (position {})", name, index + 1),
                None => format!("• {}", name),
            }
        })
        .collect();
    format!("Invalid values for variables:\n{}", lines.join("\n"))
}
