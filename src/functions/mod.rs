pub mod aggregate;
pub mod conditional;
pub mod math;

use std::collections::HashMap;
use std::f64::consts;
use std::sync::LazyLock;

use crate::ast::{Kind, Value};
use crate::error::{EvalError, EvalResult};

pub type Builtin = fn(&[Value]) -> EvalResult<Value>;

/// Bracket style a function must be called with.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Brackets {
    Round,
    Square,
}

impl Brackets {
    pub fn open(&self) -> char {
        match self {
            Brackets::Round => '(',
            Brackets::Square => '[',
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Brackets::Round => "parentheses ()",
            Brackets::Square => "square brackets []",
        }
    }

    pub fn from_open(c: char) -> Option<Brackets> {
        match c {
            '(' => Some(Brackets::Round),
            '[' => Some(Brackets::Square),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// One or more arguments.
    Variadic,
}

/// How a function treats its operands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperandPolicy {
    /// Applied element by element, broadcasting scalars.
    Elementwise,
    /// Folds all operands into one result.
    Aggregate,
    /// Picks one of two branches.
    Conditional,
}

pub struct FunctionDescriptor {
    pub name: &'static str,
    pub brackets: Brackets,
    pub arity: Arity,
    pub policy: OperandPolicy,
    call: Builtin,
    result_kind: fn(&[Kind]) -> Kind,
}

impl FunctionDescriptor {
    pub fn new(
        name: &'static str,
        brackets: Brackets,
        arity: Arity,
        policy: OperandPolicy,
        call: Builtin,
        result_kind: fn(&[Kind]) -> Kind,
    ) -> Self {
        Self {
            name,
            brackets,
            arity,
            policy,
            call,
            result_kind,
        }
    }

    pub fn check_arity(&self, supplied: usize) -> EvalResult<()> {
        match self.arity {
            Arity::Fixed(expected) if expected != supplied => Err(EvalError::Arity {
                function: self.name.to_string(),
                expected,
                supplied,
            }),
            Arity::Variadic if supplied == 0 => Err(EvalError::MissingArguments(self.name.to_string())),
            _ => Ok(()),
        }
    }

    pub fn check_brackets(&self, used: Brackets) -> EvalResult<()> {
        if used == self.brackets {
            Ok(())
        } else {
            Err(EvalError::WrongBrackets {
                function: self.name.to_string(),
                brackets: self.brackets.describe(),
            })
        }
    }

    /// Kind of the call's result given the kinds of its arguments.
    pub fn result_kind(&self, args: &[Kind]) -> Kind {
        (self.result_kind)(args)
    }

    pub fn call(&self, args: &[Value]) -> EvalResult<Value> {
        self.check_arity(args.len())?;
        (self.call)(args)
    }
}

/// Scalar only when every argument is scalar.
pub fn broadcast_kind(args: &[Kind]) -> Kind {
    if args.iter().all(|kind| *kind == Kind::Scalar) {
        Kind::Scalar
    } else {
        Kind::Vector
    }
}

pub fn scalar_kind(_args: &[Kind]) -> Kind {
    Kind::Scalar
}

pub struct FunctionTable {
    functions: HashMap<&'static str, FunctionDescriptor>,
}

impl FunctionTable {
    fn new() -> Self {
        let mut table = Self {
            functions: HashMap::new(),
        };
        math::register(&mut table);
        aggregate::register(&mut table);
        conditional::register(&mut table);
        table
    }

    pub fn register(&mut self, descriptor: FunctionDescriptor) {
        self.functions.insert(descriptor.name, descriptor);
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name.to_lowercase().as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }
}

static FUNCTIONS: LazyLock<FunctionTable> = LazyLock::new(FunctionTable::new);

/// Named constants usable anywhere a number is.
pub const CONSTANTS: [(&str, f64); 2] = [("pi", consts::PI), ("e", consts::E)];

pub fn functions() -> &'static FunctionTable {
    &FUNCTIONS
}

pub fn lookup(name: &str) -> Option<&'static FunctionDescriptor> {
    FUNCTIONS.get(name)
}

pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(constant, _)| constant.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}

/// Function names and constants. These can never name a variable.
pub fn is_reserved(name: &str) -> bool {
    lookup(name).is_some() || constant(name).is_some()
}
