use crate::ast::{ASTNode, Kind, Operator, Value};
use crate::error::{CalculatorError, ErrorKind, EvalError};
use crate::functions::{self, Brackets, OperandPolicy};
use crate::variables::Bindings;
use log::debug;
use pest::error::InputLocation;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./expression.pest"]
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parses an expression that references no variables.
    pub fn parse_expression(input: &str) -> Result<ASTNode, CalculatorError> {
        Self::parse_with_bindings(input, &Bindings::new())
    }

    /// Parses an expression, taking the kind of each variable from `bindings`.
    pub fn parse_with_bindings(input: &str, bindings: &Bindings) -> Result<ASTNode, CalculatorError> {
        debug!("Parsing expression: {}", input);
        let normalized = normalize_decimal_commas(input);
        let parse_result = ExpressionParser::parse(Rule::expression, &normalized)
            .map_err(|e| parse_error(&normalized, e))?
            .next()
            .ok_or_else(|| {
                CalculatorError::unpositioned(ErrorKind::Internal, "Failed to parse expression")
            })?;

        let builder = TreeBuilder {
            input: &normalized,
            bindings,
        };
        let ast = builder.build_expression(parse_result)?;
        debug!("Built tree: {:?}", ast);
        Ok(ast)
    }
}

/// Rewrites a comma between two digits at bracket depth 0 into a decimal
/// point. The result has the same number of characters as the input.
pub fn normalize_decimal_commas(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut depth: usize = 0;
    let mut in_quotes = false;
    let mut out = String::with_capacity(input.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && depth == 0 => {
                let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
                let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
                if prev_digit && next_digit {
                    out.push('.');
                    continue;
                }
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

fn char_index(input: &str, byte: usize) -> usize {
    input.get(..byte).map_or(byte, |prefix| prefix.chars().count())
}

fn parse_error(input: &str, error: pest::error::Error<Rule>) -> CalculatorError {
    let byte = match error.location {
        InputLocation::Pos(pos) => pos,
        InputLocation::Span((start, _)) => start,
    };
    debug!("Parse error at byte {}: {}", byte, error);
    let index = char_index(input, byte);
    match input.get(byte..).and_then(|rest| rest.chars().next()) {
        Some(c) => CalculatorError::syntax(format!("Unexpected character '{}'", c), index),
        None => CalculatorError::syntax("Unexpected end of expression", index),
    }
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, expected: &str) -> Result<Pair<'i, Rule>, CalculatorError> {
    pairs.next().ok_or_else(|| {
        CalculatorError::unpositioned(ErrorKind::Internal, format!("Expected {}", expected))
    })
}

struct TreeBuilder<'a> {
    input: &'a str,
    bindings: &'a Bindings,
}

impl<'a> TreeBuilder<'a> {
    fn index_of(&self, pair: &Pair<Rule>) -> usize {
        char_index(self.input, pair.as_span().start())
    }

    fn build_expression(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        let mut pairs = pair.into_inner();
        self.build_comparison(next_pair(&mut pairs, "an expression")?)
    }

    fn build_comparison(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        debug!("Building comparison: {:?}", pair.as_str());
        self.build_binary_chain(pair, Self::build_sum)
    }

    fn build_sum(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        self.build_binary_chain(pair, Self::build_term)
    }

    fn build_term(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        self.build_binary_chain(pair, Self::build_power)
    }

    /// `^` is left-associative: `2^3^2` is `(2^3)^2`.
    fn build_power(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        self.build_binary_chain(pair, Self::build_unary)
    }

    /// Folds `operand (operator operand)*` into a left-leaning tree.
    fn build_binary_chain<F>(&self, pair: Pair<Rule>, build_operand: F) -> Result<ASTNode, CalculatorError>
    where
        F: Fn(&Self, Pair<Rule>) -> Result<ASTNode, CalculatorError>,
    {
        let mut pairs = pair.into_inner();
        let mut node = build_operand(self, next_pair(&mut pairs, "an operand")?)?;

        while let Some(operator_pair) = pairs.next() {
            let position = self.index_of(&operator_pair);
            let operator = Operator::try_from(operator_pair.as_str())
                .map_err(|e| CalculatorError::new(ErrorKind::Internal, e, position))?;
            let right = build_operand(self, next_pair(&mut pairs, "an operand")?)?;
            let kind = operator
                .resolve(node.kind(), right.kind())
                .map_err(|e| CalculatorError::from_eval(e, position))?;
            node = ASTNode::BinaryOperation {
                left: Box::new(node),
                operator,
                right: Box::new(right),
                kind,
                position,
            };
        }

        Ok(node)
    }

    fn build_unary(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        let mut pairs = pair.into_inner();
        let first = next_pair(&mut pairs, "an operand")?;
        if first.as_rule() == Rule::MINUS {
            let position = self.index_of(&first);
            let operand = self.build_power(next_pair(&mut pairs, "an operand")?)?;
            return Ok(ASTNode::Negate {
                operand: Box::new(operand),
                position,
            });
        }
        self.build_primary(first)
    }

    fn build_primary(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        let position = self.index_of(&pair);
        match pair.as_rule() {
            Rule::number => {
                let value = pair.as_str().parse::<f64>().map_err(|e| {
                    CalculatorError::new(ErrorKind::Internal, e.to_string(), position)
                })?;
                Ok(ASTNode::Constant(Value::Scalar(value)))
            }
            Rule::vector => self.build_vector(pair),
            Rule::function_call => self.build_function_call(pair),
            Rule::quoted_identifier => {
                let name = pair.as_str().trim_matches('"');
                self.build_variable(name, position)
            }
            Rule::identifier => match functions::constant(pair.as_str()) {
                Some(value) => Ok(ASTNode::Constant(Value::Scalar(value))),
                None => self.build_variable(pair.as_str(), position),
            },
            Rule::group => {
                let mut inner = pair.into_inner();
                self.build_comparison(next_pair(&mut inner, "a grouped expression")?)
            }
            rule => Err(CalculatorError::new(
                ErrorKind::Internal,
                format!("Unexpected rule in primary expression: {:?}", rule),
                position,
            )),
        }
    }

    fn build_variable(&self, name: &str, position: usize) -> Result<ASTNode, CalculatorError> {
        let kind = self.bindings.kind_of(name).ok_or_else(|| {
            CalculatorError::from_eval(EvalError::UnboundVariable(name.to_string()), position)
        })?;
        Ok(ASTNode::Variable {
            name: name.to_string(),
            kind,
            position,
        })
    }

    fn build_vector(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        let position = self.index_of(&pair);
        let mut elements = Vec::new();
        for element in pair.into_inner() {
            let element_position = self.index_of(&element);
            let node = self.build_comparison(element)?;
            if node.kind() != Kind::Scalar {
                return Err(CalculatorError::from_eval(EvalError::NestedVector, element_position));
            }
            elements.push(node);
        }

        let constants: Option<Vec<f64>> = elements
            .iter()
            .map(|node| match node {
                ASTNode::Constant(Value::Scalar(n)) => Some(*n),
                _ => None,
            })
            .collect();
        match constants {
            Some(items) => Ok(ASTNode::Constant(Value::Vector(items))),
            None => Ok(ASTNode::VectorLiteral { elements, position }),
        }
    }

    fn build_function_call(&self, pair: Pair<Rule>) -> Result<ASTNode, CalculatorError> {
        let position = self.index_of(&pair);
        let mut inner = pair.into_inner();
        let name = next_pair(&mut inner, "a function name")?.as_str();
        let args_pair = next_pair(&mut inner, "function arguments")?;
        debug!("Building call to {}", name);

        let descriptor = functions::lookup(name).ok_or_else(|| {
            CalculatorError::from_eval(EvalError::UnknownFunction(name.to_string()), position)
        })?;
        let brackets = if args_pair.as_rule() == Rule::square_args {
            Brackets::Square
        } else {
            Brackets::Round
        };
        descriptor
            .check_brackets(brackets)
            .map_err(|e| CalculatorError::from_eval(e, position))?;

        let args = args_pair
            .into_inner()
            .map(|arg| self.build_comparison(arg))
            .collect::<Result<Vec<ASTNode>, CalculatorError>>()?;
        descriptor
            .check_arity(args.len())
            .map_err(|e| CalculatorError::from_eval(e, position))?;

        let kinds: Vec<Kind> = args.iter().map(ASTNode::kind).collect();
        let kind = descriptor.result_kind(&kinds);

        if descriptor.policy == OperandPolicy::Conditional {
            let mut args = args.into_iter();
            return match (args.next(), args.next(), args.next()) {
                (Some(condition), Some(then_branch), Some(else_branch)) => Ok(ASTNode::Conditional {
                    condition: Box::new(condition),
                    then_branch: Box::new(then_branch),
                    else_branch: Box::new(else_branch),
                    kind,
                    position,
                }),
                _ => Err(CalculatorError::new(
                    ErrorKind::Internal,
                    "Conditional without three branches",
                    position,
                )),
            };
        }

        Ok(ASTNode::FunctionCall {
            name: descriptor.name.to_string(),
            args,
            kind,
            position,
        })
    }
}
