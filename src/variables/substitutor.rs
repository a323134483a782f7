use log::debug;

use crate::ast::Value;
use crate::error::{CalculatorError, ErrorKind};
use crate::functions::{self, Arity, Brackets, FunctionDescriptor, OperandPolicy};
use crate::text::{is_word_char, Argument, ArgumentShape, Call, SourceText};
use crate::variables::{Bindings, SourceMap};

/// A rewritten expression plus the map back to the caller's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub text: String,
    pub source_map: SourceMap,
}

/// Replaces variable references with literal values.
///
/// Rewrites happen as if in these passes:
/// 1. quoted references become literals;
/// 2. a lone vector variable inside a square-bracket call (`sum[v]` or
///    `sum["v"]`) is inlined as that call's argument list, even when a scalar
///    shares its name;
/// 3. calls reject vector variables mixed with arguments they cannot be
///    combined with, and calls taking several arguments reject vector
///    variables of unequal length;
/// 4. remaining bare names become literals, scalars before vectors.
///
/// Scalars are written in invariant form, negative ones parenthesized, and
/// vectors as `[1, 2, 3]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableSubstitutor;

struct Replacement {
    start: usize,
    end: usize,
    text: String,
}

impl VariableSubstitutor {
    pub fn new() -> Self {
        Self
    }

    pub fn substitute(&self, input: &str, bindings: &Bindings) -> Result<Substitution, CalculatorError> {
        let text = SourceText::new(input);
        let mut replacements = Vec::new();

        for quote in text.quotes() {
            let Some(close) = quote.close else {
                continue;
            };
            let name = text.slice(quote.open + 1, close);
            let inlined = if is_sole_square_argument(&text, quote.open, close + 1) {
                bindings
                    .vector(&name)
                    .map(|items| elements(&name, items, quote.open))
                    .transpose()?
            } else {
                None
            };
            let replacement = match inlined {
                Some(list) => Some(list),
                None => bindings
                    .get(&name)
                    .map(|value| literal(&name, &value, quote.open))
                    .transpose()?,
            };
            if let Some(replacement) = replacement {
                replacements.push(Replacement {
                    start: quote.open,
                    end: close + 1,
                    text: replacement,
                });
            }
        }

        check_argument_mixing(&text, bindings)?;
        check_vector_lengths(&text, bindings)?;

        for word in text.words() {
            if word.is_numeric() || functions::is_reserved(&word.text) {
                continue;
            }
            let inlined = if is_sole_square_argument(&text, word.start, word.end) {
                bindings
                    .vector(&word.text)
                    .map(|items| elements(&word.text, items, word.start))
                    .transpose()?
            } else {
                None
            };
            let replacement = match inlined {
                Some(list) => Some(list),
                None => bindings
                    .get(&word.text)
                    .map(|value| literal(&word.text, &value, word.start))
                    .transpose()?,
            };
            if let Some(replacement) = replacement {
                replacements.push(Replacement {
                    start: word.start,
                    end: word.end,
                    text: replacement,
                });
            }
        }

        replacements.sort_by_key(|replacement| replacement.start);
        let substitution = apply(&text, &replacements);
        debug!("Substituted expression: {}", substitution.text);
        Ok(substitution)
    }
}

fn apply(text: &SourceText, replacements: &[Replacement]) -> Substitution {
    let mut out = String::with_capacity(text.len());
    let mut out_len = 0;
    let mut source_map = SourceMap::identity();
    let mut cursor = 0;

    for replacement in replacements {
        let kept = text.slice(cursor, replacement.start);
        out_len += kept.chars().count();
        out.push_str(&kept);

        let written = replacement.text.chars().count();
        source_map.record(
            replacement.start,
            replacement.end - replacement.start,
            out_len,
            written,
        );
        out.push_str(&replacement.text);
        out_len += written;
        cursor = replacement.end;
    }
    out.push_str(&text.slice(cursor, text.len()));

    Substitution {
        text: out,
        source_map,
    }
}

fn format_number(n: f64) -> String {
    // Avoids printing "-0".
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

fn ensure_finite(name: &str, n: f64, index: usize) -> Result<(), CalculatorError> {
    if n.is_finite() {
        Ok(())
    } else {
        Err(CalculatorError::with_variables(
            ErrorKind::Semantic,
            format!("Variable '{}' must be a finite number", name),
            vec![(name.to_string(), Some(index))],
        ))
    }
}

fn elements(name: &str, items: &[f64], index: usize) -> Result<String, CalculatorError> {
    if items.is_empty() {
        return Err(CalculatorError::with_variables(
            ErrorKind::Semantic,
            format!("Variable '{}' must not be an empty vector", name),
            vec![(name.to_string(), Some(index))],
        ));
    }
    let mut formatted = Vec::with_capacity(items.len());
    for n in items {
        ensure_finite(name, *n, index)?;
        formatted.push(format_number(*n));
    }
    Ok(formatted.join(", "))
}

fn literal(name: &str, value: &Value, index: usize) -> Result<String, CalculatorError> {
    match value {
        Value::Scalar(n) => {
            ensure_finite(name, *n, index)?;
            if *n < 0.0 {
                Ok(format!("({})", format_number(*n)))
            } else {
                Ok(format_number(*n))
            }
        }
        Value::Vector(items) => Ok(format!("[{}]", elements(name, items, index)?)),
    }
}

/// True for the span `start..end` in `f[ name ]` where `f` takes square brackets.
fn is_sole_square_argument(text: &SourceText, start: usize, end: usize) -> bool {
    let Some((open, '[')) = text.prev_non_space(start) else {
        return false;
    };
    if !matches!(text.next_non_space(end - 1), Some((_, ']'))) {
        return false;
    }
    let Some((name_end, _)) = text.prev_non_space(open) else {
        return false;
    };
    let name_start = (0..=name_end)
        .rev()
        .take_while(|i| text.char_at(*i).is_some_and(is_word_char))
        .last()
        .unwrap_or(name_end);
    functions::lookup(&text.slice(name_start, name_end + 1))
        .is_some_and(|descriptor| descriptor.brackets == Brackets::Square)
}

/// A name counts as a vector variable only when no scalar shadows it.
fn vector_variable<'a>(bindings: &'a Bindings, argument: &Argument) -> Option<(String, &'a [f64])> {
    let ArgumentShape::Reference(name) = argument.shape() else {
        return None;
    };
    if bindings.scalar(&name).is_some() {
        return None;
    }
    let items = bindings.vector(&name)?;
    Some((name, items))
}

fn mixing_error(call: &Call, message: String) -> CalculatorError {
    CalculatorError::semantic(message, call.name_start)
}

/// Square-bracket functions take either one vector variable or only
/// literals. Elementwise binary functions do not combine a vector variable
/// with a computed expression.
fn check_argument_mixing(text: &SourceText, bindings: &Bindings) -> Result<(), CalculatorError> {
    for call in text.calls() {
        let Some(descriptor) = functions::lookup(&call.name) else {
            continue;
        };
        let arguments = text.arguments(&call);
        let vectors = arguments
            .iter()
            .filter(|argument| vector_variable(bindings, argument).is_some())
            .count();
        if vectors == 0 {
            continue;
        }
        let shapes: Vec<ArgumentShape> = arguments.iter().map(Argument::shape).collect();

        if descriptor.brackets == Brackets::Square {
            check_square_arguments(&call, descriptor, &shapes, vectors)?;
        } else if descriptor.policy == OperandPolicy::Elementwise
            && descriptor.arity == Arity::Fixed(2)
            && shapes.contains(&ArgumentShape::Expression)
        {
            return Err(mixing_error(
                &call,
                format!(
                    "Function '{}' cannot mix vector variables with expressions in its arguments",
                    descriptor.name
                ),
            ));
        }
    }
    Ok(())
}

fn check_square_arguments(
    call: &Call,
    descriptor: &FunctionDescriptor,
    shapes: &[ArgumentShape],
    vectors: usize,
) -> Result<(), CalculatorError> {
    let literals = shapes
        .iter()
        .any(|s| matches!(s, ArgumentShape::Number(_) | ArgumentShape::VectorLiteral(_)));
    if literals {
        return Err(mixing_error(
            call,
            format!(
                "Function '{}' takes either a vector variable or numbers and vector literals, not both",
                descriptor.name
            ),
        ));
    }
    if vectors > 1 {
        return Err(mixing_error(
            call,
            format!("Function '{}' takes only one vector variable", descriptor.name),
        ));
    }
    Ok(())
}

fn check_vector_lengths(text: &SourceText, bindings: &Bindings) -> Result<(), CalculatorError> {
    for call in text.calls() {
        let Some(descriptor) = functions::lookup(&call.name) else {
            continue;
        };
        if !matches!(descriptor.arity, Arity::Fixed(n) if n >= 2) {
            continue;
        }

        let vectors: Vec<(String, usize, usize)> = text
            .arguments(&call)
            .iter()
            .filter_map(|argument| {
                let (name, items) = vector_variable(bindings, argument)?;
                Some((name, argument.start, items.len()))
            })
            .collect();

        let Some((_, _, first_len)) = vectors.first() else {
            continue;
        };
        if vectors.iter().all(|(_, _, len)| len == first_len) {
            continue;
        }

        let lengths: Vec<String> = vectors
            .iter()
            .map(|(name, _, len)| format!("'{}' has {}", name, len))
            .collect();
        return Err(CalculatorError::with_variables(
            ErrorKind::Semantic,
            format!(
                "Function {} requires vectors of equal length: {}",
                descriptor.name,
                lengths.join(", ")
            ),
            vectors
                .into_iter()
                .map(|(name, start, _)| (name, Some(start)))
                .collect(),
        ));
    }
    Ok(())
}
