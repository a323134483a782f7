use crate::error::CalculatorError;
use crate::text::{is_word_char, SourceText};
use crate::validation::Validator;

const ARITHMETIC_OPERATORS: [char; 9] = ['+', '-', '*', '/', '%', '^', '×', '⋅', '÷'];

/// Characters after which a `-` negates instead of subtracting.
const BEFORE_UNARY_MINUS: &str = "+-*/%^×⋅÷([,<>=!";

fn ends_operand(c: char) -> bool {
    is_word_char(c) || matches!(c, ')' | ']' | '"')
}

fn starts_operand(c: char) -> bool {
    is_word_char(c) || matches!(c, '(' | '[' | '"' | '-')
}

pub(crate) struct MissingOperandValidator;

impl Validator for MissingOperandValidator {
    fn name(&self) -> &'static str {
        "missing operands"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        for (i, &c) in text.chars().iter().enumerate() {
            if text.is_quoted(i) || !ARITHMETIC_OPERATORS.contains(&c) {
                continue;
            }
            let prev = text.prev_non_space(i).map(|(_, p)| p);
            if c == '-' && prev.map_or(true, |p| BEFORE_UNARY_MINUS.contains(p)) {
                continue;
            }
            let next = text.next_non_space(i).map(|(_, n)| n);
            if !prev.is_some_and(ends_operand) || !next.is_some_and(starts_operand) {
                return Err(CalculatorError::syntax(
                    format!("Missing operand for operator '{}'", c),
                    i,
                ));
            }
        }
        Ok(())
    }
}
