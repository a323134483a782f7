use crate::error::CalculatorError;
use crate::text::{is_word_char, SourceText};
use crate::validation::Validator;

/// Operators that may never directly follow one another.
const SEQUENCE_OPERATORS: [char; 5] = ['+', '-', '*', '/', '^'];

pub(crate) struct OperatorValidator;

impl OperatorValidator {
    fn check_sequences(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let chars = text.chars();
        let mut i = 0;
        while i < chars.len() {
            if text.is_quoted(i) || !SEQUENCE_OPERATORS.contains(&chars[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && !text.is_quoted(i) && SEQUENCE_OPERATORS.contains(&chars[i]) {
                i += 1;
            }
            if i - start >= 2 {
                return Err(CalculatorError::syntax(
                    format!("Invalid operator sequence '{}'", text.slice(start, i)),
                    start,
                ));
            }
        }
        Ok(())
    }

    /// `=` is only valid as part of `<=`, `>=` or `!=`, and `==` only inside brackets.
    fn check_equals(&self, text: &SourceText, depths: &[usize]) -> Result<(), CalculatorError> {
        let chars = text.chars();
        let mut i = 0;
        while i < chars.len() {
            if text.is_quoted(i) || chars[i] != '=' {
                i += 1;
                continue;
            }
            let start = i;
            while i < chars.len() && chars[i] == '=' {
                i += 1;
            }
            let after_comparison = start > 0 && matches!(chars[start - 1], '<' | '>' | '!');
            match i - start {
                1 if after_comparison => {}
                1 if depths[start] == 0 => {
                    return Err(CalculatorError::syntax(
                        "The '=' sign is not allowed in an expression",
                        start,
                    ))
                }
                2 if depths[start] == 0 => {
                    return Err(CalculatorError::syntax(
                        "The '==' operator is not allowed outside brackets",
                        start,
                    ))
                }
                1 | 2 => {}
                _ => {
                    return Err(CalculatorError::syntax(
                        format!("Invalid operator sequence '{}'", text.slice(start, i)),
                        start,
                    ))
                }
            }
        }
        Ok(())
    }

    /// A division whose right operand is a literal zero.
    fn check_zero_divisor(&self, text: &SourceText, depths: &[usize]) -> Result<(), CalculatorError> {
        let chars = text.chars();
        for (i, &c) in chars.iter().enumerate() {
            if text.is_quoted(i) || !matches!(c, '/' | '÷') {
                continue;
            }
            let Some((start, _)) = text.next_non_space(i) else {
                continue;
            };
            let mut end = start;
            while end < chars.len() && chars[end].is_ascii_digit() {
                end += 1;
            }
            if end == start {
                continue;
            }
            let decimal_mark = chars.get(end).is_some_and(|&m| m == '.' || (m == ',' && depths[end] == 0));
            if decimal_mark && chars.get(end + 1).is_some_and(|d| d.is_ascii_digit()) {
                end += 1;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
            }
            if chars.get(end).is_some_and(|&next| is_word_char(next)) {
                continue;
            }
            let literal = text.slice(start, end).replace(',', ".");
            if literal.parse::<f64>().is_ok_and(|divisor| divisor == 0.0) {
                return Err(CalculatorError::math("Division by zero is not allowed", i));
            }
        }
        Ok(())
    }
}

impl Validator for OperatorValidator {
    fn name(&self) -> &'static str {
        "operators"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let depths = text.depths();
        self.check_sequences(text)?;
        self.check_equals(text, &depths)?;
        self.check_zero_divisor(text, &depths)
    }
}
