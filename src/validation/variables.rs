use crate::error::CalculatorError;
use crate::functions::is_reserved;
use crate::text::{is_word_char, SourceText};
use crate::validation::Validator;

/// Punctuation that may appear outside quotes.
const ALLOWED_SYMBOLS: &str = "+-*/%^().,[]<>=!\"×⋅÷";

pub(crate) struct VariableValidator;

impl VariableValidator {
    /// Two names separated only by whitespace, e.g. `my var`. Pairs of
    /// reserved names are left alone and pairs of numbers belong to the
    /// number check.
    fn check_spaced_names(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let words = text.words();
        for pair in words.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if right.start == left.end {
                continue;
            }
            let gap = text.slice(left.end, right.start);
            if !gap.chars().all(char::is_whitespace) {
                continue;
            }
            if left.is_numeric() && right.is_numeric() {
                continue;
            }
            if is_reserved(&left.text) && is_reserved(&right.text) {
                continue;
            }
            return Err(CalculatorError::syntax(
                format!(
                    "Names cannot contain spaces: '{}'",
                    text.slice(left.start, right.end)
                ),
                left.end,
            ));
        }
        Ok(())
    }

    fn check_characters(&self, text: &SourceText) -> Result<(), CalculatorError> {
        for (i, &c) in text.chars().iter().enumerate() {
            if text.is_quoted(i) || is_word_char(c) || c.is_whitespace() || ALLOWED_SYMBOLS.contains(c) {
                continue;
            }
            return Err(CalculatorError::syntax(format!("Invalid character: '{}'", c), i));
        }
        Ok(())
    }
}

impl Validator for VariableValidator {
    fn name(&self) -> &'static str {
        "variables"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        self.check_spaced_names(text)?;
        self.check_characters(text)
    }
}
