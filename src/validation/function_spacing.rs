use crate::error::CalculatorError;
use crate::functions::{self, Brackets};
use crate::text::SourceText;
use crate::validation::Validator;

pub(crate) struct FunctionSpacingValidator;

impl Validator for FunctionSpacingValidator {
    fn name(&self) -> &'static str {
        "function spacing"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        for word in text.words() {
            if functions::lookup(&word.text).is_none() {
                continue;
            }
            let spaced = text.char_at(word.end).is_some_and(char::is_whitespace);
            let bracketed = text
                .next_non_space(word.end - 1)
                .is_some_and(|(_, c)| Brackets::from_open(c).is_some());
            if spaced && bracketed {
                return Err(CalculatorError::syntax(
                    format!(
                        "Function '{}' must be followed directly by its bracket",
                        word.text
                    ),
                    word.start,
                ));
            }
        }
        Ok(())
    }
}
