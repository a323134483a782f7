use crate::error::{CalculatorError, EvalError};
use crate::text::{is_word_char, SourceText};
use crate::validation::Validator;

/// Rejects `sqrt(-x)` where the argument starts with a negated literal or name.
pub(crate) struct SqrtValidator;

impl Validator for SqrtValidator {
    fn name(&self) -> &'static str {
        "sqrt"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        for word in text.words() {
            if !word.text.eq_ignore_ascii_case("sqrt") {
                continue;
            }
            let Some((open, '(')) = text.next_non_space(word.end - 1) else {
                continue;
            };
            let Some((minus, '-')) = text.next_non_space(open) else {
                continue;
            };
            if text.next_non_space(minus).is_some_and(|(_, c)| is_word_char(c)) {
                return Err(CalculatorError::from_eval(EvalError::NegativeSqrt, word.start));
            }
        }
        Ok(())
    }
}
