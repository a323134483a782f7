use crate::error::CalculatorError;
use crate::text::SourceText;
use crate::validation::Validator;

pub(crate) struct NumberValidator;

impl Validator for NumberValidator {
    fn name(&self) -> &'static str {
        "numbers"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let words = text.words();
        for pair in words.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            if !(left.is_numeric() && right.is_numeric()) || right.start == left.end {
                continue;
            }
            if text.slice(left.end, right.start).chars().all(char::is_whitespace) {
                return Err(CalculatorError::syntax(
                    format!(
                        "A number cannot contain spaces: '{}'",
                        text.slice(left.start, right.end)
                    ),
                    left.start,
                ));
            }
        }
        Ok(())
    }
}
