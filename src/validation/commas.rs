use crate::error::CalculatorError;
use crate::text::{Call, SourceText};
use crate::validation::Validator;

pub(crate) struct CommaValidator;

impl CommaValidator {
    /// Outside brackets a comma can only be a decimal mark between digits,
    /// or sit between brackets and quoted names.
    fn check_top_level(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let depths = text.depths();
        for (i, &c) in text.chars().iter().enumerate() {
            if c != ',' || text.is_quoted(i) || depths[i] != 0 {
                continue;
            }
            let prev_ok = i
                .checked_sub(1)
                .and_then(|p| text.char_at(p))
                .is_some_and(|p| p.is_ascii_digit() || matches!(p, ')' | ']' | '"'));
            let next_ok = text
                .char_at(i + 1)
                .is_some_and(|n| n.is_ascii_digit() || matches!(n, '(' | '[' | '"'));
            if !(prev_ok && next_ok) {
                return Err(CalculatorError::syntax(
                    "Invalid comma outside function arguments",
                    i,
                ));
            }
        }
        Ok(())
    }

    fn check_call(&self, text: &SourceText, call: &Call) -> Result<(), CalculatorError> {
        let Some(close) = call.close else {
            return Ok(());
        };

        if let Some((first, ',')) = text.next_non_space(call.open) {
            if first < close {
                return Err(CalculatorError::syntax(
                    "Function arguments cannot start with a comma",
                    first,
                ));
            }
        }
        if let Some((last, ',')) = text.prev_non_space(close) {
            if last > call.open {
                return Err(CalculatorError::syntax(
                    "Function arguments cannot end with a comma",
                    last,
                ));
            }
        }
        for i in call.open + 1..close {
            if text.char_at(i) != Some(',') || text.is_quoted(i) {
                continue;
            }
            if let Some((next, ',')) = text.next_non_space(i) {
                if next < close {
                    return Err(CalculatorError::syntax("Two commas in a row are not allowed", i));
                }
            }
        }
        Ok(())
    }
}

impl Validator for CommaValidator {
    fn name(&self) -> &'static str {
        "commas"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        self.check_top_level(text)?;
        for call in text.calls() {
            self.check_call(text, &call)?;
        }
        Ok(())
    }
}
