use crate::error::CalculatorError;
use crate::text::SourceText;
use crate::validation::Validator;

pub(crate) struct QuoteValidator;

impl Validator for QuoteValidator {
    fn name(&self) -> &'static str {
        "quotes"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        if let Some(unclosed) = text.quotes().iter().find(|quote| quote.close.is_none()) {
            return Err(CalculatorError::syntax("Unclosed quote", unclosed.open));
        }
        if let Some(empty) = text
            .quotes()
            .iter()
            .find(|quote| quote.close == Some(quote.open + 1))
        {
            return Err(CalculatorError::syntax(
                "Empty quotes are not allowed",
                empty.open,
            ));
        }
        Ok(())
    }
}
