mod brackets;
mod commas;
mod function_arguments;
mod function_spacing;
mod functions;
mod missing_operands;
mod numbers;
mod operators;
mod quotes;
mod sqrt;
mod variables;

use log::{debug, trace};

use crate::error::{CalculatorError, ErrorKind};
use crate::text::SourceText;

pub(crate) use brackets::BracketValidator;
pub(crate) use commas::CommaValidator;
pub(crate) use function_arguments::FunctionArgumentValidator;
pub(crate) use function_spacing::FunctionSpacingValidator;
pub(crate) use functions::FunctionValidator;
pub(crate) use missing_operands::MissingOperandValidator;
pub(crate) use numbers::NumberValidator;
pub(crate) use operators::OperatorValidator;
pub(crate) use quotes::QuoteValidator;
pub(crate) use sqrt::SqrtValidator;
pub(crate) use variables::VariableValidator;

/// One stateless check over the raw expression text.
pub(crate) trait Validator: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError>;
}

/// Runs every check in a fixed order and stops at the first failure.
pub struct ExpressionValidator {
    validators: Vec<Box<dyn Validator>>,
}

impl ExpressionValidator {
    pub fn new() -> Self {
        Self {
            validators: vec![
                Box::new(BracketValidator),
                Box::new(QuoteValidator),
                Box::new(OperatorValidator),
                Box::new(CommaValidator),
                Box::new(FunctionValidator),
                Box::new(VariableValidator),
                Box::new(NumberValidator),
                Box::new(MissingOperandValidator),
                Box::new(SqrtValidator),
                Box::new(FunctionArgumentValidator),
                Box::new(FunctionSpacingValidator),
            ],
        }
    }

    pub fn validate(&self, input: &str) -> Result<(), CalculatorError> {
        debug!("Validating expression: {}", input);
        if input.trim().is_empty() {
            return Err(CalculatorError::unpositioned(
                ErrorKind::Syntax,
                "Expression is empty",
            ));
        }

        let text = SourceText::new(input);
        for validator in &self.validators {
            trace!("Running {} check", validator.name());
            validator.validate(&text).inspect_err(|err| {
                debug!("{} check failed: {}", validator.name(), err.report());
            })?;
        }
        Ok(())
    }
}

impl Default for ExpressionValidator {
    fn default() -> Self {
        Self::new()
    }
}
