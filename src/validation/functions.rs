use crate::error::{CalculatorError, EvalError};
use crate::functions::{self, Brackets, FunctionDescriptor, OperandPolicy};
use crate::text::{Argument, ArgumentShape, Call, SourceText};
use crate::validation::Validator;

fn looks_like_condition(text: &str) -> bool {
    text.contains(['<', '>', '!', '='])
}

pub(crate) struct FunctionValidator;

impl FunctionValidator {
    fn known_calls(&self, calls: &[Call]) -> Result<Vec<(Call, &'static FunctionDescriptor)>, CalculatorError> {
        calls
            .iter()
            .map(|call| {
                functions::lookup(&call.name)
                    .map(|descriptor| (call.clone(), descriptor))
                    .ok_or_else(|| {
                        CalculatorError::from_eval(EvalError::UnknownFunction(call.name.clone()), call.name_start)
                    })
            })
            .collect()
    }

    fn check_arguments(
        &self,
        text: &SourceText,
        call: &Call,
        descriptor: &FunctionDescriptor,
    ) -> Result<(), CalculatorError> {
        if call.close.is_none() {
            return Ok(());
        }
        let arguments = text.arguments(call);
        descriptor
            .check_arity(arguments.len())
            .map_err(|e| CalculatorError::from_eval(e, call.name_start))?;

        if descriptor.policy == OperandPolicy::Conditional {
            if let Some(condition) = arguments.first() {
                if !looks_like_condition(&condition.text) {
                    return Err(CalculatorError::semantic(
                        format!(
                            "The first argument of '{}' must be a comparison, got '{}'",
                            descriptor.name, condition.text
                        ),
                        condition.start,
                    ));
                }
            }
        }
        Ok(())
    }

    /// A literal exponent of `pow` must not be negative. Exponents held in
    /// variables are checked when the call is evaluated.
    fn check_literal_exponent(&self, arguments: &[Argument], call: &Call) -> Result<(), CalculatorError> {
        match arguments.get(1).map(Argument::shape) {
            Some(ArgumentShape::Number(n)) if n < 0.0 => {
                Err(CalculatorError::from_eval(EvalError::NegativeExponent, call.name_start))
            }
            Some(ArgumentShape::VectorLiteral(items)) if items.iter().any(|n| *n < 0.0) => {
                Err(CalculatorError::math(
                    "The second argument of 'pow' must not contain negative values",
                    call.name_start,
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Validator for FunctionValidator {
    fn name(&self) -> &'static str {
        "functions"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let calls = self.known_calls(&text.calls())?;

        for (call, descriptor) in &calls {
            descriptor
                .check_brackets(call.brackets)
                .map_err(|e| CalculatorError::from_eval(e, call.name_start))?;
        }

        for (call, descriptor) in &calls {
            self.check_arguments(text, call, descriptor)?;
        }

        for word in text.words() {
            let Some(descriptor) = functions::lookup(&word.text) else {
                continue;
            };
            let followed_by_bracket = text
                .next_non_space(word.end - 1)
                .is_some_and(|(_, c)| Brackets::from_open(c).is_some());
            if !followed_by_bracket {
                let open = descriptor.brackets.open();
                let close = if open == '(' { ')' } else { ']' };
                return Err(CalculatorError::semantic(
                    format!(
                        "Function '{}' must be called with {}: {}{}...{}",
                        descriptor.name,
                        descriptor.brackets.describe(),
                        descriptor.name,
                        open,
                        close
                    ),
                    word.start,
                ));
            }
        }

        for (call, descriptor) in &calls {
            if descriptor.name == "pow" {
                self.check_literal_exponent(&text.arguments(call), call)?;
            }
        }
        Ok(())
    }
}
