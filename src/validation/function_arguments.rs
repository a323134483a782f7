use crate::error::CalculatorError;
use crate::functions;
use crate::text::SourceText;
use crate::validation::Validator;

/// Rejects assignment-looking `=` and `==` inside the arguments of a known function.
pub(crate) struct FunctionArgumentValidator;

impl Validator for FunctionArgumentValidator {
    fn name(&self) -> &'static str {
        "function arguments"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let chars = text.chars();
        for call in text.calls() {
            let Some(close) = call.close else {
                continue;
            };
            if functions::lookup(&call.name).is_none() {
                continue;
            }

            let mut i = call.open + 1;
            while i < close {
                if text.is_quoted(i) || chars[i] != '=' {
                    i += 1;
                    continue;
                }
                let start = i;
                while i < close && chars[i] == '=' {
                    i += 1;
                }
                let after_comparison = matches!(chars[start - 1], '<' | '>' | '!');
                if i - start == 1 && after_comparison {
                    continue;
                }
                let message = if i - start == 1 {
                    "The '=' sign is not allowed in function arguments; compare with '<=', '>=' or '!=' instead"
                } else {
                    "The '==' operator is not allowed in function arguments; compare with '<', '>', '<=', '>=' or '!=' instead"
                };
                return Err(CalculatorError::syntax(message, start));
            }
        }
        Ok(())
    }
}
