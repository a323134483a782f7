use crate::error::CalculatorError;
use crate::text::SourceText;
use crate::validation::Validator;

pub(crate) struct BracketValidator;

fn closing(open: char) -> char {
    if open == '(' {
        ')'
    } else {
        ']'
    }
}

impl Validator for BracketValidator {
    fn name(&self) -> &'static str {
        "brackets"
    }

    fn validate(&self, text: &SourceText) -> Result<(), CalculatorError> {
        let mut stack: Vec<(usize, char)> = Vec::new();

        for (i, &c) in text.chars().iter().enumerate() {
            if text.is_quoted(i) {
                continue;
            }
            match c {
                '(' | '[' => stack.push((i, c)),
                ')' | ']' => {
                    let Some((open_index, open)) = stack.pop() else {
                        return Err(CalculatorError::syntax(
                            format!("Unexpected closing bracket '{}'", c),
                            i,
                        ));
                    };
                    if closing(open) != c {
                        return Err(CalculatorError::syntax(
                            format!("Bracket '{}' is closed by '{}'", open, c),
                            open_index,
                        ));
                    }
                }
                _ => {}
            }
        }

        if let Some((index, open)) = stack.pop() {
            return Err(CalculatorError::syntax(
                format!("Unclosed bracket '{}'", open),
                index,
            ));
        }

        for (i, &c) in text.chars().iter().enumerate() {
            if c == '(' && !text.is_quoted(i) && matches!(text.next_non_space(i), Some((_, ')'))) {
                return Err(CalculatorError::syntax(
                    "Empty parentheses '()' are not allowed",
                    i,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(input: &str) -> Result<(), CalculatorError> {
        BracketValidator.validate(&SourceText::new(input))
    }

    #[test]
    fn test_balanced() {
        assert!(check("max([1, 2], (3))").is_ok());
        assert!(check("\")(\" + 1").is_ok());
    }

    #[test]
    fn test_unexpected_closer() {
        let err = check("1 + 2)").unwrap_err();
        assert_eq!(err.message(), "Unexpected closing bracket ')'");
        assert_eq!(err.position(), 6);
    }

    #[test]
    fn test_mismatch_reported_at_opener() {
        let err = check("2 * (1]").unwrap_err();
        assert_eq!(err.message(), "Bracket '(' is closed by ']'");
        assert_eq!(err.position(), 5);
    }

    #[test]
    fn test_innermost_unclosed() {
        assert_eq!(check("sum(1, 2").unwrap_err().position(), 4);
        assert_eq!(check("sqrt(1 + (2").unwrap_err().position(), 10);
    }

    #[test]
    fn test_empty_parentheses() {
        let err = check("cos( )").unwrap_err();
        assert_eq!(err.message(), "Empty parentheses '()' are not allowed");
        assert_eq!(err.position(), 4);
        assert!(check("sum[]").is_ok());
    }
}
