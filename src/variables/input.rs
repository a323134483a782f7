use std::collections::HashMap;

use crate::ast::Value;
use crate::error::CalculatorError;
use crate::variables::VariableExtractor;

/// Values read from user-typed text, split by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableValues {
    pub scalars: HashMap<String, f64>,
    pub vectors: HashMap<String, Vec<f64>>,
}

impl VariableValues {
    /// Reads one text value per variable of `expression`.
    ///
    /// Every unreadable value is collected, and the error lists each bad
    /// name with where it first appears in the expression.
    pub fn read<'a, I>(expression: &str, inputs: I) -> Result<Self, CalculatorError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let positions = VariableExtractor::new().extract_with_positions(expression);
        let mut values = VariableValues::default();
        let mut invalid = Vec::new();

        for (name, raw) in inputs {
            match parse_value_input(raw) {
                Some(Value::Scalar(n)) => {
                    values.scalars.insert(name.to_string(), n);
                }
                Some(Value::Vector(items)) => {
                    values.vectors.insert(name.to_string(), items);
                }
                None => {
                    let position = positions
                        .iter()
                        .find(|span| span.name.to_lowercase() == name.trim_matches('"').to_lowercase())
                        .map(|span| span.start);
                    invalid.push((name.to_string(), position));
                }
            }
        }

        if invalid.is_empty() {
            Ok(values)
        } else {
            Err(CalculatorError::invalid_variables(invalid))
        }
    }
}

/// Parses a value typed by a user.
///
/// `[1, 2, 3]` is a vector. Inside brackets, when `;` separates the elements,
/// `,` is a decimal mark instead (`[1,5; 2,5]`). Outside brackets `,` is
/// always a decimal mark. Non-finite and empty values are rejected.
pub fn parse_value_input(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Some(inner) = raw.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let items: Option<Vec<f64>> = if inner.contains(';') {
            inner
                .split(';')
                .filter(|item| !item.trim().is_empty())
                .map(|item| parse_number(&item.replace(',', ".")))
                .collect()
        } else {
            inner
                .split(',')
                .filter(|item| !item.trim().is_empty())
                .map(parse_number)
                .collect()
        };
        return items.filter(|items| !items.is_empty()).map(Value::Vector);
    }
    parse_number(&raw.replace(',', ".")).map(Value::Scalar)
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(parse_value_input("5"), Some(Value::Scalar(5.0)));
        assert_eq!(parse_value_input(" -2.5 "), Some(Value::Scalar(-2.5)));
        assert_eq!(parse_value_input("1,5"), Some(Value::Scalar(1.5)));
        assert_eq!(parse_value_input("abc"), None);
        assert_eq!(parse_value_input("inf"), None);
        assert_eq!(parse_value_input(""), None);
    }

    #[test]
    fn test_vectors() {
        assert_eq!(parse_value_input("[1, 2, 3]"), Some(Value::Vector(vec![1.0, 2.0, 3.0])));
        assert_eq!(parse_value_input("[1,5; 2,5]"), Some(Value::Vector(vec![1.5, 2.5])));
        assert_eq!(parse_value_input("[1, 2,]"), Some(Value::Vector(vec![1.0, 2.0])));
        assert_eq!(parse_value_input("[]"), None);
        assert_eq!(parse_value_input("[1, x]"), None);
    }

    #[test]
    fn test_read_splits_by_kind() {
        let values = VariableValues::read("a + sum[b]", [("a", "2"), ("b", "[1, 2]")]).unwrap();
        assert_eq!(values.scalars.get("a"), Some(&2.0));
        assert_eq!(values.vectors.get("b"), Some(&vec![1.0, 2.0]));
    }

    #[test]
    fn test_read_reports_every_bad_value() {
        let err = VariableValues::read("a + b * c", [("a", "x"), ("b", "1"), ("c", "[")]).unwrap_err();
        assert_eq!(
            err.message(),
            "Invalid values for variables:\n• a (position 1)\n• c (position 9)"
        );
        assert_eq!(
            err.variable_positions(),
            Some(&[("a".to_string(), 1), ("c".to_string(), 9)][..])
        );
    }
}
