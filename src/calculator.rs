use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::ast::{Evaluator, Parser, Value};
use crate::error::CalculatorError;
use crate::validation::ExpressionValidator;
use crate::variables::{
    Bindings, SourceMap, VariableExtractor, VariableSpan, VariableSubstitutor, VariableValues,
};

/// Knobs for [`Calculator`]. Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorOptions {
    /// Report positions in the caller's text rather than in the text
    /// produced by substituting variable values.
    pub map_positions_to_source: bool,
    /// Validate the raw text before substitution as well as after it.
    pub validate_before_substitution: bool,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            map_positions_to_source: true,
            validate_before_substitution: true,
        }
    }
}

impl CalculatorOptions {
    pub fn with_map_positions_to_source(mut self, enabled: bool) -> Self {
        self.map_positions_to_source = enabled;
        self
    }

    pub fn with_validate_before_substitution(mut self, enabled: bool) -> Self {
        self.validate_before_substitution = enabled;
        self
    }
}

/// One independent unit of work for [`Calculator::calculate_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationJob {
    pub expression: String,
    pub scalars: HashMap<String, f64>,
    pub vectors: HashMap<String, Vec<f64>>,
}

impl CalculationJob {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Self::default()
        }
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.scalars.insert(name.to_string(), value);
        self
    }

    pub fn with_vector(mut self, name: &str, values: Vec<f64>) -> Self {
        self.vectors.insert(name.to_string(), values);
        self
    }
}

/// Runs the whole pipeline: validate, substitute, validate again, parse, evaluate.
///
/// A `Calculator` keeps no per-call state and is `Sync`, so one instance can
/// serve any number of threads.
pub struct Calculator {
    validator: ExpressionValidator,
    extractor: VariableExtractor,
    substitutor: VariableSubstitutor,
    evaluator: Evaluator,
    options: CalculatorOptions,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_options(CalculatorOptions::default())
    }

    pub fn with_options(options: CalculatorOptions) -> Self {
        Self {
            validator: ExpressionValidator::new(),
            extractor: VariableExtractor::new(),
            substitutor: VariableSubstitutor::new(),
            evaluator: Evaluator::new(),
            options,
        }
    }

    /// Checks `input` without evaluating it.
    pub fn validate(&self, input: &str) -> Result<(), CalculatorError> {
        self.validator.validate(input)
    }

    /// Names the caller has to supply values for, in order of first use.
    pub fn variables(&self, input: &str) -> Vec<String> {
        self.extractor.extract(input)
    }

    pub fn variables_with_positions(&self, input: &str) -> Vec<VariableSpan> {
        self.extractor.extract_with_positions(input)
    }

    /// Reads user-typed values (`"5"`, `"2,5"`, `"[1, 2, 3]"`) for the variables of `input`.
    pub fn read_variable_inputs<'a, I>(&self, input: &str, values: I) -> Result<VariableValues, CalculatorError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        VariableValues::read(input, values)
    }

    /// Evaluates `input` with the given variable values.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` with a scalar or vector result.
    /// * `Err(CalculatorError)` for the first problem found, positioned in
    ///   `input` unless [`CalculatorOptions::map_positions_to_source`] is off.
    pub fn calculate(
        &self,
        input: &str,
        scalars: &HashMap<String, f64>,
        vectors: &HashMap<String, Vec<f64>>,
    ) -> Result<Value, CalculatorError> {
        self.calculate_with_bindings(input, &Bindings::from_maps(scalars, vectors))
    }

    pub fn calculate_values(&self, input: &str, values: &VariableValues) -> Result<Value, CalculatorError> {
        self.calculate(input, &values.scalars, &values.vectors)
    }

    pub fn calculate_with_bindings(&self, input: &str, bindings: &Bindings) -> Result<Value, CalculatorError> {
        debug!("Calculating: {}", input);
        self.run(input, bindings).map_err(CalculatorError::generalize)
    }

    /// Evaluates every job in parallel. Results come back in job order.
    pub fn calculate_batch(&self, jobs: &[CalculationJob]) -> Vec<Result<Value, CalculatorError>> {
        debug!("Calculating a batch of {} expressions", jobs.len());
        jobs.par_iter()
            .map(|job| self.calculate(&job.expression, &job.scalars, &job.vectors))
            .collect()
    }

    fn run(&self, input: &str, bindings: &Bindings) -> Result<Value, CalculatorError> {
        if self.options.validate_before_substitution {
            self.validator.validate(input)?;
        }

        let substitution = self.substitutor.substitute(input, bindings)?;
        let source_map = &substitution.source_map;
        let text = substitution.text.as_str();

        let value = self
            .validator
            .validate(text)
            .and_then(|_| Parser::parse_with_bindings(text, bindings))
            .and_then(|ast| self.evaluator.evaluate(&ast, bindings))
            .map_err(|e| self.to_source(e, source_map))?;
        debug!("Result: {}", value);
        Ok(value)
    }

    fn to_source(&self, error: CalculatorError, source_map: &SourceMap) -> CalculatorError {
        if !self.options.map_positions_to_source || source_map.is_identity() {
            return error;
        }
        error.remap_positions(|index| source_map.to_original(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::Rng;

    fn calc(input: &str) -> Result<Value, CalculatorError> {
        Calculator::new().calculate(input, &HashMap::new(), &HashMap::new())
    }

    fn scalars(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn vectors(pairs: &[(&str, &[f64])]) -> HashMap<String, Vec<f64>> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect()
    }

    fn assert_close(actual: &Value, expected: &[f64], input: &str) {
        let elements = actual.elements();
        assert_eq!(elements.len(), expected.len(), "length mismatch for {}", input);
        for (a, e) in elements.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{}: expected {:?}, got {}", input, expected, actual);
        }
    }

    #[test]
    fn test_literal_expressions() {
        let cases: &[(&str, &[f64])] = &[
            ("2 + 3 * 4", &[14.0]),
            ("(5 - 3) * 4", &[8.0]),
            ("10 / 2 + 1", &[6.0]),
            ("1.1+1,1", &[2.2]),
            ("sqrt(25) + pow(2, 3)", &[13.0]),
            ("abs(-15) + cos(0) * sin(0)", &[15.0]),
            ("sqrt(abs(-25))", &[5.0]),
            ("sum[1, 2, 3] + mean[2, 4, 6]", &[10.0]),
            ("max([3, 4, 5], [2, 7, 2]) - min([1, 2, 3], [1, 1, 5])", &[2.0, 6.0, 2.0]),
            ("max(5, 7) * min(3, 4)", &[21.0]),
            ("if(5 > 3, sum[1, 2], mean[2, 4])", &[3.0]),
            ("if(5>3, 10, 20)", &[10.0]),
            ("if([2] < [5], 10, 20)", &[10.0]),
            ("if(mean[1, 2, 3] > 2, sum[4, 5], sqrt(9))", &[3.0]),
            ("sum[1, 2, 3] * pow(2, 3) / 2 + sqrt(25)", &[29.0]),
            ("sqrt(max(9, 16)) + min(3, 7) * abs(-10)", &[34.0]),
            ("if([5] > [3], mean[2, 4, 6], sqrt(25)) + abs(-5)", &[9.0]),
            ("pow(sum[1, 2], 2) / 2 + sqrt(49)", &[11.5]),
            ("abs(-5) * mean[10, 20] + max(3, 7)", &[82.0]),
            ("[1, 2, 3] + [4, 5, 6] * 2", &[9.0, 12.0, 15.0]),
            ("[10, 20] / [2, 4] + [3, 6]", &[8.0, 11.0]),
            ("[8, 6] - [3, 2] * 2", &[2.0, 2.0]),
            ("[1, 2, 3] + [4, 5, 6] + sqrt(16)", &[9.0, 11.0, 13.0]),
            ("sum[1, 2] * max([2, 5], [3, 4]) + mean[5, 6]", &[14.5, 20.5]),
            ("pow([1, 2], 2) + sum[3, 4, 5]", &[13.0, 16.0]),
            ("max([1, 4], [2, 3]) * sqrt(25) + min(1, 2)", &[11.0, 21.0]),
            ("fact[5] + 2 × 3 ÷ 3", &[122.0]),
        ];
        for (input, expected) in cases {
            let value = calc(input).unwrap_or_else(|e| panic!("{}: {}", input, e.report()));
            assert_close(&value, expected, input);
        }
    }

    #[test]
    fn test_result_kinds() {
        assert_eq!(calc("sum[1, 2]").unwrap(), Value::Scalar(3.0));
        assert_eq!(calc("[1, 2] * 2").unwrap(), Value::Vector(vec![2.0, 4.0]));
    }

    #[test]
    fn test_expressions_with_variables() {
        let cases: &[(&str, &[(&str, f64)], &[(&str, &[f64])], &[f64])] = &[
            ("a + b * c", &[("a", 2.0), ("b", 3.0), ("c", 4.0)], &[], &[14.0]),
            ("(a - b) * c", &[("a", 5.0), ("b", 3.0), ("c", 4.0)], &[], &[8.0]),
            (
                "sum[a] + mean[b]",
                &[("a", 0.0), ("b", 0.0), ("c", 0.0)],
                &[("a", &[1.0, 2.0, 3.0]), ("b", &[4.0, 5.0, 6.0])],
                &[11.0],
            ),
            ("min(a, b)", &[("a", 5.0), ("b", 3.0)], &[], &[3.0]),
            ("pow(a, b)", &[("a", 2.0), ("b", 3.0)], &[], &[8.0]),
            ("abs(a)", &[("a", -15.0)], &[], &[15.0]),
            ("if(a > b, 10, 20)", &[("a", 5.0), ("b", 3.0)], &[], &[10.0]),
            (
                "if(mean[a] > 2, sum[b], sqrt(c))",
                &[("a", 0.0), ("b", 0.0), ("c", 16.0)],
                &[("a", &[1.0, 3.0, 5.0]), ("b", &[2.0, 4.0, 3.0])],
                &[9.0],
            ),
            (
                "sum[a] * pow(b, 3) / 2",
                &[("a", 0.0), ("b", 2.0)],
                &[("a", &[1.0, 2.0])],
                &[12.0],
            ),
            (
                "if(a > b, mean[c], sqrt(c))",
                &[("a", 5.0), ("b", 3.0), ("c", 0.0)],
                &[("c", &[2.0, 4.0, 6.0])],
                &[4.0],
            ),
            (
                "abs(a) * mean[b]",
                &[("a", -5.0), ("b", 0.0)],
                &[("b", &[10.0, 20.0])],
                &[75.0],
            ),
            ("\"my var\" * 2 + X", &[("my var", 1.5), ("x", 1.0)], &[], &[4.0]),
            ("v - 1", &[], &[("v", &[1.0, 2.0])], &[0.0, 1.0]),
        ];
        let calculator = Calculator::new();
        for (input, s, v, expected) in cases {
            let value = calculator
                .calculate(input, &scalars(s), &vectors(v))
                .unwrap_or_else(|e| panic!("{}: {}", input, e.report()));
            assert_close(&value, expected, input);
        }
    }

    #[test]
    fn test_extract_substitute_evaluate() {
        let calculator = Calculator::new();
        let input = "a + b * c";
        assert_eq!(calculator.variables(input), vec!["a", "b", "c"]);
        let values = calculator
            .read_variable_inputs(input, [("a", "2"), ("b", "3"), ("c", "4")])
            .unwrap();
        assert_eq!(calculator.calculate_values(input, &values).unwrap(), Value::Scalar(14.0));
    }

    #[test]
    fn test_reserved_names_are_not_variables() {
        let calculator = Calculator::new();
        assert!(calculator.variables("sqrt(x) + pi * sum[y] - E").iter().all(|n| n == "x" || n == "y"));
    }

    #[test]
    fn test_errors_from_literal_text() {
        let cases: &[(&str, ErrorKind, usize)] = &[
            ("1 / 0", ErrorKind::Math, 3),
            ("sqrt(-1)", ErrorKind::Math, 1),
            ("pow(0, -1)", ErrorKind::Math, 1),
            ("sum[]", ErrorKind::Semantic, 1),
            ("pow(1)", ErrorKind::Semantic, 1),
            ("if(1 > 0, 2)", ErrorKind::Semantic, 1),
            ("cos()", ErrorKind::Syntax, 4),
            ("unknown()", ErrorKind::Syntax, 8),
            ("sum(1, 2", ErrorKind::Syntax, 4),
            ("pow(2, 3", ErrorKind::Syntax, 4),
            ("", ErrorKind::Syntax, 0),
        ];
        for (input, kind, position) in cases {
            let err = calc(input).unwrap_err();
            assert_eq!(err.kind(), *kind, "{}: {}", input, err.report());
            assert_eq!(err.position(), *position, "{}: {}", input, err.report());
        }
    }

    #[test]
    fn test_runtime_errors_are_mapped_to_source() {
        let calculator = Calculator::new();
        let input = "longname / (b - 1)";
        let err = calculator
            .calculate(input, &scalars(&[("longname", 12345.0), ("b", 1.0)]), &HashMap::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Math);
        assert_eq!(err.position(), 10);

        let unmapped = Calculator::with_options(CalculatorOptions::default().with_map_positions_to_source(false));
        let err = unmapped
            .calculate(input, &scalars(&[("longname", 12345.0), ("b", 1.0)]), &HashMap::new())
            .unwrap_err();
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn test_vector_length_errors() {
        let err = Calculator::new()
            .calculate("max(a, b)", &HashMap::new(), &vectors(&[("a", &[1.0, 2.0]), ("b", &[1.0])]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        let positions = err.variable_positions().unwrap();
        assert_eq!(positions, &[("a".to_string(), 5), ("b".to_string(), 8)]);
        assert_eq!(err.position(), 5);

        let err = Calculator::new()
            .calculate("a + b", &HashMap::new(), &vectors(&[("a", &[1.0, 2.0]), ("b", &[1.0])]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), 3);
    }

    #[test]
    fn test_scalar_variables_mix_with_expressions() {
        let values = scalars(&[("a", 1.0), ("b", 2.0), ("x", 2.0), ("n", 3.0)]);
        let calculator = Calculator::new();
        let cases = [
            ("max(a, b + 1)", 3.0),
            ("pow(x, n - 1)", 4.0),
            ("max(sin(a), b)", 2.0),
            ("min(a, -b)", -2.0),
            ("sum[a, 1]", 2.0),
            ("mean[a, b]", 1.5),
        ];
        for (input, expected) in cases {
            assert_eq!(
                calculator.calculate(input, &values, &HashMap::new()),
                Ok(Value::Scalar(expected)),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_vector_variables_reject_mixed_arguments() {
        let values = scalars(&[("b", 2.0)]);
        let lists = vectors(&[("v", &[1.0, 5.0]), ("w", &[2.0, 2.0])]);
        let calculator = Calculator::new();

        let err = calculator.calculate("max(v, b + 1)", &values, &lists).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(
            err.message(),
            "Function 'max' cannot mix vector variables with expressions in its arguments"
        );
        assert_eq!(err.position(), 1);

        let err = calculator.calculate("2 * sum[v, 1]", &values, &lists).unwrap_err();
        assert_eq!(err.position(), 5);
        let err = calculator.calculate("mean[v, w]", &values, &lists).unwrap_err();
        assert_eq!(err.message(), "Function 'mean' takes only one vector variable");

        assert_eq!(
            calculator.calculate("max(v, b)", &values, &lists),
            Ok(Value::Vector(vec![2.0, 5.0]))
        );
    }

    #[test]
    fn test_quoted_vector_in_square_call() {
        let lists = vectors(&[("v", &[2.0, 4.0])]);
        let calculator = Calculator::new();
        let bare = calculator.calculate("mean[v]", &HashMap::new(), &lists);
        let quoted = calculator.calculate("mean[\"v\"]", &HashMap::new(), &lists);
        assert_eq!(bare, Ok(Value::Scalar(3.0)));
        assert_eq!(quoted, bare);
    }

    #[test]
    fn test_unbound_variable() {
        let err = calc("x + 1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.message(), "Variable 'x' has no value");
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn test_invalid_variable_inputs() {
        let err = Calculator::new()
            .read_variable_inputs("a + \"b c\"", [("a", "abc"), ("\"b c\"", "[]")])
            .unwrap_err();
        assert_eq!(err.message(), "Invalid values for variables:\n• a (position 1)\n• b c (position 6)");
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn test_skip_first_validation() {
        let calculator =
            Calculator::with_options(CalculatorOptions::default().with_validate_before_substitution(false));
        assert_eq!(
            calculator.calculate("a * 2", &scalars(&[("a", 4.0)]), &HashMap::new()).unwrap(),
            Value::Scalar(8.0)
        );
        assert!(calculator.calculate("2 +", &HashMap::new(), &HashMap::new()).is_err());
    }

    #[test]
    fn test_batch_preserves_order() {
        let jobs: Vec<CalculationJob> = (0..64)
            .map(|i| CalculationJob::new("x * 2 + sum[v]").with_scalar("x", i as f64).with_vector("v", vec![1.0, 1.0]))
            .collect();
        let results = Calculator::new().calculate_batch(&jobs);
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), Value::Scalar(i as f64 * 2.0 + 2.0));
        }

        let results = Calculator::new().calculate_batch(&[CalculationJob::new("1 / 0"), CalculationJob::new("3")]);
        assert!(results[0].is_err());
        assert_eq!(results[1], Ok(Value::Scalar(3.0)));
    }

    #[test]
    fn test_random_expressions() {
        let mut rng = rand::rng();
        let calculator = Calculator::new();
        for _ in 0..200 {
            let len = rng.random_range(1..6);
            let a: Vec<f64> = (0..len).map(|_| rng.random_range(-100..100) as f64).collect();
            let b: Vec<f64> = (0..len).map(|_| rng.random_range(-100..100) as f64).collect();

            let sum = calculator
                .calculate("a + b", &HashMap::new(), &vectors(&[("a", a.as_slice()), ("b", b.as_slice())]))
                .unwrap();
            let expected: Vec<f64> = a.iter().zip(&b).map(|(x, y)| x + y).collect();
            assert_eq!(sum, Value::Vector(expected));

            let x = rng.random_range(1..50);
            let y = rng.random_range(1..50);
            let input = format!("({} + {}) * {} - sqrt({}) / {}", x, y, x, y, x);
            assert_eq!(calc(&input).unwrap(), calc(&input).unwrap());
        }

        let err = calculator
            .calculate("a + b", &HashMap::new(), &vectors(&[("a", &[1.0, 2.0]), ("b", &[1.0, 2.0, 3.0])]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
    }
}
