use crate::ast::{ASTNode, Value};
use crate::error::{CalculatorError, EvalError};
use crate::functions::{self, FunctionDescriptor};
use crate::variables::Bindings;
use log::{debug, trace};

/// Walks a typed tree and produces its value.
///
/// The evaluator holds no state; one instance can be shared across threads
/// and reused for any number of trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `ast`, reading variables from `bindings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` if evaluation succeeds.
    /// * `Err(CalculatorError)` positioned at the node that failed.
    pub fn evaluate(&self, ast: &ASTNode, bindings: &Bindings) -> Result<Value, CalculatorError> {
        let value = self.evaluate_node(ast, bindings)?;
        debug!("Evaluated to {}", value);
        Ok(value)
    }

    fn evaluate_node(&self, ast: &ASTNode, bindings: &Bindings) -> Result<Value, CalculatorError> {
        trace!("Evaluating {:?}", ast);
        match ast {
            ASTNode::Constant(value) => Ok(value.clone()),

            ASTNode::Variable {
                name,
                kind,
                position,
            } => {
                let value = bindings.get(name).ok_or_else(|| {
                    CalculatorError::from_eval(EvalError::UnboundVariable(name.clone()), *position)
                })?;
                if value.kind() != *kind {
                    return Err(CalculatorError::from_eval(
                        EvalError::KindChanged {
                            name: name.clone(),
                            expected: *kind,
                            actual: value.kind(),
                        },
                        *position,
                    ));
                }
                Ok(value)
            }

            ASTNode::VectorLiteral { elements, position } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.evaluate_node(element, bindings)? {
                        Value::Scalar(x) => values.push(x),
                        Value::Vector(_) => {
                            return Err(CalculatorError::from_eval(EvalError::NestedVector, *position))
                        }
                    }
                }
                Ok(Value::Vector(values))
            }

            ASTNode::Negate { operand, .. } => Ok(self.evaluate_node(operand, bindings)?.map(|x| -x)),

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
                position,
                ..
            } => {
                let left_value = self.evaluate_node(left, bindings)?;
                let right_value = self.evaluate_node(right, bindings)?;
                operator
                    .apply_values(left_value, right_value)
                    .map_err(|e| CalculatorError::from_eval(e, *position))
            }

            ASTNode::FunctionCall {
                name,
                args,
                position,
                ..
            } => {
                let function = self.function(name, *position)?;
                let values = args
                    .iter()
                    .map(|arg| self.evaluate_node(arg, bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                function
                    .call(&values)
                    .map_err(|e| CalculatorError::from_eval(e, *position))
            }

            ASTNode::Conditional {
                condition,
                then_branch,
                else_branch,
                kind,
                position,
            } => {
                let function = self.function("if", *position)?;
                let values = [
                    self.evaluate_node(condition, bindings)?,
                    self.evaluate_node(then_branch, bindings)?,
                    self.evaluate_node(else_branch, bindings)?,
                ];
                let chosen = function
                    .call(&values)
                    .map_err(|e| CalculatorError::from_eval(e, *position))?;
                Ok(chosen.promote(*kind))
            }
        }
    }

    fn function(&self, name: &str, position: usize) -> Result<&'static FunctionDescriptor, CalculatorError> {
        functions::lookup(name).ok_or_else(|| {
            CalculatorError::from_eval(EvalError::UnknownFunction(name.to_string()), position)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Kind, Operator, Parser};
    use crate::error::ErrorKind;

    fn eval(input: &str) -> Result<Value, CalculatorError> {
        let ast = Parser::parse_expression(input)?;
        Evaluator::new().evaluate(&ast, &Bindings::new())
    }

    fn eval_with(input: &str, bindings: &Bindings) -> Result<Value, CalculatorError> {
        let ast = Parser::parse_with_bindings(input, bindings)?;
        Evaluator::new().evaluate(&ast, bindings)
    }

    #[test]
    fn test_scalar_arithmetic() {
        assert_eq!(eval("2 + 3 * 4").unwrap(), Value::Scalar(14.0));
        assert_eq!(eval("(2 + 3) * 4").unwrap(), Value::Scalar(20.0));
        assert_eq!(eval("-2^2").unwrap(), Value::Scalar(-4.0));
        assert_eq!(eval("2^3^2").unwrap(), Value::Scalar(64.0));
        assert_eq!(eval("7 % 4").unwrap(), Value::Scalar(3.0));
    }

    #[test]
    fn test_vector_broadcasting() {
        assert_eq!(eval("[1, 3, 1] * 2").unwrap(), Value::Vector(vec![2.0, 6.0, 2.0]));
        assert_eq!(eval("10 - [1, 2]").unwrap(), Value::Vector(vec![9.0, 8.0]));
        assert_eq!(
            eval("[1, 2, 3] + [8, 10, 12]").unwrap(),
            Value::Vector(vec![9.0, 12.0, 15.0])
        );
        assert_eq!(eval("-[1, -2]").unwrap(), Value::Vector(vec![-1.0, 2.0]));
    }

    #[test]
    fn test_comparisons_reduce_to_scalar() {
        assert_eq!(eval("[1, 2] < [3, 4]").unwrap(), Value::Scalar(1.0));
        assert_eq!(eval("[1, 5] < [3, 4]").unwrap(), Value::Scalar(0.0));
        assert_eq!(eval("2 >= 2").unwrap(), Value::Scalar(1.0));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("sqrt(25) + pow(2, 3)").unwrap(), Value::Scalar(13.0));
        assert_eq!(eval("sum[1, 2, 3] + mean[2, 4, 6]").unwrap(), Value::Scalar(10.0));
        assert_eq!(eval("abs(-15) + cos(0) * sin(0)").unwrap(), Value::Scalar(15.0));
        assert_eq!(eval("max([1, 5], [4, 2])").unwrap(), Value::Vector(vec![4.0, 5.0]));
    }

    #[test]
    fn test_conditional_promotes_scalar_branch() {
        assert_eq!(eval("if([2] < [5], 10, 20)").unwrap(), Value::Scalar(10.0));
        assert_eq!(eval("if(1 > 2, [1, 2], 3)").unwrap(), Value::Vector(vec![3.0]));
    }

    #[test]
    fn test_variables() {
        let bindings = Bindings::new()
            .with_scalar("a", -5.0)
            .with_vector("b", vec![10.0, 20.0]);
        assert_eq!(eval_with("abs(a) * mean[b]", &bindings).unwrap(), Value::Scalar(75.0));
        assert_eq!(eval_with("b + a", &bindings).unwrap(), Value::Vector(vec![5.0, 15.0]));
    }

    #[test]
    fn test_kind_changed_after_parse() {
        let parsed_with = Bindings::new().with_scalar("x", 1.0);
        let ast = Parser::parse_with_bindings("x + 1", &parsed_with).unwrap();
        let rebound = Bindings::new().with_vector("x", vec![1.0, 2.0]);
        let err = Evaluator::new().evaluate(&ast, &rebound).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn test_unbound_variable_in_prebuilt_tree() {
        let ast = ASTNode::BinaryOperation {
            left: Box::new(ASTNode::Variable {
                name: "price".to_string(),
                kind: Kind::Scalar,
                position: 0,
            }),
            operator: Operator::Add,
            right: Box::new(ASTNode::Constant(Value::Scalar(20.0))),
            kind: Kind::Scalar,
            position: 6,
        };
        let err = Evaluator::new().evaluate(&ast, &Bindings::new()).unwrap_err();
        assert_eq!(err.message(), "Variable 'price' has no value");

        let bindings = Bindings::new().with_scalar("price", 50.0);
        assert_eq!(Evaluator::new().evaluate(&ast, &bindings).unwrap(), Value::Scalar(70.0));
    }

    #[test]
    fn test_runtime_math_errors_are_positioned() {
        let err = eval("1 + 4 / (2 - 2)").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Math);
        assert_eq!(err.message(), "Division by zero is not allowed");
        assert_eq!(err.position(), 7);

        let err = eval("[1, 2] + [1, 2, 3]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), 8);
    }
}
