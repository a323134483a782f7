mod extractor;
mod input;
mod source_map;
mod substitutor;

use std::collections::HashMap;

pub use extractor::{VariableExtractor, VariableSpan};
pub use input::{parse_value_input, VariableValues};
pub use source_map::SourceMap;
pub use substitutor::{Substitution, VariableSubstitutor};

use crate::ast::{Kind, Value};

/// Caller-supplied variable values. Names are matched case-insensitively,
/// and a scalar shadows a vector of the same name everywhere except as the
/// sole argument of a square-bracket call such as `sum[v]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    scalars: HashMap<String, f64>,
    vectors: HashMap<String, Vec<f64>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_maps(scalars: &HashMap<String, f64>, vectors: &HashMap<String, Vec<f64>>) -> Self {
        Self {
            scalars: scalars
                .iter()
                .map(|(name, value)| (name.to_lowercase(), *value))
                .collect(),
            vectors: vectors
                .iter()
                .map(|(name, values)| (name.to_lowercase(), values.clone()))
                .collect(),
        }
    }

    pub fn with_scalar(mut self, name: &str, value: f64) -> Self {
        self.scalars.insert(name.to_lowercase(), value);
        self
    }

    pub fn with_vector(mut self, name: &str, values: Vec<f64>) -> Self {
        self.vectors.insert(name.to_lowercase(), values);
        self
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.scalars.get(&name.to_lowercase()).copied()
    }

    pub fn vector(&self, name: &str) -> Option<&[f64]> {
        self.vectors.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.scalar(name)
            .map(Value::Scalar)
            .or_else(|| self.vector(name).map(|items| Value::Vector(items.to_vec())))
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.get(name).map(|value| value.kind())
    }

    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.vectors.is_empty()
    }
}
