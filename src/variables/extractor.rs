use log::debug;

use crate::functions::is_reserved;
use crate::text::SourceText;

/// Where a variable first appears. `start` is a 0-based character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSpan {
    pub name: String,
    pub start: usize,
    pub len: usize,
}

/// Finds the names an expression needs values for.
///
/// Quoted spans name a variable by their inner text, whatever it contains.
/// Outside quotes a variable is a run of word characters that is not purely
/// digits, not a number, and not a reserved function or constant name.
/// Names compare case-insensitively and keep their first spelling and position.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableExtractor;

impl VariableExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, input: &str) -> Vec<String> {
        self.extract_with_positions(input)
            .into_iter()
            .map(|span| span.name)
            .collect()
    }

    pub fn extract_with_positions(&self, input: &str) -> Vec<VariableSpan> {
        let text = SourceText::new(input);
        let mut found: Vec<VariableSpan> = Vec::new();
        let mut push = |span: VariableSpan| {
            let key = span.name.to_lowercase();
            if !found.iter().any(|seen| seen.name.to_lowercase() == key) {
                found.push(span);
            }
        };

        for quote in text.quotes() {
            let Some(close) = quote.close else {
                continue;
            };
            let name = text.slice(quote.open + 1, close);
            if name.is_empty() {
                continue;
            }
            push(VariableSpan {
                len: close - quote.open - 1,
                name,
                start: quote.open + 1,
            });
        }

        for word in text.words() {
            if word.is_numeric() || looks_like_number(&word.text) || is_reserved(&word.text) {
                continue;
            }
            push(VariableSpan {
                len: word.end - word.start,
                name: word.text,
                start: word.start,
            });
        }

        debug!("Extracted variables: {:?}", found);
        found
    }
}

fn looks_like_number(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_digit()) && word.parse::<f64>().is_ok()
}
