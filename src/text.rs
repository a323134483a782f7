//! Character-level view of an expression shared by the validators, the
//! variable extractor and the substitutor. All indices are 0-based
//! character offsets, never byte offsets.

use crate::functions::{self, Brackets};

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub(crate) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// A pair of double quotes. `close` is `None` for an unterminated quote,
/// which then runs to the end of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuoteSpan {
    pub open: usize,
    pub close: Option<usize>,
}

/// A maximal run of word characters outside quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Word {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Word {
    pub fn is_numeric(&self) -> bool {
        self.text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn starts_like_identifier(&self) -> bool {
        self.text.chars().next().is_some_and(is_identifier_start)
    }
}

/// An identifier immediately (modulo whitespace) followed by an opening bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub name: String,
    pub name_start: usize,
    pub open: usize,
    pub brackets: Brackets,
    pub close: Option<usize>,
}

/// One top-level argument of a call, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Argument {
    pub start: usize,
    pub text: String,
}

/// What an argument looks like before any values are known.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ArgumentShape {
    Number(f64),
    VectorLiteral(Vec<f64>),
    /// A bare or quoted variable name, without its quotes.
    Reference(String),
    Expression,
}

impl Argument {
    pub fn shape(&self) -> ArgumentShape {
        let text = self.text.as_str();
        if let Some(n) = number_literal(text) {
            return ArgumentShape::Number(n);
        }
        if let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let items: Option<Vec<f64>> = inner.split(',').map(number_literal).collect();
            if let Some(items) = items {
                return ArgumentShape::VectorLiteral(items);
            }
        }
        if let Some(name) = text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            if !name.is_empty() && !name.contains('"') {
                return ArgumentShape::Reference(name.to_string());
            }
        }
        let bare = !text.is_empty()
            && text.chars().all(is_word_char)
            && !text.chars().all(|c| c.is_ascii_digit())
            && !functions::is_reserved(text);
        if bare {
            ArgumentShape::Reference(text.to_string())
        } else {
            ArgumentShape::Expression
        }
    }
}

/// Parses `12`, `-1.5` or `(-3)`. Exponents and other float spellings are not numbers here.
pub(crate) fn number_literal(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .map_or(text, str::trim);
    let digits = text.strip_prefix('-').map_or(text, str::trim_start);
    let mut parts = digits.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let valid = !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && parts.next().map_or(true, |fraction| {
            !fraction.is_empty() && fraction.chars().all(|c| c.is_ascii_digit())
        });
    if !valid {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    Some(if text.starts_with('-') { -value } else { value })
}

pub(crate) struct SourceText {
    chars: Vec<char>,
    quoted: Vec<bool>,
    quotes: Vec<QuoteSpan>,
}

impl SourceText {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let mut quoted = vec![false; chars.len()];
        let mut quotes = Vec::new();
        let mut open: Option<usize> = None;

        for (i, &c) in chars.iter().enumerate() {
            if c == '"' {
                match open.take() {
                    Some(start) => quotes.push(QuoteSpan {
                        open: start,
                        close: Some(i),
                    }),
                    None => open = Some(i),
                }
                quoted[i] = true;
            } else if open.is_some() {
                quoted[i] = true;
            }
        }
        if let Some(start) = open {
            quotes.push(QuoteSpan {
                open: start,
                close: None,
            });
        }

        Self {
            chars,
            quoted,
            quotes,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// True for quote marks and everything between a pair of them.
    pub fn is_quoted(&self, index: usize) -> bool {
        self.quoted.get(index).copied().unwrap_or(false)
    }

    pub fn quotes(&self) -> &[QuoteSpan] {
        &self.quotes
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    pub fn prev_non_space(&self, index: usize) -> Option<(usize, char)> {
        (0..index.min(self.chars.len()))
            .rev()
            .map(|i| (i, self.chars[i]))
            .find(|(_, c)| !c.is_whitespace())
    }

    pub fn next_non_space(&self, index: usize) -> Option<(usize, char)> {
        (index + 1..self.chars.len())
            .map(|i| (i, self.chars[i]))
            .find(|(_, c)| !c.is_whitespace())
    }

    /// Bracket depth in effect at each index, counting unquoted brackets only.
    /// An opening bracket sits at the depth outside it.
    pub fn depths(&self) -> Vec<usize> {
        let mut depth: usize = 0;
        let mut depths = Vec::with_capacity(self.chars.len());
        for (i, &c) in self.chars.iter().enumerate() {
            if self.is_quoted(i) {
                depths.push(depth);
                continue;
            }
            match c {
                '(' | '[' => {
                    depths.push(depth);
                    depth += 1;
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    depths.push(depth);
                }
                _ => depths.push(depth),
            }
        }
        depths
    }

    pub fn words(&self) -> Vec<Word> {
        let mut words = Vec::new();
        let mut i = 0;
        while i < self.chars.len() {
            if self.is_quoted(i) || !is_word_char(self.chars[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < self.chars.len() && !self.is_quoted(i) && is_word_char(self.chars[i]) {
                i += 1;
            }
            words.push(Word {
                start,
                end: i,
                text: self.slice(start, i),
            });
        }
        words
    }

    /// Index of the bracket closing the one at `open`, if the text between is balanced.
    pub fn matching_close(&self, open: usize) -> Option<usize> {
        let mut stack = Vec::new();
        for i in open..self.chars.len() {
            if self.is_quoted(i) {
                continue;
            }
            match self.chars[i] {
                c @ ('(' | '[') => stack.push(c),
                c @ (')' | ']') => {
                    let expected = if c == ')' { '(' } else { '[' };
                    if stack.pop() != Some(expected) {
                        return None;
                    }
                    if stack.is_empty() {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        None
    }

    pub fn calls(&self) -> Vec<Call> {
        self.words()
            .into_iter()
            .filter(|word| word.starts_like_identifier())
            .filter_map(|word| {
                let (open, c) = self.next_non_space(word.end - 1)?;
                let brackets = Brackets::from_open(c)?;
                Some(Call {
                    name: word.text,
                    name_start: word.start,
                    open,
                    brackets,
                    close: self.matching_close(open),
                })
            })
            .collect()
    }

    /// Splits the text between a call's brackets on its top-level commas.
    pub fn arguments(&self, call: &Call) -> Vec<Argument> {
        let Some(close) = call.close else {
            return Vec::new();
        };
        if self.slice(call.open + 1, close).trim().is_empty() {
            return Vec::new();
        }

        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut start = call.open + 1;
        for i in call.open + 1..close {
            if self.is_quoted(i) {
                continue;
            }
            match self.chars[i] {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    arguments.push(self.trimmed_argument(start, i));
                    start = i + 1;
                }
                _ => {}
            }
        }
        arguments.push(self.trimmed_argument(start, close));
        arguments
    }

    fn trimmed_argument(&self, start: usize, end: usize) -> Argument {
        let raw = self.slice(start, end);
        let leading = raw.chars().take_while(|c| c.is_whitespace()).count();
        Argument {
            start: start + leading,
            text: raw.trim().to_string(),
        }
    }
}
