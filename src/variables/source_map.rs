/// One replaced span: `original_len` characters at `original_start` became
/// `substituted_len` characters at `substituted_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    original_start: usize,
    original_len: usize,
    substituted_start: usize,
    substituted_len: usize,
}

/// Maps character indices in a substituted expression back to the text the
/// caller typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    edits: Vec<Edit>,
}

impl SourceMap {
    pub fn identity() -> Self {
        Self::default()
    }

    /// Records a replacement. Edits must be recorded left to right.
    pub fn record(
        &mut self,
        original_start: usize,
        original_len: usize,
        substituted_start: usize,
        substituted_len: usize,
    ) {
        self.edits.push(Edit {
            original_start,
            original_len,
            substituted_start,
            substituted_len,
        });
    }

    /// An index inside a replaced span maps to the start of what it replaced.
    pub fn to_original(&self, index: usize) -> usize {
        let mut shift: isize = 0;
        for edit in &self.edits {
            if index < edit.substituted_start {
                break;
            }
            if index < edit.substituted_start + edit.substituted_len {
                return edit.original_start;
            }
            shift = (edit.original_start + edit.original_len) as isize
                - (edit.substituted_start + edit.substituted_len) as isize;
        }
        (index as isize + shift).max(0) as usize
    }

    pub fn is_identity(&self) -> bool {
        self.edits.is_empty()
    }
}
