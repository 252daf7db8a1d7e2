use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range of a node in the normalized source.
#[derive(Debug, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct Span {
    pub range: Range<usize>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { range: start..end }
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(value: pest::Span) -> Self {
        Self {
            range: value.start()..value.end(),
        }
    }
}
