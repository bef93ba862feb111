//! Byte spans within the source document, for error reporting.

use miette::SourceSpan;

/// Source span with offset and length.
///
/// This type tracks a byte offset and length within a source document,
/// useful for error reporting that can point back to the original source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Byte offset from start of source.
    pub offset: usize,
    /// Length in bytes.
    pub len: usize,
}

impl Span {
    /// Create a new span with the given offset and length.
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Check if this span is unknown (zero offset and length).
    pub fn is_unknown(&self) -> bool {
        self.offset == 0 && self.len == 0
    }

    /// Get the end offset (offset + len).
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Locates a one-character span from a 1-based line and byte column, as
    /// reported by `serde_json`.
    ///
    /// Column 0 means "before the first character of the line". Positions
    /// past the end of the source are clamped to the last character, and
    /// positions inside a character move back to its start.
    pub fn at_line_column(source: &str, line: usize, column: usize) -> Self {
        let mut offset = 0;
        for (index, text) in source.split_inclusive('\n').enumerate() {
            if index + 1 == line {
                offset += column.saturating_sub(1).min(text.len());
                break;
            }
            offset += text.len();
        }

        let mut offset = offset.min(source.len().saturating_sub(1));
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let len = source[offset..].chars().next().map_or(0, char::len_utf8);
        Self { offset, len }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.offset.into(), span.len)
    }
}

impl From<SourceSpan> for Span {
    fn from(span: SourceSpan) -> Self {
        Self {
            offset: span.offset(),
            len: span.len(),
        }
    }
}
