//! Locations within the document being read.

use core::fmt::{self, Display};

/// A single step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A struct field, by the name declared on the descriptor.
    Field(String),
    /// A position in an array, set or fixed-size array.
    Index(usize),
    /// A map entry, by its JSON key.
    Key(String),
}

/// The route from the top-level object to the value being converted.
///
/// Rendered as `speakers[2].name` or `lines["intro"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path, pointing at the top-level object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Removes the last segment.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the top-level path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if index == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(at) => write!(f, "[{at}]")?,
                PathSegment::Key(key) => write!(f, "[{key:?}]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_fields_indices_and_keys() {
        let path: Path = [
            PathSegment::Field("speakers".into()),
            PathSegment::Index(2),
            PathSegment::Field("lines".into()),
            PathSegment::Key("intro".into()),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), r#"speakers[2].lines["intro"]"#);
    }

    #[test]
    fn root_path_has_a_placeholder() {
        assert_eq!(Path::new().to_string(), "<root>");
    }
}
