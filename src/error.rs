//! Error types for reading JSON into reflected structures.
//!
//! Two severities exist. [`ConversionError`] is field-local: the structure
//! filler reports it and moves on to the next field. [`DeserError`] aborts a
//! whole pass (unreadable file, unparsable text, unusable top-level value).

use core::fmt::{self, Display};
use std::path::PathBuf;

use miette::{Diagnostic, LabeledSpan, SourceCode};
use serde_json::Value;

use crate::Span;

/// The type of a JSON value, used when reporting mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// Any JSON number.
    Number,
    /// A JSON string.
    String,
    /// A JSON array.
    Array,
    /// A JSON object.
    Object,
}

impl JsonType {
    /// Returns the type of `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonType::Null,
            Value::Bool(_) => JsonType::Bool,
            Value::Number(_) => JsonType::Number,
            Value::String(_) => JsonType::String,
            Value::Array(_) => JsonType::Array,
            Value::Object(_) => JsonType::Object,
        }
    }
}

impl Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::Null => "null",
            JsonType::Bool => "bool",
            JsonType::Number => "number",
            JsonType::String => "string",
            JsonType::Array => "array",
            JsonType::Object => "object",
        };
        f.write_str(name)
    }
}

/// Identifies the element of a container that failed to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Position in an array, set or fixed-size array.
    Index(usize),
    /// Key of a map entry.
    Key(String),
}

impl Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Index(index) => write!(f, "element [{index}]"),
            Element::Key(key) => write!(f, "entry [key: {key}]"),
        }
    }
}

/// A field-local conversion failure.
///
/// The field that produced it keeps the value it had before the conversion
/// started.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// A string named no member of the enum.
    UnknownEnumValue {
        /// Name of the enum type.
        enum_name: String,
        /// The string that was looked up.
        value: String,
    },

    /// A localized text object had no key for any candidate culture.
    NoMatchingLocale {
        /// The culture codes that were tried, most specific first.
        tried: Vec<String>,
    },

    /// One element of a container failed, so the whole container was abandoned.
    ElementConversionFailed {
        /// The element that failed.
        element: Element,
        /// Why it failed.
        source: Box<ConversionError>,
    },

    /// A date/time string matched no accepted format.
    InvalidDateTime {
        /// The offending text.
        text: String,
    },

    /// A struct field was given something other than an object or a string.
    InvalidStructValue {
        /// Name of the struct type.
        struct_name: String,
        /// What was found instead.
        found: JsonType,
    },

    /// Text could not be imported into a struct.
    TextImportFailed {
        /// Name of the struct type.
        struct_name: String,
        /// Why the text was rejected.
        reason: String,
    },

    /// The host rejected the text form of a value for an opaque kind.
    UnsupportedPropertyKind {
        /// Name of the opaque type.
        type_name: String,
        /// The text that was offered.
        text: String,
    },

    /// An inline object for a polymorphic field has no `__type__` key.
    MissingTypeTag,

    /// The `__type__` tag named no class deriving from the declared base.
    UnknownSubtype {
        /// The field's declared base class.
        base: String,
        /// The name found in the document.
        name: String,
    },

    /// The JSON value has the wrong shape for the field kind.
    TypeMismatch {
        /// What the field kind accepts.
        expected: &'static str,
        /// What was found.
        found: JsonType,
    },

    /// The configured nesting limit was reached.
    TooDeeplyNested {
        /// Depth at which reading stopped.
        depth: usize,
    },

    /// The instance is already being filled further up the stack.
    InstanceBusy {
        /// Class of the instance.
        class: String,
    },
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::UnknownEnumValue { enum_name, value } => {
                write!(f, "enum {enum_name} has no member named `{value}`")
            }
            ConversionError::NoMatchingLocale { tried } => {
                write!(f, "localized text has no entry for any of [{}]", tried.join(", "))
            }
            ConversionError::ElementConversionFailed { element, source } => {
                write!(f, "unable to read {element}: {source}")
            }
            ConversionError::InvalidDateTime { text } => {
                write!(f, "`{text}` is not a recognized date/time")
            }
            ConversionError::InvalidStructValue { struct_name, found } => {
                write!(f, "cannot read struct {struct_name} from a JSON {found}")
            }
            ConversionError::TextImportFailed {
                struct_name,
                reason,
            } => write!(f, "cannot import struct {struct_name} from text: {reason}"),
            ConversionError::UnsupportedPropertyKind { type_name, text } => {
                write!(f, "type {type_name} cannot be imported from `{text}`")
            }
            ConversionError::MissingTypeTag => {
                write!(f, "object has no `{}` key", crate::TYPE_TAG_KEY)
            }
            ConversionError::UnknownSubtype { base, name } => {
                write!(f, "no class named `{name}` derives from {base}")
            }
            ConversionError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ConversionError::TooDeeplyNested { depth } => {
                write!(f, "nesting depth {depth} exceeds the configured maximum")
            }
            ConversionError::InstanceBusy { class } => {
                write!(f, "instance of {class} is already being filled")
            }
        }
    }
}

impl core::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ConversionError::ElementConversionFailed { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// An error that aborts a whole deserialization pass.
#[derive(Debug)]
pub struct DeserError {
    /// The specific kind of error
    pub(crate) kind: DeserErrorKind,
    /// Source text for diagnostics
    pub(crate) source_code: Option<String>,
    /// Location of the error within the source text
    pub(crate) span: Option<Span>,
}

impl DeserError {
    /// Create a new error with the given kind.
    pub(crate) fn new(kind: DeserErrorKind) -> Self {
        DeserError {
            kind,
            source_code: None,
            span: None,
        }
    }

    /// Attach source text to this error for diagnostics.
    pub(crate) fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source_code = Some(source.into());
        self
    }

    /// Attach a span to this error for diagnostics.
    pub(crate) fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &DeserErrorKind {
        &self.kind
    }

    /// Returns where in the source text the error occurred, if known.
    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

impl Display for DeserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl core::error::Error for DeserError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            DeserErrorKind::FileLoad { source, .. } => Some(source),
            DeserErrorKind::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl Diagnostic for DeserError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        let code = match self.kind {
            DeserErrorKind::FileLoad { .. } => "reflect_json_reader::file_load",
            DeserErrorKind::Parse(_) => "reflect_json_reader::parse",
            DeserErrorKind::NotAnObject { .. } => "reflect_json_reader::not_an_object",
            DeserErrorKind::NotAClass { .. } => "reflect_json_reader::not_a_class",
            DeserErrorKind::InstanceBusy { .. } => "reflect_json_reader::instance_busy",
        };
        Some(Box::new(code))
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source_code
            .as_ref()
            .map(|source| source as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        let label = match &self.kind {
            DeserErrorKind::Parse(_) => "here",
            DeserErrorKind::NotAnObject { .. } => "expected an object",
            _ => return None,
        };
        Some(Box::new(core::iter::once(LabeledSpan::at(span, label))))
    }
}

/// Detailed classification of pass-fatal errors.
#[derive(Debug)]
#[non_exhaustive]
pub enum DeserErrorKind {
    /// The input file could not be read.
    FileLoad {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The text is not valid JSON.
    Parse(serde_json::Error),
    /// The top-level JSON value is not an object.
    NotAnObject {
        /// What was found instead.
        found: JsonType,
    },
    /// An instance was given whose runtime type is not a class.
    NotAClass {
        /// Name of the type.
        type_name: String,
    },
    /// The target instance is already borrowed elsewhere.
    InstanceBusy {
        /// Class of the instance.
        class: String,
    },
}

impl Display for DeserErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserErrorKind::FileLoad { path, source } => {
                write!(f, "failed to load {}: {source}", path.display())
            }
            DeserErrorKind::Parse(err) => write!(f, "unable to parse JSON: {err}"),
            DeserErrorKind::NotAnObject { found } => {
                write!(f, "expected a JSON object at the top level, found {found}")
            }
            DeserErrorKind::NotAClass { type_name } => {
                write!(f, "{type_name} is not a class")
            }
            DeserErrorKind::InstanceBusy { class } => {
                write!(f, "instance of {class} is already borrowed")
            }
        }
    }
}
