#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod error;
pub use error::*;

mod span;
pub use span::*;

mod path;
pub use path::*;

mod diagnostics;
pub use diagnostics::*;

mod descriptor;
pub use descriptor::{
    EnumDescriptor, FieldDescriptor, FieldFlags, FieldKind, JSON_OBJECT_FIELD, NumericKind,
    StructDescriptor, StructKind, TextImportFn,
};

mod slot;
pub use slot::*;

mod provider;
pub use provider::*;

mod registry;
pub use registry::*;

mod options;
pub use options::*;

pub mod coerce;
pub mod color;
pub mod datetime;
pub mod text_import;

mod convert;
pub use convert::Deserializer;

mod fill;
mod object;

mod parser;
pub use parser::*;

/// Key of the entry naming the concrete class of an inline object.
pub const TYPE_TAG_KEY: &str = "__type__";
