//! Collaborators the reader consults but does not own.

use alloc::sync::Arc;

use crate::{FieldDescriptor, ObjectRef, Slot, StructDescriptor};

/// The host's type system: class lookup, instance construction and named
/// instances.
///
/// The reader only reads through this trait, except for [`construct`], which
/// may register the new instance with the host.
///
/// [`construct`]: TypeProvider::construct
pub trait TypeProvider {
    /// The fields to read for `descriptor`, in order.
    fn fields<'a>(&self, descriptor: &'a StructDescriptor) -> Vec<&'a FieldDescriptor> {
        descriptor.all_fields()
    }

    /// Resolves `name` to a class that is `base` or derives from it.
    fn resolve_subtype(&self, base: &str, name: &str) -> Option<Arc<StructDescriptor>>;

    /// Creates a new instance of `class` inside `outer`.
    fn construct(&self, class: &Arc<StructDescriptor>, outer: Option<&ObjectRef>) -> ObjectRef;

    /// Finds an existing instance by name, relative to `outer` first.
    fn find_instance(&self, name: &str, outer: Option<&ObjectRef>) -> Option<ObjectRef>;

    /// Value of the member of `enum_name` called exactly `member`.
    fn enum_value(&self, enum_name: &str, member: &str) -> Option<i64>;

    /// Whether `value` is a declared member of `enum_name`.
    fn is_enum_value(&self, enum_name: &str, value: i64) -> bool {
        let _ = (enum_name, value);
        true
    }

    /// Builds a value of an opaque type from its text form.
    fn import_text(&self, type_name: &str, text: &str) -> Option<Slot> {
        let _ = (type_name, text);
        None
    }
}

/// Supplies the cultures to try when reading localized text.
pub trait CultureResolver {
    /// Culture codes, most specific first.
    fn prioritized_cultures(&self) -> Vec<String>;
}

/// A fixed fallback chain of culture codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CultureChain(Vec<String>);

impl CultureChain {
    /// The given codes, in order.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(codes.into_iter().map(Into::into).collect())
    }

    /// `pt-BR` and its parents: `["pt-BR", "pt"]`.
    ///
    /// Both `-` and `_` separate subtags.
    pub fn from_code(code: &str) -> Self {
        let mut codes = Vec::new();
        let mut current = code.trim();
        while !current.is_empty() {
            codes.push(current.to_string());
            current = match current.rfind(['-', '_']) {
                Some(at) => &current[..at],
                None => "",
            };
        }
        Self(codes)
    }

    /// The codes, most specific first.
    pub fn codes(&self) -> &[String] {
        &self.0
    }
}

impl Default for CultureChain {
    fn default() -> Self {
        Self::new(["en"])
    }
}

impl CultureResolver for CultureChain {
    fn prioritized_cultures(&self) -> Vec<String> {
        self.0.clone()
    }
}
