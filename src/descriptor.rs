//! Type metadata describing the structures that JSON is read into.
//!
//! Descriptors are plain data, shared through [`Arc`] and never mutated while
//! a document is being read.

use alloc::sync::Arc;

use crate::{Slot, StructValue};

bitflags::bitflags! {
    /// Per-field metadata flags.
    ///
    /// The reader only consults them when
    /// [`ParserOptions::check_flags`](crate::ParserOptions::check_flags) is
    /// non-empty: a field is read only if it carries at least one of the
    /// checked flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u32 {
        /// Editable by content authors.
        const EDITABLE = 1 << 0;
        /// Loaded from configuration.
        const CONFIG = 1 << 1;
        /// Persisted with saved games.
        const SAVE_GAME = 1 << 2;
        /// Never persisted.
        const TRANSIENT = 1 << 3;
    }
}

/// Native representation of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl NumericKind {
    /// Whether values are stored as floating point.
    pub fn is_float(self) -> bool {
        matches!(self, NumericKind::F32 | NumericKind::F64)
    }

    /// Whether values are stored unsigned.
    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            NumericKind::U8 | NumericKind::U16 | NumericKind::U32 | NumericKind::U64
        )
    }

    /// Stores an integer the way a native store of this width would,
    /// keeping only the low bits.
    pub fn store_int(self, value: i64) -> Slot {
        match self {
            NumericKind::I8 => Slot::Int(value as i8 as i64),
            NumericKind::I16 => Slot::Int(value as i16 as i64),
            NumericKind::I32 => Slot::Int(value as i32 as i64),
            NumericKind::I64 => Slot::Int(value),
            NumericKind::U8 => Slot::UInt(value as u8 as u64),
            NumericKind::U16 => Slot::UInt(value as u16 as u64),
            NumericKind::U32 => Slot::UInt(value as u32 as u64),
            NumericKind::U64 => Slot::UInt(value as u64),
            NumericKind::F32 => Slot::Float(value as f32 as f64),
            NumericKind::F64 => Slot::Float(value as f64),
        }
    }

    /// Stores a floating point value; integer kinds truncate toward zero,
    /// saturating at the 64-bit bounds.
    pub fn store_float(self, value: f64) -> Slot {
        match self {
            NumericKind::F32 => Slot::Float(value as f32 as f64),
            NumericKind::F64 => Slot::Float(value),
            _ => self.store_int(value as i64),
        }
    }

    /// The zero value.
    pub fn default_slot(self) -> Slot {
        self.store_int(0)
    }
}

/// What a field holds, together with the metadata needed to read it.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// A plain string.
    String,
    /// Localized text.
    Text,
    /// A number, optionally tagged with the enum whose members it holds.
    Numeric {
        /// Native representation.
        repr: NumericKind,
        /// Enum whose member names are accepted as strings.
        enum_name: Option<String>,
    },
    /// An enum stored as its underlying integer.
    Enum {
        /// Name of the enum type, looked up through the provider.
        enum_name: String,
        /// Underlying integer representation.
        repr: NumericKind,
    },
    /// A growable array.
    Array(Box<FieldDescriptor>),
    /// A set of unique elements.
    Set(Box<FieldDescriptor>),
    /// A map from keys to values.
    Map {
        /// Key type; keys are read from JSON object keys.
        key: Box<FieldDescriptor>,
        /// Value type.
        value: Box<FieldDescriptor>,
    },
    /// A nested structure stored inline.
    Struct(Arc<StructDescriptor>),
    /// A reference to an instance of `class` or one of its subclasses.
    Object {
        /// Declared base class.
        class: String,
    },
    /// A type the reader knows nothing about; its text form is handed to the
    /// provider.
    Opaque {
        /// Name the provider knows the type by.
        type_name: String,
    },
}

impl FieldKind {
    /// A numeric kind.
    pub fn numeric(repr: NumericKind) -> Self {
        FieldKind::Numeric {
            repr,
            enum_name: None,
        }
    }

    /// An enum kind with the given underlying representation.
    pub fn enumeration(enum_name: impl Into<String>, repr: NumericKind) -> Self {
        FieldKind::Enum {
            enum_name: enum_name.into(),
            repr,
        }
    }

    /// An array of `inner`.
    pub fn array(inner: FieldKind) -> Self {
        FieldKind::Array(Box::new(FieldDescriptor::new("Inner", inner)))
    }

    /// A set of `inner`.
    pub fn set(inner: FieldKind) -> Self {
        FieldKind::Set(Box::new(FieldDescriptor::new("Element", inner)))
    }

    /// A map from `key` to `value`.
    pub fn map(key: FieldKind, value: FieldKind) -> Self {
        FieldKind::Map {
            key: Box::new(FieldDescriptor::new("Key", key)),
            value: Box::new(FieldDescriptor::new("Value", value)),
        }
    }

    /// An object reference whose declared base is `class`.
    pub fn object(class: impl Into<String>) -> Self {
        FieldKind::Object {
            class: class.into(),
        }
    }

    /// The value a freshly allocated slot of this kind holds.
    pub fn default_slot(&self) -> Slot {
        match self {
            FieldKind::Bool => Slot::Bool(false),
            FieldKind::String => Slot::String(String::new()),
            FieldKind::Text => Slot::Text(Default::default()),
            FieldKind::Numeric { repr, .. } | FieldKind::Enum { repr, .. } => repr.default_slot(),
            FieldKind::Array(_) => Slot::Array(Vec::new()),
            FieldKind::Set(_) => Slot::Set(Vec::new()),
            FieldKind::Map { .. } => Slot::Map(Vec::new()),
            FieldKind::Struct(descriptor) => Slot::Struct(StructValue::new(descriptor)),
            FieldKind::Object { .. } => Slot::Object(None),
            FieldKind::Opaque { .. } => Slot::Empty,
        }
    }

    /// Short name of the kind, for trace output.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::Numeric { .. } => "numeric",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Array(_) => "array",
            FieldKind::Set(_) => "set",
            FieldKind::Map { .. } => "map",
            FieldKind::Struct(_) => "struct",
            FieldKind::Object { .. } => "object",
            FieldKind::Opaque { .. } => "opaque",
        }
    }
}

/// One member of a structure.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Declared name, matched case-insensitively against JSON keys.
    pub name: String,
    /// What the field holds.
    pub kind: FieldKind,
    /// Metadata flags.
    pub flags: FieldFlags,
    /// Number of contiguous native slots; 1 for an ordinary field.
    pub array_dim: usize,
}

impl FieldDescriptor {
    /// An ordinary field with no flags.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            flags: FieldFlags::empty(),
            array_dim: 1,
        }
    }

    /// Replaces the field's flags.
    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Makes this a fixed-size native array of `dim` slots.
    pub fn with_array_dim(mut self, dim: usize) -> Self {
        self.array_dim = dim.max(1);
        self
    }

    /// The value a freshly allocated field holds.
    pub fn default_slot(&self) -> Slot {
        if self.array_dim > 1 {
            Slot::Fixed(vec![self.kind.default_slot(); self.array_dim])
        } else {
            self.kind.default_slot()
        }
    }
}

/// Structures that get special treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    /// An ordinary value structure.
    Plain,
    /// A class: instances live behind [`ObjectRef`](crate::ObjectRef)s and
    /// are read using their runtime class.
    Class,
    /// 8-bit RGBA color, also readable from a hex string.
    Color,
    /// Linear floating point RGBA color, also readable from a hex string.
    LinearColor,
    /// Date and time as ticks, also readable from a date string.
    DateTime,
    /// Holds the raw JSON object it was given.
    JsonObject,
}

/// Imports a structure from its text form; returns `false` to fall back to
/// the generic `(Name=Value,...)` importer.
pub type TextImportFn = fn(&str, &mut StructValue) -> bool;

/// The layout of a structure or class.
#[derive(Debug, Clone)]
pub struct StructDescriptor {
    /// Type name.
    pub name: String,
    /// Special handling, if any.
    pub kind: StructKind,
    /// Parent class whose fields come first.
    pub super_class: Option<Arc<StructDescriptor>>,
    /// Fields declared on this type, in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Custom text importer.
    pub import_text: Option<TextImportFn>,
}

impl StructDescriptor {
    /// An empty plain structure.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: StructKind::Plain,
            super_class: None,
            fields: Vec::new(),
            import_text: None,
        }
    }

    /// An empty class.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            kind: StructKind::Class,
            ..Self::new(name)
        }
    }

    /// Derives this class from `parent`.
    pub fn with_super(mut self, parent: Arc<StructDescriptor>) -> Self {
        self.super_class = Some(parent);
        self
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Installs a custom text importer.
    pub fn with_import_text(mut self, import: TextImportFn) -> Self {
        self.import_text = Some(import);
        self
    }

    /// `Color { R, G, B, A: u8 }`
    pub fn color() -> Self {
        Self::channels("Color", StructKind::Color, NumericKind::U8)
    }

    /// `LinearColor { R, G, B, A: f32 }`
    pub fn linear_color() -> Self {
        Self::channels("LinearColor", StructKind::LinearColor, NumericKind::F32)
    }

    fn channels(name: &str, kind: StructKind, repr: NumericKind) -> Self {
        let mut descriptor = Self {
            kind,
            ..Self::new(name)
        };
        for channel in ["R", "G", "B", "A"] {
            descriptor = descriptor.with_field(FieldDescriptor::new(channel, FieldKind::numeric(repr)));
        }
        descriptor
    }

    /// `DateTime { Ticks: i64 }`, see [`crate::datetime`].
    pub fn date_time() -> Self {
        Self {
            kind: StructKind::DateTime,
            ..Self::new("DateTime")
        }
        .with_field(FieldDescriptor::new("Ticks", FieldKind::numeric(NumericKind::I64)))
    }

    /// `JsonObjectWrapper { JsonObject }`
    pub fn json_object() -> Self {
        Self {
            kind: StructKind::JsonObject,
            ..Self::new("JsonObjectWrapper")
        }
        .with_field(FieldDescriptor::new(
            JSON_OBJECT_FIELD,
            FieldKind::Opaque {
                type_name: "JsonObject".into(),
            },
        ))
    }

    /// Every field including inherited ones, parents first.
    pub fn all_fields(&self) -> Vec<&FieldDescriptor> {
        let mut fields = match &self.super_class {
            Some(parent) => parent.all_fields(),
            None => Vec::new(),
        };
        fields.extend(self.fields.iter());
        fields
    }

    /// Whether this type is `base` or inherits from it.
    pub fn is_child_of(&self, base: &str) -> bool {
        self.name == base
            || self
                .super_class
                .as_ref()
                .is_some_and(|parent| parent.is_child_of(base))
    }
}

/// Field of [`StructKind::JsonObject`] structures holding the raw object.
pub const JSON_OBJECT_FIELD: &str = "JsonObject";

/// Members of an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// Type name.
    pub name: String,
    /// Member names and their values, in declaration order.
    pub members: Vec<(String, i64)>,
}

impl EnumDescriptor {
    /// An enum with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Appends a member.
    pub fn with_member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push((name.into(), value));
        self
    }

    /// Value of the member called exactly `name`.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| *value)
    }

    /// Whether some member has `value`.
    pub fn contains_value(&self, value: i64) -> bool {
        self.members.iter().any(|(_, member)| *member == value)
    }
}
