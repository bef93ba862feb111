//! In-memory storage that the reader writes into.
//!
//! A [`Slot`] holds one field's value. Structures are [`StructValue`]s, and
//! class instances are [`Object`]s shared through [`ObjectRef`] handles so the
//! same instance can be referenced from several places.

use alloc::rc::{Rc, Weak};
use alloc::sync::Arc;
use core::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use core::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::descriptor::{FieldDescriptor, StructDescriptor};

/// Localized text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    /// The display string.
    pub value: String,
    /// Culture the string was picked for; `None` for culture-invariant text.
    pub culture: Option<String>,
}

impl Text {
    /// Culture-invariant text.
    pub fn invariant(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            culture: None,
        }
    }
}

/// The value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Nothing stored yet; the default for opaque kinds.
    Empty,
    /// A `bool`.
    Bool(bool),
    /// A plain string.
    String(String),
    /// Localized text.
    Text(Text),
    /// A signed integer, already narrowed to the field's width.
    Int(i64),
    /// An unsigned integer, already narrowed to the field's width.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// Elements of a growable array.
    Array(Vec<Slot>),
    /// The contiguous slots of a fixed-size native array.
    Fixed(Vec<Slot>),
    /// Elements of a set, unique after [`Slot::rehash`].
    Set(Vec<Slot>),
    /// Entries of a map, with unique keys after [`Slot::rehash`].
    Map(Vec<(Slot, Slot)>),
    /// A structure stored inline.
    Struct(StructValue),
    /// A reference to a class instance, or none.
    Object(Option<ObjectRef>),
    /// A raw JSON object.
    Json(Map<String, Value>),
}

impl Slot {
    /// The `bool`, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Slot::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Slot::String(value) => Some(value),
            _ => None,
        }
    }

    /// The text, if this is localized text.
    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Slot::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The value as `i64`, if this is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Slot::Int(value) => Some(*value),
            Slot::UInt(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// The value as `u64`, if this is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Slot::Int(value) => u64::try_from(*value).ok(),
            Slot::UInt(value) => Some(*value),
            _ => None,
        }
    }

    /// The value as `f64`, if this is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Slot::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Elements of an array, fixed-size array or set.
    pub fn as_elements(&self) -> Option<&[Slot]> {
        match self {
            Slot::Array(items) | Slot::Fixed(items) | Slot::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map.
    pub fn as_entries(&self) -> Option<&[(Slot, Slot)]> {
        match self {
            Slot::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// The structure, if this is one.
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Slot::Struct(value) => Some(value),
            _ => None,
        }
    }

    /// The referenced instance, if this is a non-empty object reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Slot::Object(object) => object.as_ref(),
            _ => None,
        }
    }

    /// Restores the lookup invariants of a set or map after bulk insertion.
    ///
    /// Sets keep the first of equal elements. Maps keep the position of the
    /// first occurrence of a key and the value of the last.
    pub fn rehash(&mut self) {
        match self {
            Slot::Set(items) => {
                let mut unique: Vec<Slot> = Vec::with_capacity(items.len());
                for item in items.drain(..) {
                    if !unique.contains(&item) {
                        unique.push(item);
                    }
                }
                *items = unique;
            }
            Slot::Map(entries) => {
                let mut unique: Vec<(Slot, Slot)> = Vec::with_capacity(entries.len());
                for (key, value) in entries.drain(..) {
                    match unique.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(entry) => entry.1 = value,
                        None => unique.push((key, value)),
                    }
                }
                *entries = unique;
            }
            _ => {}
        }
    }
}

/// The field values of one structure.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    type_name: String,
    fields: IndexMap<String, Slot>,
}

impl StructValue {
    /// A structure with every field at its default.
    pub fn new(descriptor: &StructDescriptor) -> Self {
        let fields = descriptor
            .all_fields()
            .into_iter()
            .map(|field| (field.name.clone(), field.default_slot()))
            .collect();
        Self {
            type_name: descriptor.name.clone(),
            fields,
        }
    }

    /// Name of the structure's type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The value of the field called exactly `name`.
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.fields.get(name)
    }

    /// Mutable access to the field called exactly `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Slot> {
        self.fields.get_mut(name)
    }

    /// Overwrites a field, adding it if the structure lacked it.
    pub fn set(&mut self, name: impl Into<String>, value: Slot) {
        self.fields.insert(name.into(), value);
    }

    /// The slot for `field`, allocated with its default if missing.
    pub fn slot_mut(&mut self, field: &FieldDescriptor) -> &mut Slot {
        self.fields
            .entry(field.name.clone())
            .or_insert_with(|| field.default_slot())
    }

    /// Field names and values in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.fields.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}

/// A class instance.
pub struct Object {
    class: Arc<StructDescriptor>,
    name: Option<String>,
    outer: Option<Weak<ObjectCell>>,
    /// Field values of the instance.
    pub values: StructValue,
}

impl Object {
    /// A new instance of `class` with every field at its default.
    pub fn new(class: Arc<StructDescriptor>, outer: Option<&ObjectRef>) -> Self {
        Self {
            values: StructValue::new(&class),
            class,
            name: None,
            outer: outer.map(|outer| Rc::downgrade(&outer.0)),
        }
    }

    /// Gives the instance a name other documents can refer to it by.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The runtime class.
    pub fn class(&self) -> &Arc<StructDescriptor> {
        &self.class
    }

    /// The instance's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The instance this one was created inside, if it is still alive.
    pub fn outer(&self) -> Option<ObjectRef> {
        self.outer.as_ref()?.upgrade().map(ObjectRef)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class.name)
            .field("name", &self.name)
            .field("values", &self.values)
            .finish()
    }
}

struct ObjectCell {
    class: Arc<StructDescriptor>,
    object: RefCell<Object>,
}

/// A shared handle to an [`Object`].
///
/// Handles compare equal when they point at the same instance.
#[derive(Clone)]
pub struct ObjectRef(Rc<ObjectCell>);

impl ObjectRef {
    /// Wraps a new instance.
    pub fn new(object: Object) -> Self {
        Self(Rc::new(ObjectCell {
            class: object.class.clone(),
            object: RefCell::new(object),
        }))
    }

    /// Borrows the instance.
    ///
    /// # Panics
    ///
    /// Panics if the instance is currently being filled.
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.0.object.borrow()
    }

    /// Borrows the instance, failing if it is currently being filled.
    pub fn try_borrow(&self) -> Result<Ref<'_, Object>, BorrowError> {
        self.0.object.try_borrow()
    }

    /// Mutably borrows the instance, failing if it is borrowed elsewhere.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, Object>, BorrowMutError> {
        self.0.object.try_borrow_mut()
    }

    /// The runtime class, readable even while the instance is being filled.
    pub fn class(&self) -> &Arc<StructDescriptor> {
        &self.0.class
    }

    /// Name of the runtime class.
    pub fn class_name(&self) -> &str {
        &self.0.class.name
    }

    /// Whether both handles point at the same instance.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({} @ {:p})", self.0.class.name, Rc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rehash_keeps_first_of_equal_elements() {
        let mut set = Slot::Set(vec![
            Slot::String("a".into()),
            Slot::String("b".into()),
            Slot::String("a".into()),
        ]);
        set.rehash();
        assert_eq!(
            set,
            Slot::Set(vec![Slot::String("a".into()), Slot::String("b".into())])
        );
    }

    #[test]
    fn map_rehash_keeps_last_value_for_a_key() {
        let mut map = Slot::Map(vec![
            (Slot::Int(1), Slot::String("one".into())),
            (Slot::Int(2), Slot::String("two".into())),
            (Slot::Int(1), Slot::String("uno".into())),
        ]);
        map.rehash();
        assert_eq!(
            map,
            Slot::Map(vec![
                (Slot::Int(1), Slot::String("uno".into())),
                (Slot::Int(2), Slot::String("two".into())),
            ])
        );
    }
}
