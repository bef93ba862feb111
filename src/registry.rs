//! An in-memory [`TypeProvider`].

use alloc::sync::Arc;
use core::cell::RefCell;
use std::collections::HashMap;

use log::trace;
use owo_colors::OwoColorize;

use crate::{EnumDescriptor, Object, ObjectRef, Slot, StructDescriptor, TypeProvider};

/// Imports a value of an opaque type from text.
pub type ImportFn = fn(&str) -> Option<Slot>;

/// Classes, enums, named instances and opaque importers held in memory.
///
/// Instances created through [`TypeProvider::construct`] are remembered and
/// can be listed with [`TypeRegistry::constructed`].
#[derive(Default)]
pub struct TypeRegistry {
    classes: HashMap<String, Arc<StructDescriptor>>,
    enums: HashMap<String, EnumDescriptor>,
    instances: HashMap<String, ObjectRef>,
    importers: HashMap<String, ImportFn>,
    constructed: RefCell<Vec<ObjectRef>>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class, returning the shared descriptor.
    pub fn register_class(&mut self, class: StructDescriptor) -> Arc<StructDescriptor> {
        let class = Arc::new(class);
        self.classes.insert(class.name.clone(), class.clone());
        class
    }

    /// Registers an enum.
    pub fn register_enum(&mut self, descriptor: EnumDescriptor) {
        self.enums.insert(descriptor.name.clone(), descriptor);
    }

    /// Makes `instance` findable by `name`.
    pub fn register_instance(&mut self, name: impl Into<String>, instance: ObjectRef) {
        self.instances.insert(name.into(), instance);
    }

    /// Registers how to import values of the opaque type `type_name`.
    pub fn register_importer(&mut self, type_name: impl Into<String>, import: ImportFn) {
        self.importers.insert(type_name.into(), import);
    }

    /// A registered class by name.
    pub fn class(&self, name: &str) -> Option<&Arc<StructDescriptor>> {
        self.classes.get(name)
    }

    /// Instances constructed so far, oldest first.
    pub fn constructed(&self) -> Vec<ObjectRef> {
        self.constructed.borrow().clone()
    }
}

impl TypeProvider for TypeRegistry {
    fn resolve_subtype(&self, base: &str, name: &str) -> Option<Arc<StructDescriptor>> {
        let class = self.classes.get(name)?;
        if class.is_child_of(base) {
            Some(class.clone())
        } else {
            trace!("Class {} does not derive from {}", name.yellow(), base.blue());
            None
        }
    }

    fn construct(&self, class: &Arc<StructDescriptor>, outer: Option<&ObjectRef>) -> ObjectRef {
        trace!("Constructing a new {}", class.name.green());
        let instance = ObjectRef::new(Object::new(class.clone(), outer));
        self.constructed.borrow_mut().push(instance.clone());
        instance
    }

    fn find_instance(&self, name: &str, outer: Option<&ObjectRef>) -> Option<ObjectRef> {
        let outer_name = outer
            .and_then(|outer| outer.try_borrow().ok()?.name().map(str::to_owned));
        if let Some(outer_name) = outer_name {
            let qualified = format!("{outer_name}.{name}");
            if let Some(instance) = self.instances.get(&qualified) {
                return Some(instance.clone());
            }
        }
        self.instances.get(name).cloned()
    }

    fn enum_value(&self, enum_name: &str, member: &str) -> Option<i64> {
        self.enums.get(enum_name)?.value_of(member)
    }

    fn is_enum_value(&self, enum_name: &str, value: i64) -> bool {
        self.enums
            .get(enum_name)
            .is_some_and(|descriptor| descriptor.contains_value(value))
    }

    fn import_text(&self, type_name: &str, text: &str) -> Option<Slot> {
        let import = self.importers.get(type_name)?;
        import(text)
    }
}
