//! Resolving polymorphic object references.

use log::{debug, trace};
use owo_colors::OwoColorize;
use serde_json::Value;

use crate::convert::mismatch;
use crate::{ConversionError, Deserializer, JsonType, Slot, TYPE_TAG_KEY};

impl Deserializer<'_> {
    /// Reads an object reference whose declared base class is `base`.
    ///
    /// A string names an existing instance; a name that resolves to nothing
    /// stores an empty reference. An object must carry a `__type__` tag. If
    /// the slot is empty, the tag picks the class of a newly constructed
    /// instance; otherwise the instance already in the slot is updated in
    /// place and keeps its runtime class.
    pub(crate) fn convert_object(
        &mut self,
        value: &Value,
        base: &str,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        match value {
            Value::String(name) => {
                let found = self
                    .provider
                    .find_instance(name, self.options.outer.as_ref());
                if found.is_none() {
                    debug!("No instance named {} for {}", name.yellow(), self.path);
                }
                *slot = Slot::Object(found);
                Ok(())
            }
            Value::Object(attributes) => {
                let tag = attributes
                    .get(TYPE_TAG_KEY)
                    .ok_or(ConversionError::MissingTypeTag)?;
                let Value::String(type_name) = tag else {
                    return Err(ConversionError::TypeMismatch {
                        expected: "string type tag",
                        found: JsonType::of(tag),
                    });
                };

                let instance = match slot.as_object() {
                    Some(existing) => {
                        trace!(
                            "Updating existing {} in place",
                            existing.class_name().green()
                        );
                        existing.clone()
                    }
                    None => {
                        let class = self.provider.resolve_subtype(base, type_name).ok_or_else(
                            || ConversionError::UnknownSubtype {
                                base: base.to_string(),
                                name: type_name.clone(),
                            },
                        )?;
                        let instance = self
                            .provider
                            .construct(&class, self.options.outer.as_ref());
                        *slot = Slot::Object(Some(instance.clone()));
                        instance
                    }
                };

                self.fill_instance(attributes, &instance)
            }
            other => Err(mismatch("a string or an object", other)),
        }
    }
}
