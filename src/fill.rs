//! Mapping a JSON object's entries onto a structure's fields.

use log::{Level, trace};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

use crate::coerce::describe;
use crate::convert::severity;
use crate::descriptor::JSON_OBJECT_FIELD;
use crate::{
    ConversionError, Deserializer, Issue, ObjectRef, PathSegment, Slot,
    StructDescriptor, StructKind, StructValue,
};

impl Deserializer<'_> {
    /// Fills `target` from `attributes`.
    ///
    /// Every field is optional: fields without a matching key, or whose value
    /// is `null`, keep their current value. Keys match field names ignoring
    /// case, and the first match in document order wins. A field that fails to
    /// convert is reported and keeps its previous value; the remaining fields
    /// are still read.
    pub fn fill_struct(
        &mut self,
        attributes: &Map<String, Value>,
        descriptor: &StructDescriptor,
        target: &mut StructValue,
    ) {
        trace!(
            "Filling {} from {} entries",
            descriptor.name.blue(),
            attributes.len().yellow()
        );

        if descriptor.kind == StructKind::JsonObject {
            target.set(JSON_OBJECT_FIELD, Slot::Json(attributes.clone()));
            return;
        }

        let provider = self.provider;
        for field in provider.fields(descriptor) {
            if !self.options.reads(field.flags) {
                trace!("Skipping {} (flags {:?})", field.name.yellow(), field.flags);
                continue;
            }

            let Some(value) = attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&field.name))
                .map(|(_, value)| value)
            else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let mut scratch = target.slot_mut(field).clone();
            let result = self.nested(PathSegment::Field(field.name.clone()), |de| {
                de.convert(value, field, &mut scratch)
            });
            match result {
                Ok(()) => *target.slot_mut(field) = scratch,
                Err(err) => {
                    let message = format!(
                        "unable to read {}.{} from {}: {err}",
                        descriptor.name,
                        field.name,
                        describe(value)
                    );
                    self.report_field(&field.name, severity(&err), message);
                }
            }
        }
    }

    /// Fills a class instance from `attributes`, using the instance's runtime
    /// class rather than any declared base.
    ///
    /// Fails only if the instance is already being filled further up the
    /// stack.
    pub fn fill_instance(
        &mut self,
        attributes: &Map<String, Value>,
        instance: &ObjectRef,
    ) -> Result<(), ConversionError> {
        let mut object = instance
            .try_borrow_mut()
            .map_err(|_| ConversionError::InstanceBusy {
                class: instance.class_name().to_string(),
            })?;
        let class = object.class().clone();
        self.fill_struct(attributes, &class, &mut object.values);
        Ok(())
    }

    fn report_field(&mut self, field: &str, level: Level, message: String) {
        let mut path = self.path.clone();
        path.push(PathSegment::Field(field.to_string()));
        self.diagnostics.report(Issue {
            level,
            path,
            message,
        });
    }
}
