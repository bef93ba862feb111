//! Converting one JSON value into one field slot.

use log::{Level, trace};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

use crate::coerce::{self, IntegerText};
use crate::color::{Color, LinearColor};
use crate::{
    ConversionError, CultureResolver, Diagnostics, Element, FieldDescriptor, FieldKind, Issue,
    JsonType, NumericKind, ParserOptions, Path, PathSegment, Slot, StructDescriptor, StructKind,
    StructValue, Text, TypeProvider, datetime, text_import,
};

/// Walks a JSON value tree alongside the descriptors of the slots it fills.
///
/// A `Deserializer` holds everything one reading pass needs: the host's type
/// system, the culture chain for localized text, the sink for warnings, and
/// the pass options. It also tracks the [`Path`] of the value being read so
/// that every reported issue says where it came from.
pub struct Deserializer<'a> {
    pub(crate) provider: &'a dyn TypeProvider,
    pub(crate) cultures: &'a dyn CultureResolver,
    pub(crate) diagnostics: &'a mut dyn Diagnostics,
    pub(crate) options: &'a ParserOptions,
    pub(crate) path: Path,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer positioned at the top-level object.
    pub fn new(
        provider: &'a dyn TypeProvider,
        cultures: &'a dyn CultureResolver,
        diagnostics: &'a mut dyn Diagnostics,
        options: &'a ParserOptions,
    ) -> Self {
        Self {
            provider,
            cultures,
            diagnostics,
            options,
            path: Path::new(),
        }
    }

    /// Where in the document the deserializer currently is.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Converts `value` into `slot` according to `field`.
    ///
    /// On failure `slot` may hold a partially converted value; callers that
    /// need the previous value must convert into a copy.
    pub fn convert(
        &mut self,
        value: &Value,
        field: &FieldDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        trace!(
            "Converting {} into {} field {}",
            JsonType::of(value).yellow(),
            field.kind.label().blue(),
            field.name.green()
        );

        if field.array_dim > 1 {
            return self.convert_fixed(value, field, slot);
        }
        self.convert_kind(value, &field.kind, slot)
    }

    pub(crate) fn report(&mut self, level: Level, message: impl Into<String>) {
        self.diagnostics.report(Issue {
            level,
            path: self.path.clone(),
            message: message.into(),
        });
    }

    /// Runs `f` one level deeper, with `segment` appended to the path.
    pub(crate) fn nested<T>(
        &mut self,
        segment: PathSegment,
        f: impl FnOnce(&mut Self) -> Result<T, ConversionError>,
    ) -> Result<T, ConversionError> {
        if let Some(max_depth) = self.options.max_depth {
            if self.path.len() >= max_depth {
                return Err(ConversionError::TooDeeplyNested {
                    depth: self.path.len(),
                });
            }
        }

        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    /// Converts one container element, reporting the innermost failure at
    /// `level` and wrapping it so the whole container is abandoned.
    fn element(
        &mut self,
        level: Level,
        element: Element,
        segment: PathSegment,
        f: impl FnOnce(&mut Self) -> Result<(), ConversionError>,
    ) -> Result<(), ConversionError> {
        self.nested(segment, |de| {
            f(de).inspect_err(|err| {
                if !matches!(err, ConversionError::ElementConversionFailed { .. }) {
                    de.report(level, err.to_string());
                }
            })
        })
        .map_err(|source| ConversionError::ElementConversionFailed {
            element,
            source: Box::new(source),
        })
    }

    /// Fields repeated `array_dim` times in contiguous slots.
    fn convert_fixed(
        &mut self,
        value: &Value,
        field: &FieldDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        let mut slots = match core::mem::replace(slot, Slot::Empty) {
            Slot::Fixed(slots) if slots.len() == field.array_dim => slots,
            _ => vec![field.kind.default_slot(); field.array_dim],
        };

        match value {
            Value::Array(items) => {
                if items.len() > slots.len() {
                    self.report(
                        Level::Warn,
                        format!(
                            "ignoring {} excess entries, {} holds {}",
                            items.len() - slots.len(),
                            field.name,
                            slots.len()
                        ),
                    );
                }
                for (index, (item, target)) in items.iter().zip(slots.iter_mut()).enumerate() {
                    if item.is_null() {
                        continue;
                    }
                    self.element(
                        Level::Warn,
                        Element::Index(index),
                        PathSegment::Index(index),
                        |de| de.convert_kind(item, &field.kind, target),
                    )?;
                }
            }
            scalar => {
                self.report(
                    Level::Warn,
                    format!(
                        "only the first of the {} slots of {} is read from a single value",
                        slots.len(),
                        field.name
                    ),
                );
                if let Some(first) = slots.first_mut() {
                    self.convert_kind(scalar, &field.kind, first)?;
                }
            }
        }

        *slot = Slot::Fixed(slots);
        Ok(())
    }

    fn convert_kind(
        &mut self,
        value: &Value,
        kind: &FieldKind,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        match kind {
            FieldKind::Enum { enum_name, repr } => {
                *slot = match value {
                    Value::String(member) => repr.store_int(self.enum_by_name(enum_name, member)?),
                    other => {
                        let number = self.integer(other);
                        if !self.provider.is_enum_value(enum_name, number) {
                            self.report(
                                Level::Warn,
                                format!("{number} is not a declared member of {enum_name}; stored as-is"),
                            );
                        }
                        repr.store_int(number)
                    }
                };
            }
            FieldKind::Numeric { repr, enum_name } => {
                *slot = match (value, enum_name) {
                    (Value::String(member), Some(enum_name)) => {
                        repr.store_int(self.enum_by_name(enum_name, member)?)
                    }
                    (other, _) if repr.is_float() => {
                        let number = self.number(other);
                        repr.store_float(number)
                    }
                    (Value::String(text), None) => self.integer_text(text, *repr),
                    (Value::Number(number), _) if *repr == NumericKind::U64 => {
                        match number.as_u64() {
                            Some(exact) => Slot::UInt(exact),
                            None => repr.store_int(self.integer(value)),
                        }
                    }
                    (other, _) => repr.store_int(self.integer(other)),
                };
            }
            FieldKind::Bool => {
                let flag = coerce::as_bool(value).unwrap_or_else(|| {
                    self.fallback(value, "a bool", "false");
                    false
                });
                *slot = Slot::Bool(flag);
            }
            FieldKind::String => {
                let text = coerce::as_string(value).unwrap_or_else(|| {
                    self.fallback(value, "a string", "an empty string");
                    String::new()
                });
                *slot = Slot::String(text);
            }
            FieldKind::Text => {
                *slot = Slot::Text(match value {
                    Value::String(text) => Text::invariant(text.as_str()),
                    Value::Object(entries) => self.localized(entries)?,
                    other => return Err(mismatch("a string or an object of cultures", other)),
                });
            }
            FieldKind::Array(inner) => self.convert_array(value, inner, slot)?,
            FieldKind::Set(inner) => self.convert_set(value, inner, slot)?,
            FieldKind::Map { key, value: item } => self.convert_map(value, key, item, slot)?,
            FieldKind::Struct(descriptor) => self.convert_struct(value, descriptor, slot)?,
            FieldKind::Object { class } => self.convert_object(value, class, slot)?,
            FieldKind::Opaque { type_name } => {
                let text = coerce::as_string(value).unwrap_or_default();
                *slot = self.provider.import_text(type_name, &text).ok_or_else(|| {
                    ConversionError::UnsupportedPropertyKind {
                        type_name: type_name.clone(),
                        text,
                    }
                })?;
            }
        }
        Ok(())
    }

    fn enum_by_name(&self, enum_name: &str, member: &str) -> Result<i64, ConversionError> {
        self.provider
            .enum_value(enum_name, member)
            .ok_or_else(|| ConversionError::UnknownEnumValue {
                enum_name: enum_name.to_string(),
                value: member.to_string(),
            })
    }

    fn fallback(&mut self, value: &Value, expected: &str, default: &str) {
        self.report(
            Level::Warn,
            format!(
                "expected {expected}, found {}; using {default}",
                JsonType::of(value)
            ),
        );
    }

    fn number(&mut self, value: &Value) -> f64 {
        coerce::as_number(value).unwrap_or_else(|| {
            self.fallback(value, "a number", "0");
            0.0
        })
    }

    /// Integers stay exact; anything else goes through `f64` and truncates.
    fn integer(&mut self, value: &Value) -> i64 {
        match value {
            Value::Number(number) if number.is_i64() => number.as_i64().unwrap_or_default(),
            other => self.number(other) as i64,
        }
    }

    fn integer_text(&mut self, text: &str, repr: NumericKind) -> Slot {
        match coerce::parse_integer(text) {
            IntegerText::Exact(value) => repr.store_int(value),
            IntegerText::Overflow(value) => {
                if repr == NumericKind::U64 {
                    if let Ok(exact) = text.trim().parse::<u64>() {
                        return Slot::UInt(exact);
                    }
                }
                self.report(
                    Level::Warn,
                    format!("`{text}` does not fit in 64 bits; using {value}"),
                );
                repr.store_int(value)
            }
            IntegerText::Truncated(value) => {
                self.report(
                    Level::Warn,
                    format!("ignoring trailing characters of `{text}`; using {value}"),
                );
                repr.store_int(value)
            }
            IntegerText::Invalid => {
                self.report(Level::Warn, format!("`{text}` is not an integer; using 0"));
                repr.store_int(0)
            }
        }
    }

    /// The first culture in the resolver's chain that the object has a key
    /// for wins.
    fn localized(&self, entries: &Map<String, Value>) -> Result<Text, ConversionError> {
        let tried = self.cultures.prioritized_cultures();
        for culture in &tried {
            let hit = entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(culture))
                .and_then(|(_, value)| coerce::as_string(value));
            if let Some(value) = hit {
                return Ok(Text {
                    value,
                    culture: Some(culture.clone()),
                });
            }
        }
        Err(ConversionError::NoMatchingLocale { tried })
    }

    fn convert_array(
        &mut self,
        value: &Value,
        inner: &FieldDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        let Value::Array(items) = value else {
            return Err(mismatch("an array", value));
        };

        let mut elements = match core::mem::replace(slot, Slot::Empty) {
            Slot::Array(elements) => elements,
            _ => Vec::new(),
        };
        elements.resize(items.len(), inner.default_slot());

        for (index, (item, element)) in items.iter().zip(elements.iter_mut()).enumerate() {
            if item.is_null() {
                continue;
            }
            self.element(
                Level::Warn,
                Element::Index(index),
                PathSegment::Index(index),
                |de| de.convert(item, inner, element),
            )?;
        }

        *slot = Slot::Array(elements);
        Ok(())
    }

    fn convert_set(
        &mut self,
        value: &Value,
        inner: &FieldDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        let Value::Array(items) = value else {
            return Err(mismatch("an array", value));
        };

        let mut elements = match core::mem::replace(slot, Slot::Empty) {
            Slot::Set(elements) => elements,
            _ => Vec::new(),
        };

        for (index, item) in items.iter().enumerate() {
            if item.is_null() {
                continue;
            }
            let mut element = inner.default_slot();
            self.element(
                Level::Error,
                Element::Index(index),
                PathSegment::Index(index),
                |de| de.convert(item, inner, &mut element),
            )?;
            elements.push(element);
        }

        let mut set = Slot::Set(elements);
        set.rehash();
        *slot = set;
        Ok(())
    }

    fn convert_map(
        &mut self,
        value: &Value,
        key: &FieldDescriptor,
        item: &FieldDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        let Value::Object(object) = value else {
            return Err(mismatch("an object", value));
        };

        let mut entries = match core::mem::replace(slot, Slot::Empty) {
            Slot::Map(entries) => entries,
            _ => Vec::new(),
        };

        for (name, entry) in object {
            if entry.is_null() {
                continue;
            }
            let mut key_slot = key.default_slot();
            let mut value_slot = item.default_slot();
            self.element(
                Level::Error,
                Element::Key(name.clone()),
                PathSegment::Key(name.clone()),
                |de| {
                    de.convert(&Value::String(name.clone()), key, &mut key_slot)?;
                    de.convert(entry, item, &mut value_slot)
                },
            )?;
            entries.push((key_slot, value_slot));
        }

        let mut map = Slot::Map(entries);
        map.rehash();
        *slot = map;
        Ok(())
    }

    fn convert_struct(
        &mut self,
        value: &Value,
        descriptor: &StructDescriptor,
        slot: &mut Slot,
    ) -> Result<(), ConversionError> {
        let mut target = match core::mem::replace(slot, Slot::Empty) {
            Slot::Struct(existing) if existing.type_name() == descriptor.name => existing,
            _ => StructValue::new(descriptor),
        };

        match value {
            Value::Object(attributes) => self.fill_struct(attributes, descriptor, &mut target),
            Value::String(text) => self.import_struct(text, descriptor, &mut target)?,
            other => {
                return Err(ConversionError::InvalidStructValue {
                    struct_name: descriptor.name.clone(),
                    found: JsonType::of(other),
                });
            }
        }

        *slot = Slot::Struct(target);
        Ok(())
    }

    /// Structures written as a single string.
    fn import_struct(
        &mut self,
        text: &str,
        descriptor: &StructDescriptor,
        target: &mut StructValue,
    ) -> Result<(), ConversionError> {
        match descriptor.kind {
            StructKind::Color | StructKind::LinearColor => {
                let color = Color::from_hex(text).unwrap_or_else(|| {
                    self.report(
                        Level::Warn,
                        format!("`{text}` is not a hex color; using transparent black"),
                    );
                    Color::default()
                });
                store_color(descriptor.kind, color, target);
                Ok(())
            }
            StructKind::DateTime => {
                let ticks = datetime::parse(text, self.options.clock).ok_or_else(|| {
                    ConversionError::InvalidDateTime {
                        text: text.to_string(),
                    }
                })?;
                target.set("Ticks", Slot::Int(ticks));
                Ok(())
            }
            _ => {
                if let Some(import) = descriptor.import_text {
                    if import(text, target) {
                        return Ok(());
                    }
                    trace!(
                        "Custom import of {} rejected {}, trying the generic form",
                        descriptor.name.blue(),
                        text.yellow()
                    );
                }
                self.import_generic(text, descriptor, target)
            }
        }
    }

    fn import_generic(
        &mut self,
        text: &str,
        descriptor: &StructDescriptor,
        target: &mut StructValue,
    ) -> Result<(), ConversionError> {
        let failed = |reason: String| ConversionError::TextImportFailed {
            struct_name: descriptor.name.clone(),
            reason,
        };
        let budget = self
            .options
            .max_depth
            .map_or(text_import::MAX_NESTING, |max| {
                max.saturating_sub(self.path.len())
            });
        match text_import::parse_nested(text, budget) {
            Ok(Value::Object(attributes)) => {
                self.fill_struct(&attributes, descriptor, target);
                Ok(())
            }
            Ok(other) => Err(failed(format!(
                "expected named entries, found {}",
                JsonType::of(&other)
            ))),
            Err(err) => Err(failed(err.to_string())),
        }
    }
}

fn store_color(kind: StructKind, color: Color, target: &mut StructValue) {
    if kind == StructKind::LinearColor {
        let linear = LinearColor::from(color);
        for (channel, value) in [("R", linear.r), ("G", linear.g), ("B", linear.b), ("A", linear.a)] {
            target.set(channel, Slot::Float(f64::from(value)));
        }
    } else {
        for (channel, value) in [("R", color.r), ("G", color.g), ("B", color.b), ("A", color.a)] {
            target.set(channel, Slot::UInt(u64::from(value)));
        }
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        found: JsonType::of(found),
    }
}

/// How loudly a field that failed with `err` is reported.
pub(crate) fn severity(err: &ConversionError) -> Level {
    match err {
        ConversionError::InvalidDateTime { .. }
        | ConversionError::InvalidStructValue { .. }
        | ConversionError::TooDeeplyNested { .. }
        | ConversionError::InstanceBusy { .. } => Level::Error,
        _ => Level::Warn,
    }
}
