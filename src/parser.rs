//! Loading documents and reading them into structures and instances.

use log::{debug, trace};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

use crate::{
    CultureChain, CultureResolver, DeserError, DeserErrorKind, Deserializer, Diagnostics,
    JsonType, LogDiagnostics, ObjectRef, ParserOptions, Span, StructDescriptor, StructKind,
    StructValue, TypeProvider,
};

/// A JSON document waiting to be read into a structure.
///
/// The parser keeps the document text so it can be read more than once, for
/// example into a fresh instance after a reload. [`JsonParser::is_valid`]
/// tells whether the last read succeeded.
pub struct JsonParser {
    text: String,
    file_name: Option<String>,
    is_valid: bool,
    options: ParserOptions,
    cultures: Box<dyn CultureResolver>,
}

impl JsonParser {
    /// Loads the document at `path`.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, DeserError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            DeserError::new(DeserErrorKind::FileLoad {
                path: path.to_path_buf(),
                source,
            })
        })?;
        debug!("Loaded {} ({} bytes)", path.display().blue(), text.len());

        let mut parser = Self::from_text(text);
        parser.file_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        Ok(parser)
    }

    /// Uses `text` as the document.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            file_name: None,
            is_valid: true,
            options: ParserOptions::default(),
            cultures: Box::new(CultureChain::default()),
        }
    }

    /// Replaces the pass options.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the cultures tried for localized text.
    pub fn with_cultures(mut self, cultures: impl CultureResolver + 'static) -> Self {
        self.cultures = Box::new(cultures);
        self
    }

    /// The loaded file's name without directory or extension.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Whether the document loaded and the last read succeeded.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// The document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The pass options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Reads the document into `target`, logging field issues.
    pub fn read_struct(
        &mut self,
        provider: &dyn TypeProvider,
        descriptor: &StructDescriptor,
        target: &mut StructValue,
    ) -> Result<(), DeserError> {
        self.read_struct_with(provider, descriptor, target, &mut LogDiagnostics)
    }

    /// Reads the document into `target`, sending field issues to
    /// `diagnostics`.
    ///
    /// Only an unparsable document or a top level that is not an object
    /// fails; bad fields are reported and skipped.
    pub fn read_struct_with(
        &mut self,
        provider: &dyn TypeProvider,
        descriptor: &StructDescriptor,
        target: &mut StructValue,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), DeserError> {
        let attributes = self.parse_object()?;
        trace!("Reading struct {}", descriptor.name.blue());

        let mut de =
            Deserializer::new(provider, self.cultures.as_ref(), diagnostics, &self.options);
        de.fill_struct(&attributes, descriptor, target);
        Ok(())
    }

    /// Reads the document into a class instance, logging field issues.
    pub fn read_object(
        &mut self,
        provider: &dyn TypeProvider,
        instance: &ObjectRef,
    ) -> Result<(), DeserError> {
        self.read_object_with(provider, instance, &mut LogDiagnostics)
    }

    /// Reads the document into a class instance using its runtime class,
    /// sending field issues to `diagnostics`.
    pub fn read_object_with(
        &mut self,
        provider: &dyn TypeProvider,
        instance: &ObjectRef,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<(), DeserError> {
        let class = instance.class().clone();
        if class.kind != StructKind::Class {
            return Err(self.fail(DeserErrorKind::NotAClass {
                type_name: class.name.clone(),
            }));
        }

        let attributes = self.parse_object()?;
        trace!("Reading instance of {}", class.name.blue());

        let result = {
            let mut de =
                Deserializer::new(provider, self.cultures.as_ref(), diagnostics, &self.options);
            de.fill_instance(&attributes, instance)
        };
        if result.is_err() {
            return Err(self.fail(DeserErrorKind::InstanceBusy {
                class: class.name.clone(),
            }));
        }
        Ok(())
    }

    fn fail(&mut self, kind: DeserErrorKind) -> DeserError {
        self.is_valid = false;
        DeserError::new(kind)
    }

    fn parse_object(&mut self) -> Result<Map<String, Value>, DeserError> {
        let result = parse_document(&self.text);
        self.is_valid = result.is_ok();
        result
    }
}

fn parse_document(text: &str) -> Result<Map<String, Value>, DeserError> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        let span = Span::at_line_column(text, err.line(), err.column());
        DeserError::new(DeserErrorKind::Parse(err))
            .with_source(text)
            .with_span(span)
    })?;

    match value {
        Value::Object(attributes) => Ok(attributes),
        other => {
            let trimmed = text.trim();
            let offset = text.len() - text.trim_start().len();
            Err(DeserError::new(DeserErrorKind::NotAnObject {
                found: JsonType::of(&other),
            })
            .with_source(text)
            .with_span(Span::new(offset, trimmed.len())))
        }
    }
}

/// Reads `text` into `target`, logging field issues.
pub fn from_str_into(
    text: &str,
    provider: &dyn TypeProvider,
    descriptor: &StructDescriptor,
    target: &mut StructValue,
) -> Result<(), DeserError> {
    JsonParser::from_text(text).read_struct(provider, descriptor, target)
}

/// Reads the file at `path` into `target`, logging field issues.
pub fn from_file_into(
    path: impl AsRef<std::path::Path>,
    provider: &dyn TypeProvider,
    descriptor: &StructDescriptor,
    target: &mut StructValue,
) -> Result<(), DeserError> {
    JsonParser::from_file(path)?.read_struct(provider, descriptor, target)
}
