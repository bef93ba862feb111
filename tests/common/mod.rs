#![allow(dead_code)]

use std::sync::Once;

use reflect_json_reader::{
    EnumDescriptor, Issue, JsonParser, ParserOptions, StructDescriptor, StructValue, TypeRegistry,
};

/// Reads `json` into a fresh value of `descriptor`, collecting issues.
pub fn read(
    registry: &TypeRegistry,
    descriptor: &StructDescriptor,
    json: &str,
) -> eyre::Result<(StructValue, Vec<Issue>)> {
    let mut target = StructValue::new(descriptor);
    let issues = read_into(registry, descriptor, json, &mut target)?;
    Ok((target, issues))
}

/// Reads `json` into an existing value, collecting issues.
pub fn read_into(
    registry: &TypeRegistry,
    descriptor: &StructDescriptor,
    json: &str,
    target: &mut StructValue,
) -> eyre::Result<Vec<Issue>> {
    read_with(registry, descriptor, json, target, ParserOptions::default())
}

pub fn read_with(
    registry: &TypeRegistry,
    descriptor: &StructDescriptor,
    json: &str,
    target: &mut StructValue,
    options: ParserOptions,
) -> eyre::Result<Vec<Issue>> {
    let mut issues: Vec<Issue> = Vec::new();
    JsonParser::from_text(json)
        .with_options(options)
        .read_struct_with(registry, descriptor, target, &mut issues)?;
    Ok(issues)
}

/// One line per issue: level, path and message.
pub fn render(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} {issue}", issue.level))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn mood() -> EnumDescriptor {
    EnumDescriptor::new("Mood")
        .with_member("Happy", 0)
        .with_member("Sad", 1)
        .with_member("Angry", 2)
}

pub fn registry_with_mood() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register_enum(mood());
    registry
}

/// Installs the test logger once per test binary; `facet_testhelpers::setup`
/// panics if called more than once in the same process.
pub fn setup() {
    static INIT: Once = Once::new();
    INIT.call_once(facet_testhelpers::setup);
}
