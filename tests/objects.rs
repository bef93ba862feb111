mod common;

use std::sync::Arc;

use common::{read, read_into, read_with, render};
use reflect_json_reader::{
    DeserErrorKind, FieldDescriptor, FieldKind, Issue, JsonParser, Object, ObjectRef,
    ParserOptions, Slot, StructDescriptor, StructValue, TypeRegistry,
};

struct Classes {
    registry: TypeRegistry,
    node: Arc<StructDescriptor>,
    greeting: Arc<StructDescriptor>,
}

fn classes() -> Classes {
    let mut registry = TypeRegistry::new();
    let node = registry.register_class(
        StructDescriptor::class("Node")
            .with_field(FieldDescriptor::new("Id", FieldKind::String))
            .with_field(FieldDescriptor::new("Next", FieldKind::object("Node"))),
    );
    let greeting = registry.register_class(
        StructDescriptor::class("Greeting")
            .with_super(node.clone())
            .with_field(FieldDescriptor::new("Text", FieldKind::String)),
    );
    registry.register_class(StructDescriptor::class("Farewell").with_super(node.clone()));
    registry.register_class(StructDescriptor::class("Unrelated"));
    Classes {
        registry,
        node,
        greeting,
    }
}

fn holder() -> StructDescriptor {
    StructDescriptor::new("Holder")
        .with_field(FieldDescriptor::new("Line", FieldKind::object("Node")))
        .with_field(FieldDescriptor::new(
            "Lines",
            FieldKind::array(FieldKind::object("Node")),
        ))
}

fn line(holder: &StructValue) -> Option<ObjectRef> {
    holder.get("Line").and_then(Slot::as_object).cloned()
}

fn field(instance: &ObjectRef, name: &str) -> Option<Slot> {
    instance.borrow().values.get(name).cloned()
}

#[test]
fn type_tags_construct_subclasses() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, .. } = classes();
    let (holder, issues) = read(
        &registry,
        &holder(),
        r#"{"line": {"__type__": "Greeting", "id": "g1", "text": "hi"}}"#,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    let line = line(&holder).ok_or_else(|| eyre::eyre!("no instance"))?;
    assert_eq!(line.class_name(), "Greeting");
    assert_eq!(field(&line, "Id"), Some(Slot::String("g1".into())));
    assert_eq!(field(&line, "Text"), Some(Slot::String("hi".into())));
    assert_eq!(registry.constructed(), vec![line]);

    Ok(())
}

#[test]
fn existing_instances_are_updated_in_place() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, .. } = classes();
    let descriptor = holder();
    let mut target = StructValue::new(&descriptor);
    read_into(
        &registry,
        &descriptor,
        r#"{"line": {"__type__": "Greeting", "id": "g1", "text": "hi"}}"#,
        &mut target,
    )?;
    let first = line(&target).ok_or_else(|| eyre::eyre!("no instance"))?;

    let issues = read_into(
        &registry,
        &descriptor,
        r#"{"line": {"__type__": "Farewell", "text": "bye"}}"#,
        &mut target,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    let second = line(&target).ok_or_else(|| eyre::eyre!("instance dropped"))?;
    assert!(first.ptr_eq(&second));
    assert_eq!(second.class_name(), "Greeting");
    assert_eq!(field(&second, "Id"), Some(Slot::String("g1".into())));
    assert_eq!(field(&second, "Text"), Some(Slot::String("bye".into())));
    assert_eq!(registry.constructed().len(), 1);

    Ok(())
}

#[test]
fn objects_without_a_type_tag_are_skipped() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, .. } = classes();
    let (holder, issues) = read(&registry, &holder(), r#"{"line": {"id": "x"}}"#)?;

    assert_eq!(holder.get("Line"), Some(&Slot::Object(None)));
    assert!(registry.constructed().is_empty());
    insta::assert_snapshot!(render(&issues), @r#"WARN Line: unable to read Holder.Line from {"id":"x"}: object has no `__type__` key"#);

    Ok(())
}

#[test]
fn type_tags_must_name_a_subclass() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, .. } = classes();
    let (holder, issues) = read(
        &registry,
        &holder(),
        r#"{"line": {"__type__": "Unrelated"}, "lines": [{"__type__": 3}]}"#,
    )?;

    assert_eq!(holder.get("Line"), Some(&Slot::Object(None)));
    assert_eq!(holder.get("Lines"), Some(&Slot::Array(Vec::new())));
    insta::assert_snapshot!(render(&issues), @r#"
    WARN Line: unable to read Holder.Line from {"__type__":"Unrelated"}: no class named `Unrelated` derives from Node
    WARN Lines[0]: expected string type tag, found number
    WARN Lines: unable to read Holder.Lines from [{"__type__":3}]: unable to read element [0]: expected string type tag, found number
    "#);

    Ok(())
}

#[test]
fn arrays_of_objects_construct_each_element() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, .. } = classes();
    let (holder, issues) = read(
        &registry,
        &holder(),
        r#"{"lines": [
            {"__type__": "Greeting", "id": "a"},
            null,
            {"__type__": "Farewell", "id": "b"}
        ]}"#,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    let lines: Vec<Option<ObjectRef>> = holder
        .get("Lines")
        .and_then(Slot::as_elements)
        .unwrap_or_default()
        .iter()
        .map(|slot| slot.as_object().cloned())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0].as_ref().map(ObjectRef::class_name),
        Some("Greeting")
    );
    assert_eq!(lines[1], None);
    assert_eq!(
        lines[2].as_ref().map(ObjectRef::class_name),
        Some("Farewell")
    );

    Ok(())
}

#[test]
fn strings_name_existing_instances() -> eyre::Result<()> {
    common::setup();

    let Classes {
        mut registry,
        node,
        greeting,
    } = classes();
    let narrator = ObjectRef::new(Object::new(greeting.clone(), None));
    let local = ObjectRef::new(Object::new(greeting, None));
    let chapter = ObjectRef::new(Object::new(node, None).with_name("Chapter1"));
    registry.register_instance("Narrator", narrator.clone());
    registry.register_instance("Chapter1.Narrator", local.clone());

    let (global, issues) = read(&registry, &holder(), r#"{"line": "Narrator"}"#)?;
    assert!(issues.is_empty());
    assert_eq!(line(&global), Some(narrator));

    let (missing, issues) = read(&registry, &holder(), r#"{"line": "Nobody"}"#)?;
    assert!(issues.is_empty());
    assert_eq!(line(&missing), None);

    let descriptor = holder();
    let mut target = StructValue::new(&descriptor);
    read_with(
        &registry,
        &descriptor,
        r#"{"line": "Narrator"}"#,
        &mut target,
        ParserOptions::new().outer(chapter),
    )?;
    assert_eq!(line(&target), Some(local));

    Ok(())
}

#[test]
fn constructed_instances_live_inside_the_outer() -> eyre::Result<()> {
    common::setup();

    let Classes { registry, node, .. } = classes();
    let chapter = ObjectRef::new(Object::new(node, None).with_name("Chapter1"));
    let descriptor = holder();
    let mut target = StructValue::new(&descriptor);

    read_with(
        &registry,
        &descriptor,
        r#"{"line": {"__type__": "Farewell"}}"#,
        &mut target,
        ParserOptions::new().outer(chapter.clone()),
    )?;

    let line = line(&target).ok_or_else(|| eyre::eyre!("no instance"))?;
    assert_eq!(line.borrow().outer(), Some(chapter));

    Ok(())
}

#[test]
fn reading_into_an_instance_uses_its_runtime_class() -> eyre::Result<()> {
    common::setup();

    let Classes {
        registry, greeting, ..
    } = classes();
    let instance = ObjectRef::new(Object::new(greeting, None));
    let mut issues: Vec<Issue> = Vec::new();

    let mut parser = JsonParser::from_text(
        r#"{"id": "root", "text": "hello", "next": {"__type__": "Farewell", "id": "end"}}"#,
    );
    parser.read_object_with(&registry, &instance, &mut issues)?;

    assert!(parser.is_valid());
    assert!(issues.is_empty(), "{}", render(&issues));
    assert_eq!(field(&instance, "Id"), Some(Slot::String("root".into())));
    assert_eq!(field(&instance, "Text"), Some(Slot::String("hello".into())));
    let next = field(&instance, "Next")
        .and_then(|slot| slot.as_object().cloned())
        .ok_or_else(|| eyre::eyre!("next missing"))?;
    assert_eq!(next.class_name(), "Farewell");
    assert_eq!(field(&next, "Id"), Some(Slot::String("end".into())));

    Ok(())
}

#[test]
fn plain_structs_are_not_instances() -> eyre::Result<()> {
    common::setup();

    let registry = TypeRegistry::new();
    let speaker = ObjectRef::new(Object::new(Arc::new(StructDescriptor::new("Speaker")), None));
    let mut parser = JsonParser::from_text("{}");

    let err = parser
        .read_object(&registry, &speaker)
        .err()
        .ok_or_else(|| eyre::eyre!("read should fail"))?;

    assert!(matches!(err.kind(), DeserErrorKind::NotAClass { .. }));
    assert!(!parser.is_valid());
    insta::assert_snapshot!(err.to_string(), @"Speaker is not a class");

    Ok(())
}

#[test]
fn an_instance_cannot_be_filled_twice_at_once() -> eyre::Result<()> {
    common::setup();

    let Classes {
        registry, greeting, ..
    } = classes();
    let instance = ObjectRef::new(Object::new(greeting, None));
    instance
        .try_borrow_mut()?
        .values
        .set("Next", Slot::Object(Some(instance.clone())));
    let mut issues: Vec<Issue> = Vec::new();

    JsonParser::from_text(r#"{"id": "loop", "next": {"__type__": "Node", "id": "inner"}}"#)
        .read_object_with(&registry, &instance, &mut issues)?;

    assert_eq!(field(&instance, "Id"), Some(Slot::String("loop".into())));
    insta::assert_snapshot!(render(&issues), @r#"ERROR Next: unable to read Greeting.Next from {"__type__":"Node","id":"inner"}: instance of Greeting is already being filled"#);

    // Break the cycle.
    instance.try_borrow_mut()?.values.set("Next", Slot::Object(None));

    Ok(())
}
