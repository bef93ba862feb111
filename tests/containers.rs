mod common;

use common::{read, read_into, read_with, registry_with_mood, render};
use reflect_json_reader::{
    FieldDescriptor, FieldKind, NumericKind, ParserOptions, Slot, StructDescriptor, StructValue,
    TypeRegistry,
};

fn strings(items: &[&str]) -> Vec<Slot> {
    items.iter().map(|item| Slot::String(item.to_string())).collect()
}

fn inventory() -> StructDescriptor {
    StructDescriptor::new("Inventory")
        .with_field(FieldDescriptor::new("Tags", FieldKind::array(FieldKind::String)))
        .with_field(FieldDescriptor::new(
            "Moods",
            FieldKind::array(FieldKind::enumeration("Mood", NumericKind::U8)),
        ))
        .with_field(FieldDescriptor::new("Labels", FieldKind::set(FieldKind::String)))
        .with_field(FieldDescriptor::new(
            "Feelings",
            FieldKind::set(FieldKind::enumeration("Mood", NumericKind::U8)),
        ))
        .with_field(FieldDescriptor::new(
            "Counts",
            FieldKind::map(FieldKind::String, FieldKind::numeric(NumericKind::I32)),
        ))
        .with_field(FieldDescriptor::new(
            "Replies",
            FieldKind::map(
                FieldKind::enumeration("Mood", NumericKind::U8),
                FieldKind::String,
            ),
        ))
}

#[test]
fn arrays_resize_to_the_document() -> eyre::Result<()> {
    common::setup();

    let registry = registry_with_mood();
    let descriptor = inventory();
    let mut target = StructValue::new(&descriptor);
    target.set("Tags", Slot::Array(strings(&["w", "x", "y", "z"])));

    let issues = read_into(
        &registry,
        &descriptor,
        r#"{"tags": ["a", null, "c"], "moods": ["Sad", 2]}"#,
        &mut target,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    assert_eq!(target.get("Tags"), Some(&Slot::Array(strings(&["a", "x", "c"]))));
    assert_eq!(
        target.get("Moods"),
        Some(&Slot::Array(vec![Slot::UInt(1), Slot::UInt(2)]))
    );

    Ok(())
}

#[test]
fn one_bad_element_abandons_the_array() -> eyre::Result<()> {
    common::setup();

    let registry = registry_with_mood();
    let descriptor = inventory();
    let mut target = StructValue::new(&descriptor);
    target.set("Moods", Slot::Array(vec![Slot::UInt(0)]));

    let issues = read_into(
        &registry,
        &descriptor,
        r#"{"moods": ["Happy", "Bored"], "tags": "solo"}"#,
        &mut target,
    )?;

    assert_eq!(target.get("Moods"), Some(&Slot::Array(vec![Slot::UInt(0)])));
    assert_eq!(target.get("Tags"), Some(&Slot::Array(Vec::new())));
    insta::assert_snapshot!(render(&issues), @r#"
    WARN Tags: unable to read Inventory.Tags from "solo": expected an array, found string
    WARN Moods[1]: enum Mood has no member named `Bored`
    WARN Moods: unable to read Inventory.Moods from ["Happy","Bored"]: unable to read element [1]: enum Mood has no member named `Bored`
    "#);

    Ok(())
}

#[test]
fn sets_drop_duplicates() -> eyre::Result<()> {
    common::setup();

    let (inventory, issues) = read(
        &registry_with_mood(),
        &inventory(),
        r#"{"labels": ["a", "b", null, "a"]}"#,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    let labels = inventory
        .get("Labels")
        .and_then(Slot::as_elements)
        .unwrap_or_default();
    assert_eq!(labels.len(), 2);
    assert!(labels.contains(&Slot::String("a".into())));
    assert!(labels.contains(&Slot::String("b".into())));

    Ok(())
}

#[test]
fn set_element_failures_are_errors() -> eyre::Result<()> {
    common::setup();

    let (inventory, issues) = read(
        &registry_with_mood(),
        &inventory(),
        r#"{"feelings": ["Happy", "Meh"]}"#,
    )?;

    assert_eq!(inventory.get("Feelings"), Some(&Slot::Set(Vec::new())));
    insta::assert_snapshot!(render(&issues), @r#"
    ERROR Feelings[1]: enum Mood has no member named `Meh`
    WARN Feelings: unable to read Inventory.Feelings from ["Happy","Meh"]: unable to read element [1]: enum Mood has no member named `Meh`
    "#);

    Ok(())
}

#[test]
fn empty_maps_are_fine() -> eyre::Result<()> {
    common::setup();

    let (inventory, issues) = read(&registry_with_mood(), &inventory(), r#"{"counts": {}}"#)?;

    assert!(issues.is_empty());
    assert_eq!(inventory.get("Counts"), Some(&Slot::Map(Vec::new())));

    Ok(())
}

#[test]
fn maps_convert_keys_and_values() -> eyre::Result<()> {
    common::setup();

    let (inventory, issues) = read(
        &registry_with_mood(),
        &inventory(),
        r#"{
            "counts": {"apples": 3, "pears": null, "plums": "12"},
            "replies": {"Happy": "yay", "Angry": "grr"}
        }"#,
    )?;

    assert!(issues.is_empty(), "{}", render(&issues));
    assert_eq!(
        inventory.get("Counts"),
        Some(&Slot::Map(vec![
            (Slot::String("apples".into()), Slot::Int(3)),
            (Slot::String("plums".into()), Slot::Int(12)),
        ]))
    );
    assert_eq!(
        inventory.get("Replies"),
        Some(&Slot::Map(vec![
            (Slot::UInt(0), Slot::String("yay".into())),
            (Slot::UInt(2), Slot::String("grr".into())),
        ]))
    );

    Ok(())
}

#[test]
fn bad_map_keys_abandon_the_map() -> eyre::Result<()> {
    common::setup();

    let (inventory, issues) = read(
        &registry_with_mood(),
        &inventory(),
        r#"{"replies": {"Happy": "yay", "Bored": "meh"}}"#,
    )?;

    assert_eq!(inventory.get("Replies"), Some(&Slot::Map(Vec::new())));
    insta::assert_snapshot!(render(&issues), @r#"
    ERROR Replies["Bored"]: enum Mood has no member named `Bored`
    WARN Replies: unable to read Inventory.Replies from {"Happy":"yay","Bored":"meh"}: unable to read entry [key: Bored]: enum Mood has no member named `Bored`
    "#);

    Ok(())
}

fn slots() -> StructDescriptor {
    StructDescriptor::new("Slots").with_field(
        FieldDescriptor::new("Values", FieldKind::numeric(NumericKind::I32)).with_array_dim(3),
    )
}

#[test]
fn fixed_arrays_fill_positionally() -> eyre::Result<()> {
    common::setup();

    let registry = TypeRegistry::new();

    let (short, issues) = read(&registry, &slots(), r#"{"values": [1, 2]}"#)?;
    assert!(issues.is_empty());
    assert_eq!(
        short.get("Values"),
        Some(&Slot::Fixed(vec![Slot::Int(1), Slot::Int(2), Slot::Int(0)]))
    );

    let (long, issues) = read(&registry, &slots(), r#"{"values": [1, 2, 3, 4]}"#)?;
    assert_eq!(
        long.get("Values"),
        Some(&Slot::Fixed(vec![Slot::Int(1), Slot::Int(2), Slot::Int(3)]))
    );
    insta::assert_snapshot!(render(&issues), @"WARN Values: ignoring 1 excess entries, Values holds 3");

    let (single, issues) = read(&registry, &slots(), r#"{"values": 5}"#)?;
    assert_eq!(
        single.get("Values"),
        Some(&Slot::Fixed(vec![Slot::Int(5), Slot::Int(0), Slot::Int(0)]))
    );
    insta::assert_snapshot!(render(&issues), @"WARN Values: only the first of the 3 slots of Values is read from a single value");

    Ok(())
}

#[test]
fn nesting_is_limited() -> eyre::Result<()> {
    common::setup();

    let nest = StructDescriptor::new("Nest").with_field(FieldDescriptor::new(
        "Deep",
        FieldKind::array(FieldKind::array(FieldKind::array(FieldKind::numeric(
            NumericKind::I32,
        )))),
    ));
    let mut target = StructValue::new(&nest);

    let issues = read_with(
        &TypeRegistry::new(),
        &nest,
        r#"{"deep": [[[1]]]}"#,
        &mut target,
        ParserOptions::new().max_depth(Some(2)),
    )?;

    assert_eq!(target.get("Deep"), Some(&Slot::Array(Vec::new())));
    insta::assert_snapshot!(render(&issues), @"WARN Deep: unable to read Nest.Deep from [[[1]]]: unable to read element [0]: unable to read element [0]: nesting depth 2 exceeds the configured maximum");

    let issues = read_with(
        &TypeRegistry::new(),
        &nest,
        r#"{"deep": [[[1]]]}"#,
        &mut target,
        ParserOptions::new().max_depth(None),
    )?;
    assert!(issues.is_empty());
    assert_eq!(
        target.get("Deep"),
        Some(&Slot::Array(vec![Slot::Array(vec![Slot::Array(vec![
            Slot::Int(1)
        ])])]))
    );

    Ok(())
}
