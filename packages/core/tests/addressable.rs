use std::rc::Rc;

use fieldpath_core::{Addressable, Error, Kind, MapKey, Shared, StructType, Type, Value};

fn record_type() -> Rc<StructType> {
    StructType::new("Record")
        .with_field("name", Type::String)
        .with_field("count", Type::Int)
        .build()
}

fn record(name: &str) -> Value {
    Value::structure(&record_type(), [("name", name.into())])
}

fn record_pointers() -> Shared {
    Value::empty_map(Type::String, Type::pointer(Type::Struct(record_type()))).into_shared()
}

/// Read `M[key].name` straight from the backing map, without handles.
fn stored_name(map: &Shared, key: &str) -> Option<Value> {
    let stored = map.borrow().get(&MapKey::from(key)).cloned()?;
    let target = stored.pointee()?;
    target.field("name").cloned()
}

// ==================== read-after-write ====================

#[test]
fn direct_field_reads_back_every_write() {
    let graph = record("a").into_shared();
    let mut name = Addressable::root(&graph).field("name");
    for v in ["b", "", "longer value"] {
        name = name.set(v.into());
        assert_eq!(name.as_interface(), Value::from(v));
    }
    assert_eq!(graph.borrow().field("name"), Some(&Value::from("longer value")));
}

#[test]
fn slice_element_reads_back_writes() {
    let graph = Value::slice_of(Type::Int, [Value::Int(1), Value::Int(2)]).into_shared();
    let second = Addressable::root(&graph).index(1).set(Value::Int(20));
    assert_eq!(second.as_interface(), Value::Int(20));
    assert_eq!(graph.borrow().item(1), Some(&Value::Int(20)));
}

#[test]
fn entry_write_is_visible_in_the_map() {
    let graph = Value::empty_map(Type::String, Type::Int).into_shared();
    let entry = Addressable::root(&graph).entry("k").set(Value::Int(7));

    assert_eq!(entry.as_interface(), Value::Int(7));
    assert_eq!(graph.borrow().get(&"k".into()), Some(&Value::Int(7)));
}

#[test]
fn entry_overwrite_replaces_existing_value() {
    let graph = Value::map_of(Type::Int, Type::String, [(1i64, "one".into())]).into_shared();
    Addressable::root(&graph).entry(1i64).set("uno".into());
    assert_eq!(graph.borrow().get(&MapKey::Int(1)), Some(&Value::from("uno")));
    assert_eq!(graph.borrow().len(), Some(1));
}

// ==================== absence ====================

#[test]
fn absent_entry_is_invalid_and_reads_as_zero() {
    let graph = Value::empty_map(Type::String, Type::Int).into_shared();
    let entry = Addressable::root(&graph).entry("missing");

    assert!(!entry.is_valid());
    assert_eq!(entry.value(), None);
    assert_eq!(entry.as_interface(), Value::Int(0));
    assert_eq!(entry.ty(), Type::Int);
    assert_eq!(entry.kind(), Kind::Int);
}

#[test]
fn present_zero_is_valid() {
    let graph = Value::map_of(Type::String, Type::Int, [("zero", Value::Int(0))]).into_shared();
    let entry = Addressable::root(&graph).entry("zero");
    assert!(entry.is_valid());
    assert_eq!(entry.value(), Some(Value::Int(0)));
}

#[test]
fn absent_entry_in_nil_map_is_invalid() {
    let graph = Type::map(Type::String, Type::Int).zero_value().into_shared();
    let entry = Addressable::root(&graph).entry("k");
    assert!(!entry.is_valid());
    assert!(matches!(
        entry.try_set(Value::Int(1)),
        Err(Error::NilMap { .. })
    ));
}

// ==================== chained descent through a map ====================

#[test]
fn elem_on_pointer_entry_keeps_key_association() {
    let graph = record_pointers();
    Addressable::root(&graph)
        .entry("a")
        .set(Value::pointer_to(record("x")));

    let entry = Addressable::root(&graph).entry("a").elem();
    assert!(entry.is_entry());
    assert_eq!(entry.kind(), Kind::Struct);

    entry.field("name").set("y".into());
    assert_eq!(stored_name(&graph, "a"), Some(Value::from("y")));
}

#[test]
fn record_pointer_scenario() {
    let graph = record_pointers();

    let entry = Addressable::root(&graph).entry("a");
    assert!(!entry.is_valid());

    let entry = entry.set(Value::pointer_to(record("x")));
    assert_eq!(stored_name(&graph, "a"), Some(Value::from("x")));

    entry.elem().field("name").set("y".into());
    assert_eq!(stored_name(&graph, "a"), Some(Value::from("y")));
}

#[test]
fn struct_values_in_map_are_written_back_wholesale() {
    let graph = Value::map_of(
        Type::String,
        Type::Struct(record_type()),
        [("a", record("x"))],
    )
    .into_shared();

    Addressable::root(&graph)
        .entry("a")
        .field("count")
        .set(Value::Int(3));

    let stored = graph.borrow().get(&"a".into()).cloned().unwrap();
    assert_eq!(stored.field("count"), Some(&Value::Int(3)));
    assert_eq!(stored.field("name"), Some(&Value::from("x")));
}

#[test]
fn sibling_fields_written_through_clones_are_kept() {
    let graph = Value::empty_map(Type::String, Type::Struct(record_type())).into_shared();
    let entry = Addressable::root(&graph).entry("a").set(record(""));

    entry.clone().field("name").set("x".into());
    entry.clone().field("count").set(Value::Int(3));

    let stored = graph.borrow().get(&"a".into()).cloned().unwrap();
    assert_eq!(stored.field("name"), Some(&Value::from("x")));
    assert_eq!(stored.field("count"), Some(&Value::Int(3)));
    assert_eq!(entry.field("name").as_interface(), Value::from("x"));
}

#[test]
fn nested_maps_write_back_through_every_level() {
    let graph = Value::map_of(
        Type::String,
        Type::map(Type::String, Type::Int),
        [("outer", Value::empty_map(Type::String, Type::Int))],
    )
    .into_shared();

    Addressable::root(&graph)
        .entry("outer")
        .entry("inner")
        .set(Value::Int(9));

    let outer = graph.borrow().get(&"outer".into()).cloned().unwrap();
    assert_eq!(outer.get(&"inner".into()), Some(&Value::Int(9)));
}

#[test]
fn interface_entries_change_type_on_write() {
    let graph = Value::map_of(Type::String, Type::Interface, [("v", "text".into())]).into_shared();

    let entry = Addressable::root(&graph).entry("v");
    assert_eq!(entry.ty(), Type::Interface);

    let entry = entry.elem();
    assert_eq!(entry.ty(), Type::String);

    let entry = entry.set(Value::Int(42));
    assert_eq!(entry.ty(), Type::Int);
    assert_eq!(entry.as_interface(), Value::Int(42));
    assert_eq!(
        graph.borrow().get(&"v".into()),
        Some(&Value::boxed(Value::Int(42)))
    );
}

#[test]
fn interface_holding_pointer_takes_two_elems() {
    let graph = Value::map_of(
        Type::String,
        Type::Interface,
        [("r", Value::pointer_to(record("x")))],
    )
    .into_shared();

    let entry = Addressable::root(&graph).entry("r").elem();
    assert_eq!(entry.kind(), Kind::Pointer);

    entry.elem().field("name").set("z".into());
    let stored = graph.borrow().get(&"r".into()).cloned().unwrap().unboxed();
    assert_eq!(
        stored.pointee().and_then(|r| r.field("name").cloned()),
        Some(Value::from("z"))
    );
}

#[test]
fn cached_entry_ignores_later_map_changes() {
    let graph = Value::map_of(Type::String, Type::Int, [("k", Value::Int(1))]).into_shared();
    let cached = Addressable::root(&graph).entry("k").set(Value::Int(2));

    Addressable::root(&graph).entry("k").set(Value::Int(3));

    assert_eq!(cached.as_interface(), Value::Int(2));
    assert_eq!(
        Addressable::root(&graph).entry("k").as_interface(),
        Value::Int(3)
    );
}

// ==================== nil checks ====================

#[test]
fn nil_pointer_reports_nil() {
    let graph = Type::pointer(Type::Struct(record_type()))
        .zero_value()
        .into_shared();
    let root = Addressable::root(&graph);
    assert_eq!(root.kind(), Kind::Pointer);
    assert!(root.is_nil());
}

#[test]
#[should_panic(expected = "elem through a nil pointer")]
fn elem_on_nil_pointer_panics() {
    let graph = Type::pointer(Type::Int).zero_value().into_shared();
    Addressable::root(&graph).elem();
}

#[test]
#[should_panic(expected = "elem through a nil pointer")]
fn elem_on_nil_pointer_entry_panics() {
    let graph = Value::map_of(
        Type::String,
        Type::pointer(Type::Int),
        [("p", Type::pointer(Type::Int).zero_value())],
    )
    .into_shared();
    Addressable::root(&graph).entry("p").elem();
}

#[test]
#[should_panic(expected = "is_nil called on a value of kind string")]
fn is_nil_on_string_panics() {
    let graph = Value::from("s").into_shared();
    Addressable::root(&graph).is_nil();
}

// ==================== kind mismatches ====================

#[test]
#[should_panic(expected = "len called on a value of kind int")]
fn len_on_int_panics() {
    let graph = Value::Int(3).into_shared();
    Addressable::root(&graph).len();
}

#[test]
#[should_panic(expected = "not assignable")]
fn set_with_incompatible_type_panics() {
    let graph = record_pointers();
    Addressable::root(&graph).entry("a").set(record("x"));
}

#[test]
fn absent_entry_len_is_reported() {
    let graph = Value::empty_map(Type::String, Type::String).into_shared();
    assert_eq!(
        Addressable::root(&graph).entry("nope").try_len(),
        Err(Error::AbsentEntry { key: "nope".into() })
    );
}

#[test]
fn field_on_map_is_kind_mismatch() {
    let graph = Value::empty_map(Type::String, Type::String).into_shared();
    assert!(matches!(
        Addressable::root(&graph).try_field("name"),
        Err(Error::KindMismatch {
            op: "field",
            kind: Kind::Map,
        })
    ));
}
