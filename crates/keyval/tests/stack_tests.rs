/// Tests for deep copying and layer stacking.
///
/// Stacking must merge mappings recursively, let the top layer win for every
/// other kind of value, and never touch either input. Copies must share no
/// structure with their source.
use keyval::{deep_copy, stack_onto, KeyVal, Mapping, Node};

// ============================================================================
// Fixtures
// ============================================================================

fn base_layer() -> KeyVal {
    KeyVal::from_json(br#"{"hello":1,"world":{"something":2},"wilbur":"razzle"}"#).unwrap()
}

fn top_layer() -> KeyVal {
    KeyVal::from_json(br#"{"hello":3,"yellow":56,"world":{"another":32,"yetanother":33}}"#)
        .unwrap()
}

fn json_string(kv: &KeyVal) -> String {
    String::from_utf8(kv.to_json().unwrap()).unwrap()
}

// ============================================================================
// 1. Deep copy
// ============================================================================

#[test]
fn copy_is_independent_of_source() {
    let kv = KeyVal::from_json(br#"{"hello":1,"world":{"something":2}}"#).unwrap();
    let mut copy = kv.copy();
    copy.set_value(3, &["world", "something"]).unwrap();

    assert_eq!(kv.number(&["world", "something"]).unwrap(), 2.0);
    assert_eq!(copy.number(&["world", "something"]).unwrap(), 3.0);
}

#[test]
fn copy_equals_source() {
    let kv = base_layer();
    assert_eq!(kv.copy(), kv);
}

#[test]
fn source_mutation_does_not_reach_copy() {
    let mut kv = KeyVal::from_json(br#"{"list":[{"a":1}],"map":{"b":{"c":2}}}"#).unwrap();
    let copy = kv.copy();
    kv.create_value(9, &["map", "b", "c"]).unwrap();
    kv.set_value("gone", &["list"]).unwrap();

    assert_eq!(copy.number(&["map", "b", "c"]).unwrap(), 2.0);
    assert_eq!(copy.array(&["list"]).unwrap().len(), 1);
}

#[test]
fn deep_copy_rebuilds_sequences_of_mappings() {
    let mut inner = Mapping::new();
    inner.insert("k".to_owned(), Node::from("v"));
    let original = Node::Sequence(vec![Node::Mapping(inner), Node::Number(1.0)]);

    let mut copied = deep_copy(&original);
    if let Node::Sequence(items) = &mut copied {
        if let Some(map) = items[0].as_mapping_mut() {
            map.insert("k".to_owned(), Node::from("changed"));
        }
    }

    assert_ne!(original, copied);
    let first = original.as_sequence().unwrap()[0].as_mapping().unwrap();
    assert_eq!(first.get("k"), Some(&Node::from("v")));
}

#[test]
fn clone_goes_through_deep_copy() {
    let kv = base_layer();
    let mut cloned = kv.clone();
    cloned.set_value("x", &["world", "something"]).unwrap();
    assert_eq!(kv.number(&["world", "something"]).unwrap(), 2.0);
}

// ============================================================================
// 2. Stack semantics
// ============================================================================

#[test]
fn stack_merges_mappings_and_overrides_scalars() {
    let merged = base_layer().stack(&top_layer());
    assert_eq!(
        json_string(&merged),
        r#"{"hello":3,"wilbur":"razzle","world":{"another":32,"something":2,"yetanother":33},"yellow":56}"#
    );
}

#[test]
fn stack_leaves_inputs_untouched() {
    let base = base_layer();
    let top = top_layer();
    let _ = base.stack(&top);
    assert_eq!(base, base_layer());
    assert_eq!(top, top_layer());
}

#[test]
fn stack_result_is_independent_of_inputs() {
    let base = base_layer();
    let top = top_layer();
    let mut merged = base.stack(&top);
    merged.set_value(0, &["world", "another"]).unwrap();
    merged.set_value(0, &["world", "something"]).unwrap();
    assert_eq!(top.number(&["world", "another"]).unwrap(), 32.0);
    assert_eq!(base.number(&["world", "something"]).unwrap(), 2.0);
}

#[test]
fn stack_replaces_sequences_wholesale() {
    let base = KeyVal::from_json(br#"{"hosts":["a","b","c"]}"#).unwrap();
    let top = KeyVal::from_json(br#"{"hosts":["z"]}"#).unwrap();
    let merged = base.stack(&top);
    assert_eq!(merged.array(&["hosts"]).unwrap(), &[Node::from("z")]);
}

#[test]
fn stack_scalar_over_mapping_replaces_mapping() {
    let base = KeyVal::from_json(br#"{"db":{"host":"a","port":1}}"#).unwrap();
    let top = KeyVal::from_json(br#"{"db":"sqlite://memory"}"#).unwrap();
    let merged = base.stack(&top);
    assert_eq!(merged.string(&["db"]).unwrap(), "sqlite://memory");
}

#[test]
fn stack_mapping_over_scalar_replaces_scalar() {
    let base = KeyVal::from_json(br#"{"db":"sqlite://memory"}"#).unwrap();
    let top = KeyVal::from_json(br#"{"db":{"host":"a"}}"#).unwrap();
    let merged = base.stack(&top);
    assert_eq!(merged.string(&["db", "host"]).unwrap(), "a");
    assert_eq!(merged.mapping(&["db"]).unwrap().len(), 1);
}

#[test]
fn stack_null_in_top_layer_overrides() {
    let base = KeyVal::from_json(br#"{"proxy":{"url":"http://p"}}"#).unwrap();
    let top = KeyVal::from_json(br#"{"proxy":null}"#).unwrap();
    let merged = base.stack(&top);
    assert!(merged.value(&["proxy"]).unwrap().is_null());
}

#[test]
fn stack_merges_at_every_depth() {
    let base = KeyVal::from_yaml(b"a:\n  b:\n    c:\n      keep: 1\n      change: 1\n").unwrap();
    let top = KeyVal::from_yaml(b"a:\n  b:\n    c:\n      change: 2\n      add: 3\n").unwrap();
    let merged = base.stack(&top);
    assert_eq!(merged.number(&["a", "b", "c", "keep"]).unwrap(), 1.0);
    assert_eq!(merged.number(&["a", "b", "c", "change"]).unwrap(), 2.0);
    assert_eq!(merged.number(&["a", "b", "c", "add"]).unwrap(), 3.0);
}

#[test]
fn stack_with_empty_layers() {
    let base = base_layer();
    assert_eq!(base.stack(&KeyVal::new()), base);
    assert_eq!(KeyVal::new().stack(&base), base);
}

#[test]
fn stack_layers_applies_in_priority_order() {
    let defaults = KeyVal::from_json(br#"{"log":{"level":"info","format":"text"},"port":80}"#)
        .unwrap();
    let file = KeyVal::from_yaml(b"log:\n  level: debug\nport: 8080\n").unwrap();
    let env = KeyVal::from_json(br#"{"log":{"level":"warn"}}"#).unwrap();

    let merged = KeyVal::stack_layers([&defaults, &file, &env]);
    assert_eq!(merged.string(&["log", "level"]).unwrap(), "warn");
    assert_eq!(merged.string(&["log", "format"]).unwrap(), "text");
    assert_eq!(merged.number(&["port"]).unwrap(), 8080.0);
}

#[test]
fn stack_layers_of_nothing_is_empty() {
    let merged = KeyVal::stack_layers(std::iter::empty());
    assert_eq!(merged, KeyVal::new());
}

#[test]
fn stack_onto_works_in_place() {
    let mut base = base_layer().into_mapping();
    stack_onto(&mut base, top_layer().into_mapping());
    let merged = KeyVal::from_mapping(base);
    assert_eq!(merged, base_layer().stack(&top_layer()));
}
