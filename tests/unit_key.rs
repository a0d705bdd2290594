/// Unit tests for the Key type used to identify bindings

use std::collections::HashMap;
use wirebox::Key;

trait Transport: Send + Sync {}

struct Tcp;

impl Transport for Tcp {}

#[test]
fn test_key_equality_by_type() {
    assert_eq!(Key::of::<Tcp>(), Key::of::<Tcp>());
    assert_eq!(Key::of::<dyn Transport>(), Key::of::<dyn Transport>());
    assert_ne!(Key::of::<Tcp>(), Key::of::<dyn Transport>());
    assert_ne!(Key::of::<u32>(), Key::of::<i32>());
}

#[test]
fn test_key_display_name() {
    assert_eq!(Key::of::<u32>().display_name(), "u32");
    assert_eq!(Key::of::<String>().display_name(), "alloc::string::String");
    assert!(Key::of::<dyn Transport>().display_name().contains("Transport"));
}

#[test]
fn test_key_type_id_matches_std() {
    assert_eq!(Key::of::<u32>().type_id(), std::any::TypeId::of::<u32>());
    assert_eq!(
        Key::of::<dyn Transport>().type_id(),
        std::any::TypeId::of::<dyn Transport>()
    );
}

#[test]
fn test_key_usable_as_map_key() {
    let mut map = HashMap::new();
    map.insert(Key::of::<Tcp>(), "tcp");
    map.insert(Key::of::<dyn Transport>(), "transport");

    assert_eq!(map.len(), 2);
    assert_eq!(map[&Key::of::<Tcp>()], "tcp");
    assert_eq!(map[&Key::of::<dyn Transport>()], "transport");

    // Re-inserting the same type overwrites, not extends.
    map.insert(Key::of::<Tcp>(), "tcp2");
    assert_eq!(map.len(), 2);
}

#[test]
fn test_key_is_copy() {
    let key = Key::of::<u32>();
    let copied = key;
    assert_eq!(key, copied); // Still usable after the copy
}

#[test]
fn test_keys_order_consistently() {
    let mut keys = vec![Key::of::<u32>(), Key::of::<String>(), Key::of::<Tcp>()];
    keys.sort();
    let mut again = vec![Key::of::<Tcp>(), Key::of::<u32>(), Key::of::<String>()];
    again.sort();
    assert_eq!(keys, again);
}

#[test]
fn test_generic_instantiations_are_distinct_keys() {
    assert_ne!(Key::of::<Vec<u32>>(), Key::of::<Vec<u64>>());
    assert_ne!(Key::of::<Option<String>>(), Key::of::<Option<u32>>());
}
