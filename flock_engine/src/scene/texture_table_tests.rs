use super::*;
use crate::error::Error;

fn table() -> TextureTable<&'static str> {
    TextureTable::new("white", "white-pixels")
}

// ============================================================================
// Default texture
// ============================================================================

#[test]
fn test_default_texture_is_index_zero() {
    let table = table();
    assert_eq!(table.len(), 1);
    assert_eq!(table.descriptor_index(table.default_handle()), Some(0));
    assert_eq!(table.get(table.default_handle()), Some(&"white-pixels"));
}

#[test]
fn test_default_texture_survives_release() {
    let mut table = table();
    let default = table.default_handle();
    assert_eq!(table.release(default).unwrap(), None);
    assert_eq!(table.release(default).unwrap(), None);
    assert!(table.get(default).is_some());
}

// ============================================================================
// Insert / dedup
// ============================================================================

#[test]
fn test_insert_assigns_dense_indices() {
    let mut table = table();
    let a = table.insert("albedo", "a");
    let b = table.insert("normal", "b");
    assert_eq!(table.descriptor_index(a), Some(1));
    assert_eq!(table.descriptor_index(b), Some(2));
    assert_eq!(table.find("normal"), Some(b));
    assert_eq!(table.name(a), Some("albedo"));
}

#[test]
fn test_insert_same_name_dedups() {
    let mut table = table();
    let first = table.insert("albedo", "a");
    let second = table.insert("albedo", "ignored");
    assert_eq!(first, second);
    assert_eq!(table.len(), 2);
    assert_eq!(table.ref_count(first), 2);
    assert_eq!(table.get(first), Some(&"a"));
}

#[test]
fn test_insert_with_skips_build_on_hit() {
    let mut table = table();
    table.insert("albedo", "a");
    let handle = table
        .insert_with("albedo", || panic!("build must not run for a known name"))
        .unwrap();
    assert_eq!(table.ref_count(handle), 2);
}

#[test]
fn test_insert_with_propagates_build_error() {
    let mut table = table();
    let result = table.insert_with("broken", || Err(Error::InvalidResource("bad pixels".to_string())));
    assert!(result.is_err());
    assert_eq!(table.find("broken"), None);
    assert_eq!(table.len(), 1);
}

// ============================================================================
// Reference counting
// ============================================================================

#[test]
fn test_release_removes_at_zero_and_compacts() {
    let mut table = table();
    let a = table.insert("a", "a");
    let b = table.insert("b", "b");
    table.retain(a).unwrap();

    assert_eq!(table.release(a).unwrap(), None);
    assert_eq!(table.release(a).unwrap(), Some("a"));
    assert!(table.get(a).is_none());
    assert_eq!(table.find("a"), None);
    assert_eq!(table.descriptor_index(b), Some(1));
}

#[test]
fn test_stale_handle_rejected() {
    let mut table = table();
    let a = table.insert("a", "a");
    table.release(a).unwrap();
    assert!(matches!(table.release(a), Err(Error::InvalidResource(_))));
    assert!(table.retain(a).is_err());
    assert_eq!(table.ref_count(a), 0);
}

#[test]
fn test_iter_and_try_map_follow_descriptor_order() {
    let mut table = table();
    table.insert("a", "a");
    table.insert("b", "b");
    let names: Vec<&str> = table.iter().map(|(_, t)| *t).collect();
    assert_eq!(names, vec!["white-pixels", "a", "b"]);

    let mapped = table.try_map(|name, _| Ok(name.len())).unwrap();
    assert_eq!(mapped, vec![5, 1, 1]);
}
