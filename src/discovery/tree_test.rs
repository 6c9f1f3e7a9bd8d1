use crate::discovery::DiscoveryTree;
use crate::snmp::ObjectValue;
use crate::snmp::Oid;
use crate::snmp::ValueType;
use crate::TreeError;

fn value(raw: &str, data: &str) -> ObjectValue {
    ObjectValue::new(raw.parse().unwrap(), ValueType::OctetStr, data)
}

#[test]
fn test_insert_creates_missing_ancestors() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.3.6.1", "x")).expect("should insert");

    // 4 intermediate nodes plus root
    assert_eq!(tree.len(), 5);

    let id: Oid = ".1.3".parse().unwrap();
    let node = tree.get(&id).expect("ancestor should exist");
    assert_eq!(tree.oid(node), &id);
    assert!(tree.value(node).is_none());
}

/// Inserting the same identifier twice yields one node holding the
/// latest value, not two nodes.
#[test]
fn test_insert_is_idempotent() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.3", "old")).expect("should insert");
    let before = tree.len();

    tree.insert(value(".1.2.3", "new")).expect("should insert");
    assert_eq!(tree.len(), before);

    let node = tree.get(&".1.2.3".parse().unwrap()).unwrap();
    assert_eq!(tree.value(node).unwrap().data, "new");
}

#[test]
fn test_insert_below_out_of_order() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.3.4", "x")).expect("should insert");
    let deep = tree.get(&".1.2.3.4".parse().unwrap()).unwrap();

    let result = tree.insert_below(deep, value(".1.2", "y"));
    assert_eq!(
        result.unwrap_err(),
        TreeError::OutOfOrderInsert { depth: 4, len: 2 }
    );
}

#[test]
fn test_get_and_contains() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.3", "x")).expect("should insert");

    assert!(tree.contains(&".1.2".parse().unwrap()));
    assert!(tree.contains(&".1.2.3".parse().unwrap()));
    assert!(!tree.contains(&".1.2.4".parse().unwrap()));
    assert!(tree.get(&".2".parse().unwrap()).is_none());
}

#[test]
fn test_find_from_sibling_walks_up_and_down() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.3.1", "a")).expect("should insert");
    tree.insert(value(".1.2.4.1", "b")).expect("should insert");

    let start = tree.get(&".1.2.3.1".parse().unwrap()).unwrap();
    let target: Oid = ".1.2.4.1".parse().unwrap();

    let found = tree.find_from(start, &target).expect("should find");
    assert_eq!(tree.oid(found), &target);
    assert_eq!(tree.value(found).unwrap().data, "b");
}

#[test]
fn test_find_from_missing_target() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.3", "a")).expect("should insert");

    let start = tree.get(&".1.2.3".parse().unwrap()).unwrap();
    assert!(tree.find_from(start, &".1.9.9".parse().unwrap()).is_none());
}

#[test]
fn test_children_and_components() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2.1", "a")).expect("should insert");
    tree.insert(value(".1.2.2", "b")).expect("should insert");
    tree.insert(value(".1.2.7", "c")).expect("should insert");

    let parent = tree.get(&".1.2".parse().unwrap()).unwrap();
    assert_eq!(tree.children(parent).len(), 3);
    assert_eq!(
        tree.child_oids(parent),
        vec![
            ".1.2.1".parse::<Oid>().unwrap(),
            ".1.2.2".parse().unwrap(),
            ".1.2.7".parse().unwrap(),
        ]
    );

    let seven = tree.child_by_component(parent, 7).expect("should exist");
    assert_eq!(tree.value(seven).unwrap().data, "c");
    assert!(tree.child_by_component(parent, 9).is_none());
}

#[test]
fn test_render_contains_values() {
    let mut tree = DiscoveryTree::new();
    tree.insert(value(".1.2", "payload")).expect("should insert");

    let dump = tree.render();
    assert!(dump.contains("ROOT"));
    assert!(dump.contains(".1.2"));
    assert!(dump.contains("payload"));
}
