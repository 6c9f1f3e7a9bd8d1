use std::sync::Arc;

use crate::namespace::find_by_path;
use crate::namespace::insert_by_path;
use crate::namespace::Node;
use crate::object::Attribute;
use crate::object::SyncedObject;
use crate::snmp::EmptyMib;
use crate::snmp::Oid;
use crate::snmp::SimSession;
use crate::snmp::SnmpSession;
use crate::snmp::ValueType;
use crate::DeviceClient;

fn bound_file(name: &str, session: Arc<SimSession>, raw_oid: &str) -> (Arc<Node>, Arc<Attribute>) {
    let id: Oid = raw_oid.parse().unwrap();
    let attribute = Arc::new(Attribute::new(id, ValueType::OctetStr, &EmptyMib));
    let client = Arc::new(DeviceClient::new("dev0", session));
    let node = Node::file(name, SyncedObject::Scalar(attribute.clone()), client);
    (node, attribute)
}

#[test]
fn test_directory_children() {
    let root = Node::directory("/");
    let sub = Node::directory("devices");

    root.add_child(sub.clone()).expect("should add");
    sub.add_child(Node::directory("dev0")).expect("should add");

    assert!(root.is_directory());
    assert_eq!(root.child_count(), 1);
    assert!(root.child_by_name("devices").is_some());
    assert!(root.child_by_name("missing").is_none());

    let dump = root.render_tree();
    assert!(dump.contains("devices"));
    assert!(dump.contains("|-- dev0"));
}

#[test]
fn test_file_rejects_children_and_dir_rejects_content() {
    let session = Arc::new(SimSession::new());
    let (file, _) = bound_file("hostname", session, ".1.2.3.0");

    assert!(file.add_child(Node::directory("sub")).is_err());

    let dir = Node::directory("dir");
    assert!(dir.read(0, 16).is_err());
    assert!(dir.write(0, b"x").is_err());
}

#[tokio::test]
async fn test_file_mirrors_confirmed_content() {
    let session = Arc::new(SimSession::new());
    let id: Oid = ".1.2.3.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "payload");

    let (node, attribute) = bound_file("value", session, ".1.2.3.0");
    let client = DeviceClient::new("dev0", Arc::new(SimSession::new()));
    let _ = client; // content arrives via the subscribed mirror

    attribute.absorb(&crate::snmp::ObjectValue::new(id, ValueType::OctetStr, "payload"));

    assert_eq!(node.size(), 7);
    assert_eq!(node.read(0, 16).expect("should read"), b"payload");

    let mode = node.mode();
    assert!(!mode.directory);
    assert!(mode.readable);
    assert!(mode.writable);
}

#[tokio::test]
async fn test_flush_commits_modified_content() {
    let session = Arc::new(SimSession::new());
    let id: Oid = ".1.2.3.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "old");

    let attribute = Arc::new(Attribute::new(id.clone(), ValueType::OctetStr, &EmptyMib));
    let client = Arc::new(DeviceClient::new("dev0", session.clone()));
    let node = Node::file("value", SyncedObject::Scalar(attribute.clone()), client.clone());
    assert!(attribute.refresh(&client).await);

    // Flush without modification is a no-op
    node.flush().await.expect("should be a no-op");

    node.truncate(0).expect("should truncate");
    node.write(0, b"new\n").expect("should write");
    node.flush().await.expect("should commit");

    assert_eq!(attribute.data(), "new");
    assert_eq!(session.get(&id).await.expect("should answer").data, "new");
    assert_eq!(node.read(0, 16).expect("should read"), b"new");
}

#[tokio::test]
async fn test_failed_flush_restores_content() {
    let id: Oid = ".1.2.3.0".parse().unwrap();
    let session = Arc::new(SimSession::new().mark_read_only(id.clone()));
    session.put(id.clone(), ValueType::OctetStr, "locked");

    let attribute = Arc::new(Attribute::new(id, ValueType::OctetStr, &EmptyMib));
    let client = Arc::new(DeviceClient::new("dev0", session));
    let node = Node::file("value", SyncedObject::Scalar(attribute.clone()), client.clone());
    assert!(attribute.refresh(&client).await);

    node.truncate(0).expect("should truncate");
    node.write(0, b"rejected-edit").expect("should write");
    assert!(node.flush().await.is_err());

    // Displayed content reverts to the last confirmed value
    assert_eq!(node.read(0, 16).expect("should read"), b"locked");
    assert_eq!(attribute.data(), "locked");
}

#[test]
fn test_open_with_truncate() {
    let session = Arc::new(SimSession::new());
    let (node, _) = bound_file("value", session, ".1.2.3.0");

    node.write(0, b"something").expect("should write");
    node.open(true).expect("should open");
    assert_eq!(node.size(), 0);

    node.open(false).expect("should open");
}

#[test]
fn test_path_helpers() {
    let root = Node::directory("/");
    let session = Arc::new(SimSession::new());
    let (file, _) = bound_file("hostname", session, ".1.2.3.0");

    insert_by_path(&root, "/devices/dev0/hostname", file).expect("should insert");

    assert!(find_by_path(&root, "/devices").is_some());
    let found = find_by_path(&root, "/devices/dev0/hostname").expect("should find");
    assert_eq!(found.name(), "hostname");
    assert!(find_by_path(&root, "/devices/dev1").is_none());

    // Root path resolves to the root itself
    assert_eq!(find_by_path(&root, "/").expect("should find").name(), "/");
}
