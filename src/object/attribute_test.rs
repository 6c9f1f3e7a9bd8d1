use std::sync::Arc;

use crate::object::Attribute;
use crate::snmp::EmptyMib;
use crate::snmp::MockSnmpSession;
use crate::snmp::Oid;
use crate::snmp::SimSession;
use crate::snmp::ValueType;
use crate::ContentMirror;
use crate::DeviceClient;
use crate::SnmpError;

fn sim_client(session: Arc<SimSession>) -> DeviceClient {
    DeviceClient::new("dev0", session)
}

#[tokio::test]
async fn test_refresh_reads_remote_value() {
    let session = Arc::new(SimSession::new());
    let id: Oid = ".1.3.6.1.2.1.1.5.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "srv01");

    let client = sim_client(session);
    let attribute = Attribute::new(id, ValueType::OctetStr, &EmptyMib);
    let mirror = Arc::new(ContentMirror::new());
    attribute.subscribe(mirror.clone());

    assert!(attribute.refresh(&client).await);
    assert_eq!(attribute.data(), "srv01");
    assert_eq!(mirror.text(), "srv01");
}

/// commit followed by refresh yields the device-confirmed echo.
#[tokio::test]
async fn test_commit_refresh_round_trip() {
    let session = Arc::new(SimSession::new());
    let id: Oid = ".1.3.6.1.2.1.1.5.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "old-name");

    let client = sim_client(session);
    let attribute = Attribute::new(id, ValueType::OctetStr, &EmptyMib);

    assert!(attribute.commit(&client, "new-name\n").await);
    assert_eq!(attribute.data(), "new-name");

    assert!(attribute.refresh(&client).await);
    assert_eq!(attribute.data(), "new-name");
}

#[tokio::test]
async fn test_commit_is_noop_for_unchanged_data() {
    let session = Arc::new(SimSession::new());
    let id: Oid = ".1.2.3.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "same");

    let client = sim_client(session.clone());
    let attribute = Attribute::new(id.clone(), ValueType::OctetStr, &EmptyMib);
    assert!(attribute.refresh(&client).await);

    // Remove the object so any SET would fail loudly
    session.remove(&id);
    assert!(attribute.commit(&client, "same\n").await);
    assert_eq!(attribute.data(), "same");
}

/// A failed commit never changes the confirmed data and tells
/// subscribers to restore without touching their change timestamp.
#[tokio::test]
async fn test_failed_commit_restores() {
    let id: Oid = ".1.2.3.0".parse().unwrap();
    let session = Arc::new(SimSession::new().mark_read_only(id.clone()));
    session.put(id.clone(), ValueType::OctetStr, "locked");

    let client = sim_client(session);
    let attribute = Attribute::new(id, ValueType::OctetStr, &EmptyMib);
    assert!(attribute.refresh(&client).await);

    let mirror = Arc::new(ContentMirror::new());
    attribute.subscribe(mirror.clone());
    let changed_before = mirror.time_changed();

    // Speculative edit by the filesystem side
    mirror.write(0, b"edited");
    assert!(!attribute.commit(&client, "edited").await);

    assert_eq!(attribute.data(), "locked");
    assert_eq!(mirror.text(), "locked");
    assert!(!mirror.is_modified());
    assert_eq!(mirror.time_changed(), changed_before);
    assert!(!attribute.is_writable());
}

#[tokio::test]
async fn test_refresh_failure_flips_access_flags() {
    let mut session = MockSnmpSession::new();
    session
        .expect_get()
        .returning(|_| Err(SnmpError::NoAccess));

    let client = DeviceClient::new("dev0", Arc::new(session));
    let id: Oid = ".1.2.3.0".parse().unwrap();
    let attribute = Attribute::new(id, ValueType::OctetStr, &EmptyMib);

    assert!(!attribute.refresh(&client).await);
    assert!(!attribute.is_readable());
    assert!(!attribute.is_writable());
}

#[test]
fn test_absorb_checks_identifier_and_difference() {
    use crate::snmp::ObjectValue;

    let id: Oid = ".1.2.3.0".parse().unwrap();
    let attribute = Attribute::new(id.clone(), ValueType::OctetStr, &EmptyMib);

    let foreign = ObjectValue::new(".9.9.9.0".parse().unwrap(), ValueType::OctetStr, "x");
    assert!(!attribute.absorb(&foreign));
    assert_eq!(attribute.data(), "");

    let own = ObjectValue::new(id.clone(), ValueType::OctetStr, "value");
    assert!(attribute.absorb(&own));
    assert_eq!(attribute.data(), "value");

    // Unchanged data does not count as a change
    assert!(!attribute.absorb(&own));
}

#[test]
fn test_seeded_attribute_starts_with_discovered_value() {
    use crate::snmp::ObjectValue;

    let value = ObjectValue::new(".1.2.3.0".parse().unwrap(), ValueType::Integer, "42");
    let attribute = Attribute::seeded(&value, &EmptyMib);

    assert_eq!(attribute.data(), "42");
    assert_eq!(attribute.value_type(), ValueType::Integer);
}
