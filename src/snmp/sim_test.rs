use crate::snmp::Oid;
use crate::snmp::ProbeStatus;
use crate::snmp::SimSession;
use crate::snmp::SnmpSession;
use crate::snmp::ValueType;
use crate::SnmpError;

#[tokio::test]
async fn test_get_and_missing() {
    let session = SimSession::new();
    let id: Oid = ".1.2.3.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "hello");

    let value = session.get(&id).await.expect("should answer");
    assert_eq!(value.data, "hello");
    assert_eq!(value.id, id);

    let missing: Oid = ".1.2.4.0".parse().unwrap();
    assert_eq!(session.get(&missing).await, Err(SnmpError::NoSuchName));
}

#[tokio::test]
async fn test_get_next_walks_in_order() {
    let session = SimSession::new();
    session.put(".1.2.1".parse().unwrap(), ValueType::Integer, "1");
    session.put(".1.2.2".parse().unwrap(), ValueType::Integer, "2");
    session.put(".1.3.1".parse().unwrap(), ValueType::Integer, "3");

    let mut current: Oid = Oid::root();
    let mut seen = Vec::new();
    while let Some(value) = session.get_next(&current).await.expect("should answer") {
        current = value.id.clone();
        seen.push(value.data);
    }

    assert_eq!(seen, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_set_echoes_confirmed_value() {
    let session = SimSession::new();
    let id: Oid = ".1.2.3.0".parse().unwrap();
    session.put(id.clone(), ValueType::OctetStr, "before");

    let confirmed = session
        .set(&id, ValueType::OctetStr, "after")
        .await
        .expect("should accept");
    assert_eq!(confirmed.data, "after");

    let read_back = session.get(&id).await.expect("should answer");
    assert_eq!(read_back.data, "after");
}

#[tokio::test]
async fn test_set_rejections() {
    let id: Oid = ".1.2.3.0".parse().unwrap();
    let session = SimSession::new().mark_read_only(id.clone());
    session.put(id.clone(), ValueType::OctetStr, "locked");

    assert_eq!(
        session.set(&id, ValueType::OctetStr, "nope").await,
        Err(SnmpError::NotWritable)
    );

    let unknown: Oid = ".9.9.9.0".parse().unwrap();
    assert_eq!(
        session.set(&unknown, ValueType::OctetStr, "x").await,
        Err(SnmpError::InconsistentName)
    );
}

#[tokio::test]
async fn test_probe_status() {
    let session = SimSession::new();
    assert_eq!(session.probe().await, ProbeStatus::Online);

    session.set_status(ProbeStatus::Offline);
    assert_eq!(session.probe().await, ProbeStatus::Offline);
}

#[tokio::test]
async fn test_demo_profile_has_hostname() {
    let session = SimSession::with_demo_profile("srv01");
    let id: Oid = ".1.3.6.1.2.1.1.5.0".parse().unwrap();
    assert_eq!(session.get(&id).await.expect("should answer").data, "srv01");
}
