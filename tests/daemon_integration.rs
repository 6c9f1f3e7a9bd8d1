//! End-to-end daemon flow against the simulated transport: bring-up,
//! scheduled polling, a write round trip and orderly shutdown.

use std::sync::Arc;
use std::time::Duration;

use snmpfs::find_by_path;
use snmpfs::run_bringup;
use snmpfs::AuthConfig;
use snmpfs::ColumnConfig;
use snmpfs::DeviceConfig;
use snmpfs::EmptyMib;
use snmpfs::EntryKind;
use snmpfs::MibResolver;
use snmpfs::ObjectConfig;
use snmpfs::Settings;
use snmpfs::SimSessionFactory;
use snmpfs::SnmpFs;
use tokio::sync::watch;
use tokio::time::sleep;

fn entry(name: &str, oid: &str, kind: EntryKind) -> ObjectConfig {
    ObjectConfig {
        name: name.to_string(),
        oid: oid.to_string(),
        kind,
        interval: None,
        columns: Vec::new(),
        placeholder: false,
        prefix: false,
    }
}

fn demo_settings() -> Settings {
    let mut interfaces = entry("interfaces", ".1.3.6.1.2.1.2.2", EntryKind::Table);
    interfaces.columns = vec![
        ColumnConfig {
            name: "index".to_string(),
            oid: ".1.3.6.1.2.1.2.2.1.1".to_string(),
        },
        ColumnConfig {
            name: "descr".to_string(),
            oid: ".1.3.6.1.2.1.2.2.1.2".to_string(),
        },
    ];

    let device = DeviceConfig {
        name: "virtsnmp0".to_string(),
        address: "192.0.2.20:161".to_string(),
        interval: 5,
        auth: AuthConfig::default(),
        objects: vec![
            entry("hostname", ".1.3.6.1.2.1.1.5.0", EntryKind::Scalar),
            entry("contact", ".1.3.6.1.2.1.1.4.0", EntryKind::Scalar),
            interfaces,
        ],
    };

    Settings {
        devices: vec![device],
        ..Settings::default()
    }
}

fn demo_daemon() -> Arc<SnmpFs> {
    let settings = demo_settings();
    settings.validate().expect("settings should validate");

    let factory = Arc::new(SimSessionFactory::new("public"));
    let resolver: Arc<dyn MibResolver> = Arc::new(EmptyMib);
    SnmpFs::new(settings, factory, resolver)
}

#[tokio::test(start_paused = true)]
async fn test_bringup_builds_namespace() {
    let fs = demo_daemon();
    let (_shutdown_tx, shutdown_rx) = watch::channel(());

    run_bringup(fs.clone(), shutdown_rx)
        .await
        .expect("bring-up should succeed");

    assert_eq!(fs.devices().len(), 1);

    let hostname = find_by_path(fs.root(), "/virtsnmp0/hostname").expect("leaf should exist");
    assert_eq!(hostname.read(0, 64).expect("should read"), b"virtsnmp0");

    let table = find_by_path(fs.root(), "/virtsnmp0/interfaces").expect("leaf should exist");
    let content = String::from_utf8(table.read(0, 4096).expect("should read")).unwrap();
    assert!(content.starts_with("index,descr\n"));
    assert!(content.contains("eth0"));
}

#[tokio::test(start_paused = true)]
async fn test_write_round_trips_through_device() {
    let fs = demo_daemon();
    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    run_bringup(fs.clone(), shutdown_rx)
        .await
        .expect("bring-up should succeed");

    let contact = find_by_path(fs.root(), "/virtsnmp0/contact").expect("leaf should exist");
    contact.truncate(0).expect("should truncate");
    contact.write(0, b"noc@example.org\n").expect("should write");
    contact.flush().await.expect("commit should succeed");

    // The mirror holds the device-confirmed echo
    assert_eq!(
        contact.read(0, 64).expect("should read"),
        b"noc@example.org"
    );

    // A scheduled poll keeps the confirmed value
    fs.start().expect("scheduler should start");
    sleep(Duration::from_secs(6)).await;
    fs.shutdown().await;

    assert_eq!(
        contact.read(0, 64).expect("should read"),
        b"noc@example.org"
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_no_tasks_behind() {
    let fs = demo_daemon();
    let (_shutdown_tx, shutdown_rx) = watch::channel(());
    run_bringup(fs.clone(), shutdown_rx)
        .await
        .expect("bring-up should succeed");

    fs.start().expect("scheduler should start");
    sleep(Duration::from_secs(1)).await;
    fs.shutdown().await;

    assert!(fs.scheduler().is_idle());
    assert_eq!(fs.scheduler().len(), 0);
    assert!(fs.devices().is_empty());

    // The namespace stays readable with last known-good content
    let hostname = find_by_path(fs.root(), "/virtsnmp0/hostname").expect("leaf should exist");
    assert_eq!(hostname.read(0, 64).expect("should read"), b"virtsnmp0");
}
