//! Integration tests for loading machine configuration.

use physxml_core::{Config, Error, RtcBasis};
use std::path::Path;

fn fixture_path() -> &'static Path {
    Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/machine.json"
    ))
}

#[test]
fn test_load_fixture_identity() {
    let config = Config::from_json_file(fixture_path()).expect("Failed to load config");
    assert_eq!(config.guestname, "db01");
    assert_eq!(config.memory, 8 * 1024 * 1024 * 1024);
    assert_eq!(config.vcpus, 4);
}

#[test]
fn test_load_fixture_cpu_and_clock() {
    let config = Config::from_json_file(fixture_path()).expect("Failed to load config");
    assert_eq!(config.cpu.vendor.as_deref(), Some("Intel"));
    assert_eq!(config.cpu.model.as_deref(), Some("Broadwell"));
    assert_eq!(
        (config.cpu.sockets, config.cpu.cores, config.cpu.threads),
        (1, 2, 2)
    );
    assert!(config.cpu.acpi && config.cpu.apic && !config.cpu.pae);
    assert_eq!(config.rtc.basis, RtcBasis::Utc);
    assert_eq!(config.rtc.offset, 0);
}

#[test]
fn test_load_fixture_devices() {
    let config = Config::from_json_file(fixture_path()).expect("Failed to load config");
    assert_eq!(config.disks, vec!["/dev/sda", "vdb", "/dev/nvme0n1"]);
    assert_eq!(config.removable, vec!["hdc"]);
    assert_eq!(config.interfaces, vec!["eth0", "eth1"]);
    assert_eq!(config.network_map, vec!["eth1:storage", "lan"]);
}

#[test]
fn test_load_missing_file() {
    let err = Config::from_json_file(Path::new("/nonexistent/machine.json")).unwrap_err();
    match err {
        Error::Io { path: Some(p), .. } => assert!(p.ends_with("machine.json")),
        other => panic!("expected I/O error, got {}", other),
    }
}

#[test]
fn test_load_rejects_bad_basis() {
    let err = Config::from_json_str(
        r#"{"guestname": "x", "memory": 1, "vcpus": 1, "rtc": {"basis": "gmt"}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}
