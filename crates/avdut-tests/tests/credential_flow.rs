//! End-to-end credential flow: settings file to launch arguments
//!
//! Mirrors a configured run: streaming-service credentials come out of the
//! settings store, ride the derived argument set into the player, and show
//! up in the player's own startup log.

#![cfg(unix)]

mod common;

use std::io::Write;

use avdut_core::{ConfigStore, HarnessError};
use avdut_player::{DeviceSupervisor, StopOutcome};
use serial_test::serial;

const MOCK_PLAYER: &str = env!("CARGO_BIN_EXE_mock-player");

const SETTINGS: &str = r#"
[tunein]
partnerid = "abc123"

[tidal]
id = "xyz"

[qobuz]
id = "q1"
secret = "s1"
"#;

fn write_settings(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create settings file");
    file.write_all(content.as_bytes()).expect("write settings");
    file
}

#[test]
#[serial]
fn credentials_flow_from_settings_to_player() {
    let settings = write_settings(SETTINGS);
    let store = ConfigStore::load(settings.path()).unwrap();

    let root = common::stage_install_root(MOCK_PLAYER);
    let mut options = common::start_options(&root, "TestDev", 18260);
    options.cloud_index = "1".to_string();
    options.tunein_partner_id = Some(store.get("tunein.partnerid").unwrap().to_string());
    options.tidal_id = Some(store.get("tidal.id").unwrap().to_string());
    options.qobuz_id = Some(format!(
        "{}:{}",
        store.get("qobuz.id").unwrap(),
        store.get("qobuz.secret").unwrap()
    ));

    let mut supervisor = DeviceSupervisor::start(options).unwrap();

    // Capability surface answers once start returns
    assert_eq!(common::odp_query(18260, "ping"), "pong");
    assert_eq!(common::odp_query(18260, "room"), "TestDev");

    let log_path = supervisor.log_path().unwrap().to_path_buf();
    assert_eq!(supervisor.stop().unwrap(), StopOutcome::Graceful);

    // The player saw every credential the store provided
    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("abc123"), "log: {}", log);
    assert!(log.contains("xyz"), "log: {}", log);
    assert!(log.contains("q1:s1"), "log: {}", log);
    assert!(log.contains("TestDev"), "log: {}", log);

    supervisor.cleanup_logs().unwrap();
    assert!(!log_path.exists());
}

#[test]
#[serial]
fn missing_credential_key_aborts_before_any_launch() {
    let settings = write_settings("[tunein]\npartnerid = \"abc123\"\n");
    let store = ConfigStore::load(settings.path()).unwrap();

    // The run never gets as far as building start options
    match store.get("qobuz.secret") {
        Err(HarnessError::ConfigKeyNotFound(key)) => assert_eq!(key, "qobuz.secret"),
        other => panic!("expected ConfigKeyNotFound, got {:?}", other),
    }
}
