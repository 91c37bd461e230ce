use std::path::PathBuf;
use taskboard_core::{ConfigError, DatabaseLocation, Store, StoreConfig, UserRepository, User};

#[test]
fn load_reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("board.db");
    let config_path = dir.path().join("taskboard.toml");
    std::fs::write(
        &config_path,
        format!(
            "[database]\npath = {:?}\nbusy_timeout_ms = 1200\n",
            db_path.display().to_string()
        ),
    )
    .unwrap();

    let config = StoreConfig::load(&config_path).unwrap();

    assert_eq!(config.database, DatabaseLocation::File(db_path));
    assert_eq!(config.busy_timeout.as_millis(), 1200);
    assert_eq!(config.log_dir, None);
}

#[test]
fn load_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let err = StoreConfig::load(&missing).unwrap_err();

    match err {
        ConfigError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn memory_override_opens_an_empty_store() {
    let config = StoreConfig::default()
        .with_overrides(|key| (key == "TASKBOARD_DB_PATH").then(|| ":memory:".to_string()))
        .unwrap();
    assert_eq!(config.database, DatabaseLocation::Memory);

    let store = Store::open(&config).unwrap();
    let mut user = User::new("Ada");
    store.users().unwrap().create_user(&mut user).unwrap();

    assert_eq!(store.stats().unwrap().users, 1);
}

#[test]
fn blank_log_dir_override_disables_logging() {
    let config = StoreConfig {
        log_dir: Some(PathBuf::from("/var/log/taskboard")),
        ..StoreConfig::default()
    }
    .with_overrides(|key| (key == "TASKBOARD_LOG_DIR").then(String::new))
    .unwrap();

    assert_eq!(config.log_dir, None);
}
