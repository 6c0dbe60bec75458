//! Config loading integration tests

use std::io::Write;

use http_socket_client::{ClientConfig, ConfigError, HttpSocketClient};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
connect_timeout_ms = 2000
read_timeout_ms = 4000
worker_threads = 3
thread_name = "relay-connect"
log_filter = "http_socket_client=debug"
"#
    )
    .unwrap();

    let config = ClientConfig::load(file.path()).unwrap();
    assert_eq!(config.connect_timeout_ms, 2000);
    assert_eq!(config.read_timeout_ms, 4000);
    assert_eq!(config.worker_threads, Some(3));
    assert_eq!(config.thread_name, "relay-connect");
    assert_eq!(config.log_filter, "http_socket_client=debug");
    assert_eq!(config.user_agent, None);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = ClientConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn test_client_from_loaded_config() {
    let config = ClientConfig::from_toml_str(
        r#"
worker_threads = 1
user_agent = "http-socket-client-test"
"#,
    )
    .unwrap();

    let client = HttpSocketClient::new(config.clone()).unwrap();
    assert_eq!(client.config(), &config);
    assert!(!client.dispatcher().is_disposed());
    client.close();
    assert!(client.dispatcher().is_disposed());
}
