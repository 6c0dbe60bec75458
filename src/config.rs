//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Default connect and read timeout ceiling
pub const DEFAULT_TIMEOUT_MS: u64 = 15 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// TCP/TLS connect timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds (applies to headers and body)
    #[serde(default = "default_timeout")]
    pub read_timeout_ms: u64,

    /// Worker threads for the dispatcher (runtime default when unset)
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Name given to dispatcher worker threads
    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// Optional User-Agent header
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Default tracing filter directive (`RUST_LOG` overrides)
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_timeout(),
            read_timeout_ms: default_timeout(),
            worker_threads: None,
            thread_name: default_thread_name(),
            user_agent: None,
            log_filter: default_log_filter(),
        }
    }
}

fn default_timeout() -> u64 { DEFAULT_TIMEOUT_MS }
fn default_thread_name() -> String { "http-socket-worker".to_string() }
fn default_log_filter() -> String { "http_socket_client=info".to_string() }

impl ClientConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
