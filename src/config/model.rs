//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a default so the client runs without a config file.

use crate::net::{ConnectOptions, TrustMode};
use crate::protocol::framing::DEFAULT_MAX_LINE_BYTES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to connect and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// `host:port` of the chat server.
    #[serde(default = "default_address")]
    pub address: String,
    /// Certificate checking. `accept-any` is for self-signed test servers only.
    #[serde(default)]
    pub trust: TrustMode,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub auth_timeout_secs: u64,
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            trust: TrustMode::default(),
            connect_timeout_secs: default_timeout_secs(),
            auth_timeout_secs: default_timeout_secs(),
            read_buffer_size: default_read_buffer_size(),
            max_line_bytes: default_max_line_bytes(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl ServerConfig {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            trust: self.trust,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            auth_timeout: Duration::from_secs(self.auth_timeout_secs),
            read_buffer_size: self.read_buffer_size,
            max_line_bytes: self.max_line_bytes,
            event_buffer: self.event_buffer,
        }
    }
}

/// Chat screen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default = "default_max_scrollback")]
    pub max_scrollback: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
            max_scrollback: default_max_scrollback(),
        }
    }
}

/// Diagnostic log settings. Chat content is never written here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `tracing` filter directive, e.g. `info` or `securecomm=debug`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_level(),
            log_dir: default_log_dir(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8443".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_read_buffer_size() -> usize {
    4096
}
fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}
fn default_event_buffer() -> usize {
    256
}
fn default_true() -> bool {
    true
}
fn default_timestamp_format() -> String {
    "%H:%M".to_string()
}
fn default_max_scrollback() -> usize {
    1000
}
fn default_level() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/securecomm/logs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.server.address, "127.0.0.1:8443");
        assert_eq!(cfg.server.trust, TrustMode::Verify);
        assert_eq!(cfg.ui.max_scrollback, 1000);
        assert!(cfg.logging.enabled);
    }

    #[test]
    fn test_partial_server_section() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            address = "chat.example.com:9000"
            trust = "accept-any"
            connect_timeout_secs = 3
            "#,
        )
        .unwrap();
        let opts = cfg.server.connect_options();
        assert_eq!(cfg.server.address, "chat.example.com:9000");
        assert_eq!(opts.trust, TrustMode::AcceptAny);
        assert_eq!(opts.connect_timeout, Duration::from_secs(3));
        assert_eq!(opts.auth_timeout, Duration::from_secs(10));
        assert_eq!(opts.read_buffer_size, 4096);
    }

    #[test]
    fn test_unknown_trust_mode_is_rejected() {
        let parsed: Result<AppConfig, _> = toml::from_str("[server]\ntrust = \"yolo\"\n");
        assert!(parsed.is_err());
    }
}
