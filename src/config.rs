//! Configuration management for RAX Chat Server
//!
//! Settings are read once at startup: built-in defaults, then an optional
//! `config.toml` in the working directory, then `CHAT_` prefixed environment
//! variables. Nothing here can change while the server is running.

use config::{Config, Environment, File};
use serde::Deserialize;

/// Default config file looked up relative to the working directory
const CONFIG_FILE: &str = "config";

/// Prefix for environment overrides, e.g. `CHAT_PORT=4000`
const ENV_PREFIX: &str = "CHAT";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    // ═══ NETWORK ═══
    /// IP address the chat listener binds to
    pub bind_address: String,

    /// Port the chat listener binds to
    pub port: u16,

    // ═══ PROTOCOL LIMITS ═══
    /// Longest accepted client line in bytes
    pub max_line_length: usize,

    /// Longest username accepted at registration
    pub max_username_length: usize,

    /// Longest password accepted at registration
    pub max_password_length: usize,

    /// Longest display name a `/file` request may carry
    pub max_filename_length: usize,

    // ═══ PRESENTATION ═══
    /// Prefix broadcast chat lines with `[HH:MM:SS]`
    pub timestamps: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 12345,
            max_line_length: 4096,
            max_username_length: 32,
            max_password_length: 128,
            max_filename_length: 255,
            timestamps: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        let limits = [
            ("max_line_length", self.max_line_length),
            ("max_username_length", self.max_username_length),
            ("max_password_length", self.max_password_length),
            ("max_filename_length", self.max_filename_length),
        ];

        for (name, value) in limits {
            if value == 0 {
                return Err(config::ConfigError::Message(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
