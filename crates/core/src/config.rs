use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Environment variable that overrides `database.uri`
pub const DATABASE_URI_ENV: &str = "BEHAVE_MONGODB_URI";

/// Chat backend endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the Socket.IO server (scheme, host and port)
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Socket.IO handshake path
    #[serde(default = "default_socket_path")]
    pub path: String,

    /// Namespace the chat channel lives under
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Let the transport re-establish a dropped connection on its own
    #[serde(default = "default_true")]
    pub reconnect: bool,
}

fn default_server_url() -> String {
    "http://localhost:12345".to_string()
}

fn default_socket_path() -> String {
    "/socket.io/".to_string()
}

fn default_namespace() -> String {
    "/socket/chat".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { url: default_server_url(), path: default_socket_path(), namespace: default_namespace(), reconnect: true }
    }
}

impl ServerConfig {
    /// Full handshake URL: base URL joined with the Socket.IO path
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.path.trim_start_matches('/'))
    }
}

/// Chat view settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatConfig {
    /// Heading printed when the chat view opens
    #[serde(default = "default_title")]
    pub title: String,

    /// Assistant message seeded into every new transcript; empty disables it
    #[serde(default = "default_welcome")]
    pub welcome: String,
}

fn default_title() -> String {
    "Behave Yourself - Your BDD Buddy".to_string()
}

fn default_welcome() -> String {
    "Hello! I can help you get information about your project repositories. What would you like to know?".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { title: default_title(), welcome: default_welcome() }
    }
}

/// Database connectivity probe settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    #[serde(default)]
    pub uri: Option<String>,

    /// Run the probe before opening the chat view
    #[serde(default)]
    pub probe_on_start: bool,
}

impl DatabaseConfig {
    /// Connection string to probe, preferring [`DATABASE_URI_ENV`] over the file value
    pub fn resolved_uri(&self) -> Option<String> {
        std::env::var(DATABASE_URI_ENV)
            .ok()
            .filter(|uri| !uri.trim().is_empty())
            .or_else(|| self.uri.clone())
    }
}

/// File logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_file_level")]
    pub level: String,
}

fn default_file_level() -> String {
    "debug".to_string()
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: default_file_level() }
    }
}

/// Controls how message text appears in logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivacyLoggingConfig {
    /// One of `none`, `truncate`, `full`
    #[serde(default = "default_log_content")]
    pub log_content: String,

    #[serde(default = "default_truncate_length")]
    pub truncate_length: usize,
}

fn default_log_content() -> String {
    "truncate".to_string()
}

fn default_truncate_length() -> usize {
    200
}

impl Default for PrivacyLoggingConfig {
    fn default() -> Self {
        Self { log_content: default_log_content(), truncate_length: default_truncate_length() }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// One of `pretty`, `json`, `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingConfig,

    #[serde(default)]
    pub privacy: PrivacyLoggingConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyLoggingConfig::default(),
        }
    }
}

/// Root configuration structure for behave.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(format!("TOML serialize error: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        use crate::Error;

        let url = self.server.url.trim();
        if url.is_empty() {
            return Err(Error::Config(ConfigError::MissingField("server.url".to_string()).to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(ConfigError::InvalidUrl(url.to_string()).to_string()));
        }

        if !self.server.namespace.starts_with('/') {
            return Err(Error::Config(
                ConfigError::LeadingSlashRequired(format!("server.namespace '{}'", self.server.namespace)).to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(Error::Config(
                ConfigError::LeadingSlashRequired(format!("server.path '{}'", self.server.path)).to_string(),
            ));
        }

        if let Some(uri) = &self.database.uri
            && uri.trim().is_empty()
        {
            return Err(Error::Config(ConfigError::MissingField("database.uri".to_string()).to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Behave Configuration Example
# Copy this file to behave.toml and customize as needed

[server]
# Base URL of the chat backend
url = "http://localhost:12345"
# Socket.IO handshake path
path = "/socket.io/"
# Namespace of the chat channel (must start with '/')
namespace = "/socket/chat"
# Let the transport reconnect on its own after a drop
reconnect = true

[chat]
title = "Behave Yourself - Your BDD Buddy"
# Seeded as the first assistant message; set to "" to disable
welcome = "Hello! I can help you get information about your project repositories. What would you like to know?"

[database]
# MongoDB connection string for `behave probe` (BEHAVE_MONGODB_URI overrides it)
# uri = "mongodb://localhost:27017"
# Run the probe before opening the chat view
probe_on_start = false

[logging]
# Level for stderr output (BEHAVE_LOG overrides it)
level = "warn"
# Format: "pretty", "json" or "compact"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
# How message text is logged: "none", "truncate" or "full"
log_content = "truncate"
truncate_length = 200
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required value missing or blank
    #[error("missing value: {0}")]
    MissingField(String),

    /// URL without an http(s) scheme
    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    /// Namespace or path without a leading slash
    #[error("leading '/' required: {0}")]
    LeadingSlashRequired(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.url, "http://localhost:12345");
        assert_eq!(config.server.path, "/socket.io/");
        assert_eq!(config.server.namespace, "/socket/chat");
        assert!(config.server.reconnect);
        assert_eq!(config.chat.title, "Behave Yourself - Your BDD Buddy");
        assert!(config.chat.welcome.starts_with("Hello!"));
        assert!(config.database.uri.is_none());
        assert!(!config.database.probe_on_start);
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_from_toml_str() {
        let toml = r#"
[server]
url = "https://chat.example.com"
namespace = "/bdd"
reconnect = false

[chat]
welcome = ""

[database]
uri = "mongodb://localhost:27017"
probe_on_start = true
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.server.url, "https://chat.example.com");
        assert_eq!(config.server.path, "/socket.io/");
        assert_eq!(config.server.namespace, "/bdd");
        assert!(!config.server.reconnect);
        assert!(config.chat.welcome.is_empty());
        assert_eq!(config.chat.title, "Behave Yourself - Your BDD Buddy");
        assert_eq!(config.database.uri.as_deref(), Some("mongodb://localhost:27017"));
        assert!(config.database.probe_on_start);
    }

    #[test]
    fn test_config_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert_eq!(config.chat, ChatConfig::default());
        assert_eq!(config.logging.privacy.log_content, "truncate");
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let mut config = Config::default();
        config.server.namespace = "/other".to_string();
        let toml = config.to_toml_string().unwrap();
        let parsed = Config::from_toml_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_endpoint_url_joins_path() {
        let server = ServerConfig::default();
        assert_eq!(server.endpoint_url(), "http://localhost:12345/socket.io/");

        let server = ServerConfig { url: "http://host:1/".to_string(), path: "/sio".to_string(), ..Default::default() };
        assert_eq!(server.endpoint_url(), "http://host:1/sio");
    }

    #[test]
    fn test_config_validation_namespace_without_slash() {
        let toml = r#"
[server]
namespace = "socket/chat"
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("leading '/' required"));
    }

    #[test]
    fn test_config_validation_empty_url() {
        let toml = r#"
[server]
url = ""
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.unwrap_err().to_string().contains("missing value: server.url"));
    }

    #[test]
    fn test_config_validation_url_scheme() {
        let toml = r#"
[server]
url = "localhost:12345"
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.unwrap_err().to_string().contains("invalid server url"));
    }

    #[test]
    fn test_config_validation_blank_database_uri() {
        let toml = r#"
[database]
uri = "  "
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.unwrap_err().to_string().contains("database.uri"));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let toml = r#"
[server]
transports = ["polling"]
"#;

        let result = Config::from_toml_str(toml);
        assert!(result.unwrap_err().to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chat]\ntitle = \"Test Chat\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.chat.title, "Test Chat");
    }

    #[test]
    fn test_config_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingField("server.url".to_string());
        assert_eq!(err.to_string(), "missing value: server.url");

        let err = ConfigError::InvalidUrl("ftp://x".to_string());
        assert_eq!(err.to_string(), "invalid server url: ftp://x");

        let err = ConfigError::LeadingSlashRequired("server.path 'x'".to_string());
        assert_eq!(err.to_string(), "leading '/' required: server.path 'x'");

        let err = ConfigError::TomlParse("parse error".to_string());
        assert_eq!(err.to_string(), "TOML parse error: parse error");
    }
}
