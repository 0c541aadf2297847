//! Logging setup for the behave binaries.
//!
//! Built on the tracing ecosystem. Everything goes to stderr so the chat view on
//! stdout stays readable; an optional daily-rolling JSON file can be enabled.
//!
//! # Environment Variables
//!
//! - `BEHAVE_LOG`: Filter directive (like `RUST_LOG`), e.g., `behave_transport=debug`
//! - `BEHAVE_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `BEHAVE_LOG_DIR`: Directory for file logs (default `~/.behave/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//!
//! [logging.privacy]
//! log_content = "truncate"
//! truncate_length = 200
//! ```
//!
//! # Example
//!
//! ```no_run
//! use behave_core::logging;
//!
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), behave_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingConfig, LoggingConfig as ConfigLoggingConfig};
use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// How chat message text is written to logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentLogging {
    /// Never log message text.
    None,
    /// Log up to `truncate_length` chars.
    #[default]
    Truncate,
    /// Log full text.
    Full,
}

impl ContentLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(ContentLogging::None),
            "truncate" => Some(ContentLogging::Truncate),
            "full" => Some(ContentLogging::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentLogging::None => "none",
            ContentLogging::Truncate => "truncate",
            ContentLogging::Full => "full",
        }
    }
}

impl FromStr for ContentLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentLogging::parse_str(s).ok_or_else(|| format!("invalid content logging: {}", s))
    }
}

/// Logging configuration wrapper that bridges config and logging modules.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// File logging configuration (only set when enabled).
    pub file: Option<FileLoggingConfig>,
    /// Privacy controls for message text.
    pub privacy: PrivacyConfig,
}

/// Privacy configuration for message text in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyConfig {
    pub log_content: ContentLogging,
    /// Maximum length for truncated content.
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_content: ContentLogging::default(), truncate_length: 200 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file: None, privacy: PrivacyConfig::default() }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_content = ContentLogging::parse_str(&config.privacy.log_content).unwrap_or_default();

        Self {
            level: config.level,
            format,
            file: if config.file.enabled { Some(config.file) } else { None },
            privacy: PrivacyConfig { log_content, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_logging(mut self, config: FileLoggingConfig) -> Self {
        self.file = Some(config);
        self
    }

    pub fn with_privacy(mut self, config: PrivacyConfig) -> Self {
        self.privacy = config;
        self
    }

    /// Filter directive for stderr: `BEHAVE_LOG`, then `RUST_LOG`, then the configured level.
    fn filter_directive(&self) -> String {
        env::var("BEHAVE_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("BEHAVE_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format == LogFormat::Pretty && !Self::is_tty() { LogFormat::Compact } else { self.format }
    }

    fn get_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("BEHAVE_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".behave").join("logs"))
    }
}

/// Install the global tracing subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it alive
/// for the lifetime of the process or buffered lines are lost on exit.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let log_dir = match &config.file {
        Some(_) => Some(LoggingConfig::get_log_dir()?),
        None => None,
    };
    install(&config, log_dir)
}

/// Build and install the subscriber; `log_dir` is required when file logging is on.
fn install(config: &LoggingConfig, log_dir: Option<PathBuf>) -> Result<Option<WorkerGuard>, Error> {
    let stderr_filter = EnvFilter::new(config.filter_directive());
    let format = config.detect_format();
    let init_err = |e: tracing_subscriber::util::TryInitError| Error::Other(format!("logging already initialized: {}", e));

    if let (Some(file_config), Some(log_dir)) = (&config.file, log_dir) {
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "behave.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        // The file layer sits directly on the registry so one value fits every stderr format.
        let registry = Registry::default().with(
            fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(&file_config.level)),
        );

        match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(io::stderr).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
        }

        Ok(Some(guard))
    } else {
        let registry = Registry::default();
        match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(io::stderr).with_filter(stderr_filter))
                .try_init()
                .map_err(init_err)?,
        }

        Ok(None)
    }
}

/// Redact message text based on privacy settings.
pub fn redact_content(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_content {
        ContentLogging::None => "[REDACTED]".to_string(),
        ContentLogging::Full => content.to_string(),
        ContentLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
    }
}

/// Sanitize file paths for logging (replace the home directory with `~`).
pub fn sanitize_path(path: &std::path::Path) -> String {
    if let Ok(home) = env::var("HOME")
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PrivacyLoggingConfig;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::parse_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse_str("Compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse_str("invalid"), None);
    }

    #[test]
    fn test_log_format_as_str() {
        for format in LogFormat::VALUES {
            assert_eq!(LogFormat::parse_str(format.as_str()), Some(*format));
        }
    }

    #[test]
    fn test_content_logging_from_str() {
        assert_eq!("none".parse::<ContentLogging>().unwrap(), ContentLogging::None);
        assert_eq!("TRUNCATE".parse::<ContentLogging>().unwrap(), ContentLogging::Truncate);
        assert_eq!("full".parse::<ContentLogging>().unwrap(), ContentLogging::Full);
        assert!("partial".parse::<ContentLogging>().is_err());
        assert_eq!(ContentLogging::Full.as_str(), "full");
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(config.privacy.log_content, ContentLogging::Truncate);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_level("debug")
            .with_format(LogFormat::Json)
            .with_file_logging(FileLoggingConfig { enabled: true, level: "trace".to_string() })
            .with_privacy(PrivacyConfig { log_content: ContentLogging::Full, truncate_length: 10 });

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file.unwrap().level, "trace");
        assert_eq!(config.privacy.log_content, ContentLogging::Full);
    }

    #[test]
    fn test_logging_config_from_file_config() {
        let file_config = ConfigLoggingConfig {
            level: "info".to_string(),
            format: "compact".to_string(),
            file: FileLoggingConfig { enabled: false, level: "debug".to_string() },
            privacy: PrivacyLoggingConfig { log_content: "none".to_string(), truncate_length: 50 },
        };

        let config = LoggingConfig::from(file_config);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file.is_none());
        assert_eq!(config.privacy.log_content, ContentLogging::None);
        assert_eq!(config.privacy.truncate_length, 50);
    }

    #[test]
    fn test_logging_config_from_file_config_bad_values_fall_back() {
        let file_config = ConfigLoggingConfig {
            format: "xml".to_string(),
            file: FileLoggingConfig { enabled: true, level: "debug".to_string() },
            privacy: PrivacyLoggingConfig { log_content: "sometimes".to_string(), truncate_length: 5 },
            ..Default::default()
        };

        let config = LoggingConfig::from(file_config);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_some());
        assert_eq!(config.privacy.log_content, ContentLogging::Truncate);
    }

    #[test]
    fn test_redact_content_none() {
        let privacy = PrivacyConfig { log_content: ContentLogging::None, truncate_length: 100 };
        assert_eq!(redact_content("list my repos", &privacy), "[REDACTED]");
    }

    #[test]
    fn test_redact_content_truncate() {
        let privacy = PrivacyConfig { log_content: ContentLogging::Truncate, truncate_length: 10 };

        assert_eq!(redact_content("short", &privacy), "short");

        let redacted = redact_content("abcdefghijklmnopqrstuvwxyz", &privacy);
        assert!(redacted.starts_with("abcdefghij..."));
        assert!(redacted.contains("26 total chars"));
    }

    #[test]
    fn test_redact_content_truncate_multibyte() {
        let privacy = PrivacyConfig { log_content: ContentLogging::Truncate, truncate_length: 2 };
        let redacted = redact_content("héllo", &privacy);
        assert!(redacted.starts_with("hé..."));
        assert!(redacted.contains("5 total chars"));
    }

    #[test]
    fn test_redact_content_full() {
        let privacy = PrivacyConfig { log_content: ContentLogging::Full, truncate_length: 1 };
        let long_content = "a".repeat(200);
        assert_eq!(redact_content(&long_content, &privacy), long_content);
    }

    #[test]
    fn test_install_with_file_logging() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig::new()
            .with_format(LogFormat::Compact)
            .with_file_logging(FileLoggingConfig { enabled: true, level: "debug".to_string() });

        match install(&config, Some(log_dir.clone())) {
            Ok(guard) => assert!(guard.is_some()),
            Err(e) => assert!(e.to_string().contains("already initialized")),
        }
        assert!(log_dir.is_dir());

        // A second global subscriber is refused rather than panicking.
        let err = install(&config, Some(log_dir)).unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[test]
    fn test_sanitize_path() {
        let abs_path = PathBuf::from("/var/log/behave.log");
        assert_eq!(sanitize_path(&abs_path), "/var/log/behave.log");

        if let Ok(home) = env::var("HOME") {
            let test_path = PathBuf::from(home).join("behave.toml");
            assert_eq!(sanitize_path(&test_path), "~/behave.toml");
        }
    }
}
