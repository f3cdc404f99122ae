//! Structured logging for the TCP/IPv6 client test driver
//!
//! Console diagnostics of a test run (connection state, payloads sent and
//! received, socket errors) go through a [`Logger`]. Entries carry the
//! session id shared by every logger a [`LoggerFactory`] creates, plus
//! optional structured fields. `--debug` switches rendering to JSON lines.

use crate::models::Config;
use crate::socket::SocketError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Every socket event and raw read
    Trace = 0,
    /// Connection attempts, timer bookkeeping, setup hints
    Debug = 1,
    /// Payloads sent and received, connection state
    Info = 2,
    /// Socket errors
    Warn = 3,
    /// Deadline expiry
    Error = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// ANSI color code for console output
    fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// One structured log line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that wrote the entry (`DRIVER`, `SOCKET`)
    pub logger: String,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
}

/// Logger shared by the driver and the socket tasks it spawns
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    /// Send every level to stderr, keeping stdout for the report
    stderr_only: bool,
    format: LogFormat,
    name: String,
    session_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    /// Create an info-level console logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            stderr_only: false,
            format: LogFormat::Console,
            name,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a logger with specific configuration
    pub fn with_config(name: String, config: &Config) -> Self {
        let min_level = if config.debug {
            LogLevel::Trace
        } else if config.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        Self {
            min_level,
            use_color: config.enable_color,
            stderr_only: config.json_output,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Set session correlation ID
    pub async fn set_session_id(&self, session_id: String) {
        *self.session_id.write().await = Some(session_id);
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if let Some(session_id) = self.session_id.read().await.as_ref() {
            entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }

        let output = self.render(&entry);

        // Warnings and errors always go to stderr
        if self.stderr_only || entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => serde_json::to_string(entry)
                .unwrap_or_else(|_| format!("{{\"message\": {:?}}}", entry.message)),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S%.3f");
        let level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), entry.level.as_str(), RESET)
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        // Session id is noise on the console
        let mut fields: Vec<String> = entry.fields.iter()
            .filter(|(k, _)| k.as_str() != "session_id")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !fields.is_empty() {
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: HashMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Attach the error name, message and whether it triggers a reconnect
    pub fn socket_error(self, error: &SocketError) -> Self {
        self.field("error_name", error.name.as_str())
            .field("error_message", &error.message)
            .field("retryable", error.is_not_found())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    config: Config,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_config(name.to_string(), &self.config);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::SocketErrorName;

    fn sample_entry() -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "send data: 'hello'".to_string(),
            logger: "DRIVER".to_string(),
            fields: HashMap::from([
                ("count".to_string(), serde_json::json!(3)),
                ("session_id".to_string(), serde_json::json!("abc")),
            ]),
        }
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_debug_config_logs_json_to_stderr() {
        let config = Config {
            debug: true,
            enable_color: false,
            json_output: true,
            ..Default::default()
        };

        let logger = Logger::with_config("TEST".to_string(), &config);
        assert!(logger.would_log(LogLevel::Trace));
        assert_eq!(logger.format, LogFormat::Json);
        assert!(!logger.use_color);
        assert!(logger.stderr_only);
    }

    #[test]
    fn test_verbose_enables_debug() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        let logger = Logger::with_config("TEST".to_string(), &config);
        assert!(logger.would_log(LogLevel::Debug));
        assert!(!logger.would_log(LogLevel::Trace));
    }

    #[test]
    fn test_set_level() {
        let mut logger = Logger::new("TEST".to_string());
        assert!(logger.would_log(LogLevel::Info));

        logger.set_level(LogLevel::Warn);
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Error));
    }

    #[test]
    fn test_console_format_hides_session_id() {
        let config = Config {
            enable_color: false,
            ..Default::default()
        };
        let logger = Logger::with_config("DRIVER".to_string(), &config);

        let output = logger.render(&sample_entry());
        assert!(output.contains(" INFO [DRIVER] send data: 'hello'"));
        assert!(output.contains("count=3"));
        assert!(!output.contains("session_id"));
    }

    #[test]
    fn test_json_format_keeps_fields() {
        let config = Config {
            debug: true,
            ..Default::default()
        };
        let logger = Logger::with_config("DRIVER".to_string(), &config);

        let parsed: LogEntry = serde_json::from_str(&logger.render(&sample_entry())).unwrap();
        assert_eq!(parsed.level, LogLevel::Info);
        assert_eq!(parsed.fields["session_id"], serde_json::json!("abc"));
    }

    #[tokio::test]
    async fn test_factory_shares_session_id() {
        let factory = LoggerFactory::new(Config::default());
        let driver = factory.create_logger("DRIVER").await;
        let socket = factory.create_logger("SOCKET").await;

        let a = driver.session_id.read().await.clone();
        let b = socket.session_id.read().await.clone();
        assert_eq!(a.as_deref(), Some(factory.session_id()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_builder_with_socket_error() {
        let logger = Logger::new("TEST".to_string());
        let error = SocketError::new(SocketErrorName::NotFound, "connection refused");

        let builder = logger.warn("socket connection error").socket_error(&error);
        assert_eq!(builder.entry.fields["error_name"], serde_json::json!("NotFoundError"));
        assert_eq!(builder.entry.fields["retryable"], serde_json::json!(true));
    }
}
