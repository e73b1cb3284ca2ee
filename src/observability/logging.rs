//! Logging configuration and utilities.
//!
//! Structured logging through `tracing`, with a `tracing-subscriber` setup
//! that honours `RUST_LOG` on top of the configured level.

use crate::errors::{RemoteToolError, RemoteToolResult};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The minimum log level to capture
    pub level: LogLevel,
    /// The output format for log messages
    pub format: LogFormat,
    /// Whether to include timestamps in log output
    pub include_timestamps: bool,
    /// Whether to include the module target in log output
    pub include_target: bool,
    /// Whether to include file and line number in log output
    pub include_file_line: bool,
}

/// Log level enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose)
    Trace,
    /// Debug-level logging
    Debug,
    /// Info-level logging
    Info,
    /// Warning-level logging
    Warn,
    /// Error-level logging (least verbose)
    Error,
}

impl LogLevel {
    /// Parse a level name such as `"debug"` or `"WARN"`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<LogLevel> for tracing::level_filters::LevelFilter {
    fn from(level: LogLevel) -> Self {
        tracing::level_filters::LevelFilter::from_level(level.into())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (for development)
    Pretty,
    /// JSON format (for structured logging in production)
    Json,
    /// Compact format (for space-constrained environments)
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            include_timestamps: true,
            include_target: true,
            include_file_line: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a new logging configuration with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use integrations_remote_tool::observability::{LoggingConfig, LogLevel, LogFormat};
    ///
    /// let config = LoggingConfig::new();
    /// assert_eq!(config.level, LogLevel::Info);
    /// assert_eq!(config.format, LogFormat::Pretty);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include timestamps.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    /// Sets whether to include the module target.
    pub fn with_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    /// Sets whether to include file and line number.
    pub fn with_file_line(mut self, include: bool) -> Self {
        self.include_file_line = include;
        self
    }

    /// Initialize the global subscriber with this configuration.
    ///
    /// Call once at application startup.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a global subscriber is already set.
    pub fn init(self) -> RemoteToolResult<()> {
        let filter = EnvFilter::from_default_env()
            .add_directive(tracing::level_filters::LevelFilter::from(self.level).into());
        let layer = fmt::layer()
            .with_target(self.include_target)
            .with_file(self.include_file_line)
            .with_line_number(self.include_file_line);

        let result = match (self.format, self.include_timestamps) {
            (LogFormat::Pretty, true) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(true))
                .try_init(),
            (LogFormat::Pretty, false) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(true).without_time())
                .try_init(),
            (LogFormat::Json, _) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .try_init(),
            (LogFormat::Compact, true) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact())
                .try_init(),
            (LogFormat::Compact, false) => tracing_subscriber::registry()
                .with(filter)
                .with(layer.compact().without_time())
                .try_init(),
        };

        result.map_err(|e| RemoteToolError::Configuration {
            message: format!("Failed to initialize logging: {}", e),
        })
    }
}

/// Log one outgoing attempt against a dependency.
///
/// # Examples
///
/// ```
/// use integrations_remote_tool::observability::log_attempt;
///
/// log_attempt("calculator", "calculate", 1);
/// ```
pub fn log_attempt(service_id: &str, operation: &str, attempt: u32) {
    tracing::debug!(
        dependency = service_id,
        operation = operation,
        attempt = attempt,
        "Invoking remote operation"
    );
}

/// Log the response of an attempt.
///
/// Bodies longer than 1000 bytes are cut at the nearest character boundary.
pub fn log_response(service_id: &str, status: u16, duration_ms: u64, body: Option<&str>) {
    tracing::debug!(
        dependency = service_id,
        status = status,
        duration_ms = duration_ms,
        body = body.map(|b| truncate_at_boundary(b, 1000)).unwrap_or("<empty>"),
        "Remote response"
    );
}

fn truncate_at_boundary(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
