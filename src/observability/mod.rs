//! Observability: structured logging setup and metrics collection.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use integrations_remote_tool::observability::{
//!     InMemoryMetricsCollector, LogFormat, LogLevel, LoggingConfig, MetricsCollector,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! LoggingConfig::new()
//!     .with_level(LogLevel::Info)
//!     .with_format(LogFormat::Json)
//!     .init()?;
//!
//! let metrics = InMemoryMetricsCollector::new();
//! metrics.increment_counter("remote_tool.attempts.total", 1, &[("dependency", "calculator")]);
//! # Ok(())
//! # }
//! ```

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
