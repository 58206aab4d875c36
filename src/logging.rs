//! Structured Logging
//!
//! JSON output for log aggregation in production, pretty output for
//! development, plus a helper for security-relevant auth events.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Initialize the logging system.
///
/// `RUST_LOG` overrides the level when set; otherwise the given level applies
/// to the application, tower-http and axum targets.
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "merchstore={level},tower_http={level},axum={level}",
            level = level.as_str()
        ))
    });

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    Ok(())
}

/// Log a security-related event (auth success/failure, provisioning).
pub fn log_security_event(event_type: &str, success: bool, details: serde_json::Value) {
    if success {
        tracing::info!(
            target: "merchstore::security",
            event = event_type,
            success,
            details = %details,
            "security event"
        );
    } else {
        tracing::warn!(
            target: "merchstore::security",
            event = event_type,
            success,
            details = %details,
            "security event"
        );
    }
}
