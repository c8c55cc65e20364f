//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Design Principles
//!
//! - Single unified error type (OrgLensError) for the entire application
//! - Configuration problems are rejected before any computation runs
//! - Per-event data problems are never fatal: malformed events are skipped
//!   and tallied in the analysis result, not raised here
//! - No panic/unwrap - all errors are recoverable

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrgLensError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    /// Configuration invalid. Raised by `AnalyticsConfig::validate` before
    /// any analyzer runs, so a bad threshold can never produce silently
    /// wrong aggregates.
    #[error("Config error: {0}")]
    Config(String),

    /// Input file could not be loaded or did not match the expected shape.
    #[error("Load error in {path}: {message}")]
    Load { path: String, message: String },

    /// Lookup of an employee the caller named explicitly (e.g. `individual
    /// --email`). Unknown references inside event data are treated as
    /// external attendees instead.
    #[error("Unknown employee: {0}")]
    UnknownEmployee(String),

    #[error("Report error: {0}")]
    Report(String),
}

impl OrgLensError {
    /// Create a load error with path context
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, OrgLensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = OrgLensError::load("hris.json", "missing field `email`");
        assert_eq!(
            err.to_string(),
            "Load error in hris.json: missing field `email`"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = OrgLensError::config("duration buckets must be monotonic");
        assert_eq!(
            err.to_string(),
            "Config error: duration buckets must be monotonic"
        );
    }
}
