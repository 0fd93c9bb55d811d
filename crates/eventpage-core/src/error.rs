//! Core error types for eventpage-core.
//!
//! This module defines the error hierarchy using thiserror. Each subsystem
//! has its own error enum; [`CoreError`] wraps them all for callers that
//! just want to propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for eventpage-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Countdown input errors
    #[error("Countdown error: {0}")]
    Countdown(#[from] CountdownError),

    /// Scroll-reveal errors
    #[error("Reveal error: {0}")]
    Reveal(#[from] RevealError),

    /// Event backend errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised while turning host input into a countdown target.
#[derive(Error, Debug)]
pub enum CountdownError {
    /// The end-time string is not a recognizable ISO-8601 instant.
    #[error("Invalid end time '{input}': {message}")]
    InvalidEndTime { input: String, message: String },
}

/// Scroll-reveal observer errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    /// The host has no visibility-intersection facility.
    #[error("Visibility-intersection observation is not supported by this environment")]
    EnvironmentUnsupported,

    /// Threshold or root margin could not be used.
    #[error("Invalid reveal option '{field}': {message}")]
    InvalidOptions { field: String, message: String },
}

/// Event backend errors.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The configured base URL cannot be parsed or joined.
    #[error("Invalid API base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// Transport failure, timeout, or body decoding failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// `/event` returned an empty list
    #[error("Backend returned no event")]
    NoEvent,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Key does not name a configuration field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<RevealError> for ConfigError {
    fn from(err: RevealError) -> Self {
        match err {
            RevealError::InvalidOptions { field, message } => ConfigError::InvalidValue {
                key: format!("reveal.{field}"),
                message,
            },
            other => ConfigError::InvalidValue {
                key: "reveal".into(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_option_error_maps_to_config_key() {
        let err: ConfigError = RevealError::InvalidOptions {
            field: "threshold".into(),
            message: "must be within [0, 1]".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'reveal.threshold': must be within [0, 1]"
        );
    }

    #[test]
    fn core_error_wraps_countdown_error() {
        let err: CoreError = CountdownError::InvalidEndTime {
            input: "soon".into(),
            message: "bad".into(),
        }
        .into();
        assert!(err.to_string().starts_with("Countdown error: Invalid end time 'soon'"));
    }

    #[test]
    fn custom_error_displays_message_verbatim() {
        let err = CoreError::Custom("entries require --agree-privacy".into());
        assert_eq!(err.to_string(), "entries require --agree-privacy");
    }
}
