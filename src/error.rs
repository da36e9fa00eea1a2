//! Custom error types for the thermo-dashboard application.
//!
//! This module defines domain-specific error types using thiserror,
//! providing clear error messages and proper error context propagation.

use thiserror::Error;

/// Errors raised while decoding a reading payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("JSON decode error: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Payload is not a JSON object")]
    InvalidPayload,

    #[error("Invalid value for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

/// Errors related to MQTT operations
#[derive(Debug, Error)]
pub enum MqttError {
    #[error("MQTT connection failed: {0}")]
    ConnectionError(String),

    #[error("MQTT subscription failed: {0}")]
    SubscriptionError(String),

    #[error("MQTT disconnection failed: {0}")]
    DisconnectionError(String),
}

/// Errors related to application configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Errors related to the UI
#[derive(Debug, Error)]
pub enum UiError {
    #[error("Terminal initialization failed: {0}")]
    InitializationError(String),

    #[error("Terminal rendering failed: {0}")]
    RenderError(String),

    #[error("Input handling failed: {0}")]
    InputError(String),
}

/// Errors related to service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service initialization failed: {0}")]
    InitializationError(String),

    #[error("Service runtime error: {0}")]
    RuntimeError(String),

    #[error("Signal handling error: {0}")]
    SignalError(String),
}

/// Application-level errors that can wrap other error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("MQTT error: {0}")]
    Mqtt(#[from] MqttError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Convenience type alias for Results using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_wraps_into_app_error() {
        let err: AppError = ConfigError::InvalidValue {
            field: "mqtt.port".to_string(),
            message: "must be greater than 0".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for mqtt.port: must be greater than 0"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = PayloadError::MissingField("temp");
        assert_eq!(err.to_string(), "Missing required field: temp");
    }
}
