//! Domain error types
//!
//! This module defines the error hierarchy for OptiMed. Adapter errors are
//! translated into a small set of caller-meaningful kinds and never expose
//! third-party HTTP client types.

use thiserror::Error;

/// Main OptiMed error type
///
/// This is the primary error type used throughout the crate. Value-object
/// construction failures surface as [`OptimedError::Validation`]; port
/// failures surface through the wrapped adapter error enums.
#[derive(Debug, Error)]
pub enum OptimedError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value object was rejected at its construction boundary
    #[error("Validation error: {0}")]
    Validation(String),

    /// FHIR repository errors
    #[error("FHIR error: {0}")]
    Fhir(#[from] FhirError),

    /// Language model errors
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Vector store errors
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl OptimedError {
    /// Returns true if the error means the requested resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, OptimedError::Fhir(FhirError::NotFound(_)))
    }
}

/// FHIR-specific errors
///
/// Errors that occur when talking to a FHIR R4 server.
#[derive(Debug, Error)]
pub enum FhirError {
    /// Failed to connect to the FHIR server
    #[error("Failed to connect to FHIR server: {0}")]
    ConnectionFailed(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid or unexpected response payload
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx other than 404)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Language model errors
///
/// Errors that occur when calling a chat-completion API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to the API
    #[error("Failed to connect to LLM API: {0}")]
    ConnectionFailed(String),

    /// API key missing or rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The transcript cannot be sent as-is
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or unexpected response payload
    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after: {0}")]
    RateLimitExceeded(String),

    /// Server error (5xx, including overload)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for OptimedError {
    fn from(err: std::io::Error) -> Self {
        OptimedError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for OptimedError {
    fn from(err: serde_json::Error) -> Self {
        OptimedError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for OptimedError {
    fn from(err: toml::de::Error) -> Self {
        OptimedError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimed_error_display() {
        let err = OptimedError::Validation("confidence out of range".to_string());
        assert_eq!(err.to_string(), "Validation error: confidence out of range");
    }

    #[test]
    fn test_fhir_error_conversion() {
        let err: OptimedError = FhirError::NotFound("Patient/123".to_string()).into();
        assert!(matches!(err, OptimedError::Fhir(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: OptimedError = LlmError::RateLimitExceeded("30".to_string()).into();
        assert!(matches!(err, OptimedError::Llm(_)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_server_error_display() {
        let err = FhirError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "Server error: 503 - unavailable");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: OptimedError = json_err.into();
        assert!(matches!(err, OptimedError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: OptimedError = toml_err.into();
        assert!(matches!(err, OptimedError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: OptimedError = io_err.into();
        assert!(matches!(err, OptimedError::Io(_)));
    }
}
