//! Logging and observability
//!
//! Structured logging built on `tracing`, with console output on stderr,
//! optional rotating JSON files, and `RUST_LOG` support.
//!
//! # Example
//!
//! ```no_run
//! use optimed::logging::init_logging;
//! use optimed::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = "example", "Fetching patient");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log an outbound request made by an adapter
///
/// # Example
///
/// ```no_run
/// use optimed::log_adapter_request;
///
/// log_adapter_request!("fhir", "GET", "https://hapi.fhir.org/baseR4/Patient/example");
/// ```
#[macro_export]
macro_rules! log_adapter_request {
    ($adapter:expr, $method:expr, $url:expr) => {
        tracing::debug!(
            adapter = $adapter,
            method = $method,
            url = %$url,
            "Sending request"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use optimed::log_error_with_context;
/// use optimed::domain::OptimedError;
///
/// let error = OptimedError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_expand_without_subscriber() {
        let error = crate::domain::OptimedError::Other("boom".to_string());
        crate::log_error_with_context!(&error, "unit test");
        crate::log_adapter_request!("fhir", "GET", "http://localhost/Patient/1");
    }
}
