//! Configuration management for OptiMed.
//!
//! TOML-based configuration loading, parsing, and validation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use optimed::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("optimed.toml")?;
//!
//! println!("FHIR server: {}", config.fhir.base_url);
//! println!("Model: {}", config.anthropic.model);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`FhirConfig`] - FHIR server URL, timeout and page sizes
//! - [`AnthropicConfig`] - Anthropic Messages API settings
//! - [`crate::domain::RoutingPolicy`] - Recipients per event type (`[routing]`)
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [fhir]
//! base_url = "https://hapi.fhir.org/baseR4"
//!
//! [anthropic]
//! api_key = "${ANTHROPIC_API_KEY}"
//! model = "claude-3-5-sonnet-20241022"
//!
//! [routing]
//! LAB_CRIT = ["RN1", "MD1"]
//! ```
//!
//! # Environment Variables
//!
//! `${VAR_NAME}` placeholders are substituted before parsing, and any
//! setting can be overridden with `OPTIMED_<SECTION>_<KEY>`:
//!
//! ```bash
//! export ANTHROPIC_API_KEY="sk-ant-..."
//! export OPTIMED_FHIR_BASE_URL="http://localhost:8080/fhir"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{AnthropicConfig, ApplicationConfig, FhirConfig, LoggingConfig, OptimedConfig};
pub use secret::{secret_string, SecretString, SecretValue};
