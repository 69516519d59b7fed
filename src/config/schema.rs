//! Configuration schema types
//!
//! This module defines the configuration structure for OptiMed. Every section
//! has defaults, so an empty file (or no file at all) yields a working
//! configuration pointed at the public HAPI FHIR server.

use crate::config::SecretString;
use crate::domain::{RoutingPolicy, Validate};
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable consulted for the FHIR base URL default
pub const FHIR_BASE_URL_ENV: &str = "FHIR_BASE_URL";

/// Environment variable consulted when no Anthropic API key is configured
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Main OptiMed configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimedConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// FHIR server configuration
    #[serde(default)]
    pub fhir: FhirConfig,

    /// Anthropic Messages API configuration
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Recipients per event type
    #[serde(default)]
    pub routing: RoutingPolicy,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OptimedConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.fhir.validate()?;
        self.anthropic.validate()?;
        self.routing
            .validate()
            .map_err(|e| format!("routing: {e}"))?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// FHIR R4 server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhirConfig {
    /// Base URL of the FHIR server
    ///
    /// Defaults to `FHIR_BASE_URL` from the environment, else the public
    /// HAPI R4 server.
    #[serde(default = "default_fhir_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_fhir_timeout_seconds")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Number of observations fetched per category
    #[serde(default = "default_page_count")]
    pub observation_count: u32,

    /// Maximum number of patients returned by a search
    #[serde(default = "default_page_count")]
    pub search_count: u32,
}

impl FhirConfig {
    fn validate(&self) -> Result<(), String> {
        validate_http_url("fhir.base_url", &self.base_url)?;

        if self.timeout_seconds == 0 {
            return Err("fhir.timeout_seconds must be > 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("fhir.user_agent cannot be empty".to_string());
        }

        validate_count("fhir.observation_count", self.observation_count)?;
        validate_count("fhir.search_count", self.search_count)?;
        Ok(())
    }
}

impl Default for FhirConfig {
    fn default() -> Self {
        Self {
            base_url: default_fhir_base_url(),
            timeout_seconds: default_fhir_timeout_seconds(),
            user_agent: default_user_agent(),
            observation_count: default_page_count(),
            search_count: default_page_count(),
        }
    }
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API base URL
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,

    /// API key (optional here, `ANTHROPIC_API_KEY` is used when absent)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Value of the `anthropic-version` header
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Default reply length cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_anthropic_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl AnthropicConfig {
    /// Configured API key, falling back to `ANTHROPIC_API_KEY`
    pub fn resolve_api_key(&self) -> Option<SecretString> {
        use secrecy::ExposeSecret;

        self.api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .or_else(|| {
                std::env::var(ANTHROPIC_API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.is_empty())
                    .map(crate::config::secret_string)
            })
    }

    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_http_url("anthropic.base_url", &self.base_url)?;

        if let Some(ref key) = self.api_key {
            if key.expose_secret().is_empty() {
                return Err("anthropic.api_key cannot be empty when set".to_string());
            }
        }

        if self.model.trim().is_empty() {
            return Err("anthropic.model cannot be empty".to_string());
        }

        if self.api_version.trim().is_empty() {
            return Err("anthropic.api_version cannot be empty".to_string());
        }

        if self.max_tokens == 0 {
            return Err("anthropic.max_tokens must be > 0".to_string());
        }

        if self.timeout_seconds == 0 {
            return Err("anthropic.timeout_seconds must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            api_key: None,
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_anthropic_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when file logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = Url::parse(value).map_err(|e| format!("{field} '{value}' is not a valid URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{field} must use http or https, got '{other}'")),
    }
}

fn validate_count(field: &str, value: u32) -> Result<(), String> {
    if !(1..=100).contains(&value) {
        return Err(format!("{field} must be between 1 and 100"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_fhir_base_url() -> String {
    std::env::var(FHIR_BASE_URL_ENV)
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| "https://hapi.fhir.org/baseR4".to_string())
}

fn default_fhir_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    "OptiMedPrototype/0.1".to_string()
}

fn default_page_count() -> u32 {
    10
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_anthropic_timeout_seconds() -> u64 {
    60
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
