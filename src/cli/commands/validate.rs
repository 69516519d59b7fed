//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the OptiMed configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config, OptimedConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Loading already validates, so any load failure is reported as a
    /// configuration error.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                for line in Self::summary(&config) {
                    println!("{line}");
                }
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG)
            }
        }
    }

    /// Human-readable summary; never includes the API key
    pub fn summary(config: &OptimedConfig) -> Vec<String> {
        let mut lines = vec![
            "Configuration Summary:".to_string(),
            format!("  Log Level: {}", config.application.log_level),
            format!("  FHIR Server: {}", config.fhir.base_url),
            format!("  FHIR Timeout: {}s", config.fhir.timeout_seconds),
            format!("  Anthropic API: {}", config.anthropic.base_url),
            format!("  Model: {}", config.anthropic.model),
            format!(
                "  API Key: {}",
                if config.anthropic.resolve_api_key().is_some() {
                    "set"
                } else {
                    "missing"
                }
            ),
            format!("  File Logging: {}", config.logging.local_enabled),
        ];

        for (event_type, recipients) in config.routing.iter() {
            lines.push(format!("  Route {event_type}: {}", recipients.join(", ")));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventType, RoutingPolicy};

    #[test]
    fn test_summary_lists_routes() {
        let config = OptimedConfig {
            routing: RoutingPolicy::new().route(EventType::LabCrit, ["RN1", "MD1"]),
            ..Default::default()
        };
        let lines = ValidateArgs::summary(&config);
        assert!(lines.iter().any(|l| l == "  Route LAB_CRIT: RN1, MD1"));
        assert!(lines.iter().any(|l| l.starts_with("  FHIR Server: ")));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let code = ValidateArgs {}
            .execute("/nonexistent/optimed.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
