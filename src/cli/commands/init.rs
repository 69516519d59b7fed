//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "optimed.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing OptiMed configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put ANTHROPIC_API_KEY in your environment or a .env file");
                println!("  3. Validate configuration: optimed validate-config");
                println!("  4. Try it: optimed patient get example");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Sample configuration with every section and its defaults
    pub fn sample_config() -> &'static str {
        r#"# OptiMed Configuration File
#
# Values of the form ${VAR} are replaced from the environment when loaded.
# Any OPTIMED_<SECTION>_<KEY> environment variable overrides the file.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# FHIR R4 Server
# ============================================================================
[fhir]
# FHIR_BASE_URL in the environment is used when this line is removed
base_url = "https://hapi.fhir.org/baseR4"
timeout_seconds = 10
user_agent = "OptiMedPrototype/0.1"

# Observations fetched per category (1-100)
observation_count = 10

# Patients returned per search (1-100)
search_count = 10

# ============================================================================
# Anthropic Messages API
# ============================================================================
[anthropic]
base_url = "https://api.anthropic.com"
# Falls back to ANTHROPIC_API_KEY when unset
# api_key = "${ANTHROPIC_API_KEY}"
model = "claude-3-5-sonnet-20241022"
api_version = "2023-06-01"
max_tokens = 4096
timeout_seconds = 60

# ============================================================================
# Event Routing
# ============================================================================
# Event type -> ordered recipients
[routing]
LAB_CRIT = ["RN1", "MD1"]

# ============================================================================
# Logging
# ============================================================================
[logging]
# Enable JSON file logging in addition to the console
local_enabled = false
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
    }
}
