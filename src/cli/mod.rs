//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for OptiMed using clap.

pub mod commands;

use crate::domain::{LlmError, OptimedError};
use clap::{Parser, Subcommand};

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for configuration and usage errors
pub const EXIT_CONFIG: i32 = 2;

/// Exit code when the requested resource does not exist
pub const EXIT_NOT_FOUND: i32 = 3;

/// Exit code for upstream service and connection failures
pub const EXIT_UPSTREAM: i32 = 4;

/// Exit code for anything else
pub const EXIT_FATAL: i32 = 5;

/// OptiMed - hospital operations prototype
#[derive(Parser, Debug)]
#[command(name = "optimed")]
#[command(version, about, long_about = None)]
#[command(author = "OptiMed Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "optimed.toml", env = "OPTIMED_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "OPTIMED_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch or search patients on the FHIR server
    Patient(commands::patient::PatientArgs),

    /// Send one prompt to the language model
    Chat(commands::chat::ChatArgs),

    /// Fetch a patient and run the LLM diagnostic engine
    Diagnose(commands::diagnose::DiagnoseArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

/// Maps a crate error to the process exit code reported for it
pub fn exit_code_for(err: &OptimedError) -> i32 {
    match err {
        OptimedError::Configuration(_) => EXIT_CONFIG,
        OptimedError::Llm(LlmError::AuthenticationFailed(_) | LlmError::InvalidRequest(_)) => {
            EXIT_CONFIG
        }
        e if e.is_not_found() => EXIT_NOT_FOUND,
        OptimedError::Fhir(_) | OptimedError::Llm(_) => EXIT_UPSTREAM,
        _ => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FhirError;

    #[test]
    fn test_cli_parse_patient_get() {
        let cli = Cli::parse_from(["optimed", "patient", "get", "example"]);
        assert_eq!(cli.config, "optimed.toml");
        assert!(matches!(cli.command, Commands::Patient(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["optimed", "--config", "custom.toml", "validate-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["optimed", "--log-level", "debug", "init"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_chat() {
        let cli = Cli::parse_from(["optimed", "chat", "hello", "--temperature", "0.3"]);
        assert!(matches!(cli.command, Commands::Chat(_)));
    }

    #[test]
    fn test_cli_parse_diagnose() {
        let cli = Cli::parse_from(["optimed", "diagnose", "example"]);
        assert!(matches!(cli.command, Commands::Diagnose(_)));
    }

    #[test]
    fn test_exit_codes() {
        let cases = [
            (OptimedError::Configuration("x".into()), EXIT_CONFIG),
            (FhirError::NotFound("Patient/1".into()).into(), EXIT_NOT_FOUND),
            (FhirError::Timeout("slow".into()).into(), EXIT_UPSTREAM),
            (LlmError::RateLimitExceeded("30".into()).into(), EXIT_UPSTREAM),
            (LlmError::AuthenticationFailed("no key".into()).into(), EXIT_CONFIG),
            (OptimedError::Validation("bad".into()), EXIT_FATAL),
        ];
        for (err, code) in cases {
            assert_eq!(exit_code_for(&err), code, "{err}");
        }
    }
}
