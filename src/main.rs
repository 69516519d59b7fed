// OptiMed - Hospital Operations Prototype
// Copyright (c) 2025 OptiMed Contributors
// Licensed under the MIT License

use clap::Parser;
use optimed::cli::{Cli, Commands, EXIT_CONFIG, EXIT_FATAL};
use optimed::config::{load_config_or_default, LoggingConfig, OptimedConfig};
use optimed::domain::Result;
use optimed::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // The file may be missing or invalid; commands that need it report that.
    let loaded = load_config_or_default(&cli.config);

    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_CONFIG);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "OptiMed - Hospital Operations Prototype"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors, so flush file logs first.
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, loaded: Result<OptimedConfig>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
        Commands::Patient(args) => match require_config(loaded, &cli.config) {
            Ok(config) => args.execute(&config).await,
            Err(code) => Ok(code),
        },
        Commands::Chat(args) => match require_config(loaded, &cli.config) {
            Ok(config) => args.execute(&config).await,
            Err(code) => Ok(code),
        },
        Commands::Diagnose(args) => match require_config(loaded, &cli.config) {
            Ok(config) => args.execute(&config).await,
            Err(code) => Ok(code),
        },
    }
}

/// Returns the loaded configuration, or reports the load error and its exit code
fn require_config(
    loaded: Result<OptimedConfig>,
    path: &str,
) -> std::result::Result<OptimedConfig, i32> {
    loaded.map_err(|e| {
        eprintln!("❌ Failed to load configuration from {path}");
        eprintln!("   Error: {e}");
        EXIT_CONFIG
    })
}
