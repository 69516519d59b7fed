//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::OptimedConfig;
use super::secret::secret_string;
use crate::domain::errors::OptimedError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OptimedConfig
/// 4. Applies environment variable overrides (OPTIMED_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`OptimedError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// fails.
///
/// # Examples
///
/// ```no_run
/// use optimed::config::loader::load_config;
///
/// let config = load_config("optimed.toml").expect("Failed to load config");
/// println!("FHIR server: {}", config.fhir.base_url);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OptimedConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OptimedError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        OptimedError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: OptimedConfig = toml::from_str(&contents)?;

    finish(config)
}

/// Loads configuration from `path`, or uses defaults when the file is absent
///
/// Environment overrides and validation apply either way, so the defaults
/// can be steered entirely through `OPTIMED_*` variables.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<OptimedConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(
        path = %path.display(),
        "Configuration file not found, using defaults"
    );
    finish(OptimedConfig::default())
}

fn finish(mut config: OptimedConfig) -> Result<OptimedConfig> {
    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        OptimedError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched, so a commented-out placeholder never
/// requires its variable.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| OptimedError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut missing_vars: Vec<String> = Vec::new();

    let lines: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }

            re.replace_all(line, |cap: &regex::Captures<'_>| {
                let var_name = &cap[1];
                match std::env::var(var_name) {
                    Ok(value) => value,
                    Err(_) => {
                        if !missing_vars.iter().any(|v| v == var_name) {
                            missing_vars.push(var_name.to_string());
                        }
                        cap[0].to_string()
                    }
                }
            })
            .into_owned()
        })
        .collect();

    if !missing_vars.is_empty() {
        return Err(OptimedError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Reads and parses an override variable, rejecting unparseable values
fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            OptimedError::Configuration(format!("Invalid value '{raw}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using OPTIMED_* prefix
///
/// Environment variables follow the pattern: OPTIMED_<SECTION>_<KEY>
/// For example: OPTIMED_FHIR_BASE_URL, OPTIMED_ANTHROPIC_MODEL
fn apply_env_overrides(config: &mut OptimedConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("OPTIMED_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // FHIR overrides
    if let Ok(val) = std::env::var("OPTIMED_FHIR_BASE_URL") {
        config.fhir.base_url = val;
    }
    if let Some(val) = env_parse("OPTIMED_FHIR_TIMEOUT_SECONDS")? {
        config.fhir.timeout_seconds = val;
    }
    if let Ok(val) = std::env::var("OPTIMED_FHIR_USER_AGENT") {
        config.fhir.user_agent = val;
    }
    if let Some(val) = env_parse("OPTIMED_FHIR_OBSERVATION_COUNT")? {
        config.fhir.observation_count = val;
    }
    if let Some(val) = env_parse("OPTIMED_FHIR_SEARCH_COUNT")? {
        config.fhir.search_count = val;
    }

    // Anthropic overrides
    if let Ok(val) = std::env::var("OPTIMED_ANTHROPIC_BASE_URL") {
        config.anthropic.base_url = val;
    }
    if let Ok(val) = std::env::var("OPTIMED_ANTHROPIC_API_KEY") {
        config.anthropic.api_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("OPTIMED_ANTHROPIC_MODEL") {
        config.anthropic.model = val;
    }
    if let Ok(val) = std::env::var("OPTIMED_ANTHROPIC_API_VERSION") {
        config.anthropic.api_version = val;
    }
    if let Some(val) = env_parse("OPTIMED_ANTHROPIC_MAX_TOKENS")? {
        config.anthropic.max_tokens = val;
    }
    if let Some(val) = env_parse("OPTIMED_ANTHROPIC_TIMEOUT_SECONDS")? {
        config.anthropic.timeout_seconds = val;
    }

    // Logging overrides
    if let Some(val) = env_parse("OPTIMED_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Ok(val) = std::env::var("OPTIMED_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("OPTIMED_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
