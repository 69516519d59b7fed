//! Validated construction boundary
//!
//! Builders call [`Validate::validate`] before handing out a value, and
//! [`from_json`] does the same for deserialized values, so a malformed
//! record is rejected wherever it enters the system.

use super::errors::OptimedError;
use super::result::Result;
use serde::de::DeserializeOwned;

/// Invariant check for a domain value object
pub trait Validate {
    /// Returns an error describing the first violated invariant
    fn validate(&self) -> Result<()>;
}

/// Deserializes a value object from JSON and checks its invariants
///
/// # Examples
///
/// ```
/// use optimed::domain::{from_json, KpiEvent};
///
/// let event: KpiEvent = from_json(
///     r#"{"metric":"AAT","value":82.0,"unit":"s","recorded_at":"2025-01-01T00:00:00Z","metric_source":null}"#,
/// ).unwrap();
/// assert_eq!(event.metric(), "AAT");
/// ```
pub fn from_json<T>(json: &str) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(json)?;
    value.validate()?;
    Ok(value)
}

/// Fails with a validation error naming `field` when `value` is blank
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OptimedError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Wraps a builder's missing-field message as a validation error
pub(crate) fn missing(field: &str) -> OptimedError {
    OptimedError::Validation(format!("{field} is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("metric", "AAT").is_ok());

        let err = require_non_blank("metric", "  ").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: metric cannot be empty");
    }

    #[test]
    fn test_missing_message() {
        assert_eq!(
            missing("alert_id").to_string(),
            "Validation error: alert_id is required"
        );
    }
}
