//! Event routing policy
//!
//! Maps an [`EventType`] to the ordered list of recipients who should be
//! notified. The policy is always supplied by the caller, typically from the
//! `[routing]` configuration section.

use super::enums::EventType;
use super::errors::OptimedError;
use super::result::Result;
use super::validate::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered recipients per event type
///
/// # Examples
///
/// ```
/// use optimed::domain::{EventType, RoutingPolicy};
///
/// let policy = RoutingPolicy::new().route(EventType::LabCrit, ["RN1", "MD1"]);
/// assert_eq!(policy.targets_for(EventType::LabCrit), ["RN1", "MD1"]);
/// assert!(policy.targets_for(EventType::Admission).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingPolicy(BTreeMap<EventType, Vec<String>>);

impl RoutingPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers recipients for an event type, replacing any earlier entry
    pub fn route<I, S>(mut self, event_type: EventType, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(event_type, recipients.into_iter().map(Into::into).collect());
        self
    }

    /// Recipients for `event_type` in registration order, empty when unrouted
    pub fn targets_for(&self, event_type: EventType) -> &[String] {
        self.0.get(&event_type).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EventType, &Vec<String>)> {
        self.0.iter()
    }
}

impl FromIterator<(EventType, Vec<String>)> for RoutingPolicy {
    fn from_iter<T: IntoIterator<Item = (EventType, Vec<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Validate for RoutingPolicy {
    fn validate(&self) -> Result<()> {
        for (event_type, recipients) in &self.0 {
            if recipients.iter().any(|r| r.trim().is_empty()) {
                return Err(OptimedError::Validation(format!(
                    "routing for {event_type} contains an empty recipient"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_preserves_order() {
        let policy = RoutingPolicy::new().route(EventType::RadCrit, ["MD2", "RN4", "MD1"]);
        assert_eq!(policy.targets_for(EventType::RadCrit), ["MD2", "RN4", "MD1"]);
    }

    #[test]
    fn test_route_replaces_entry() {
        let policy = RoutingPolicy::new()
            .route(EventType::LabCrit, ["RN1"])
            .route(EventType::LabCrit, ["MD1"]);
        assert_eq!(policy.targets_for(EventType::LabCrit), ["MD1"]);
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_deserialize_from_toml_table() {
        let policy: RoutingPolicy = toml::from_str(
            r#"
            LAB_CRIT = ["RN1", "MD1"]
            SYS_BACKLOG = ["OPS"]
            "#,
        )
        .unwrap();
        assert_eq!(policy.targets_for(EventType::LabCrit), ["RN1", "MD1"]);
        assert_eq!(policy.targets_for(EventType::SysBacklog), ["OPS"]);
    }

    #[test]
    fn test_unknown_event_type_rejected() {
        let result = toml::from_str::<RoutingPolicy>(r#"LAB_PANIC = ["RN1"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_recipient_invalid() {
        let policy = RoutingPolicy::new().route(EventType::LabCrit, ["RN1", " "]);
        assert!(policy.validate().is_err());
    }
}
