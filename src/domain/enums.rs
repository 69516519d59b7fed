//! Closed vocabularies shared across the domain layer
//!
//! All enums serialize as SCREAMING_SNAKE_CASE strings (`"IN_PROGRESS"`,
//! `"LAB_CRIT"`), which is also their `Display` form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Occupancy status of a bed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BedStatus {
    /// Free and ready for a patient
    Vacant,
    /// Assigned to an encounter
    Occupied,
    /// Being cleaned between patients
    Cleaning,
}

/// Status of a hospital encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncounterStatus {
    InProgress,
    Discharged,
}

/// Kind of clinical or operational event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Admission,
    Discharge,
    Transfer,

    // Vitals
    VitalReading,
    VitalAlert,

    // Labs
    LabResult,
    LabCrit,

    // Imaging
    RadReady,
    RadCrit,

    // Medication & orders
    MedOrder,
    MedInteraction,

    // Patient movement / logistics
    PatientMove,
    BedStateChange,

    // System capacity
    SysBacklog,
    SysCritBacklog,

    // Documentation / NLP watch
    NoteNew,
    NoteSepsisKeyword,
}

/// Delivery channel of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Teams,
    Email,
    Ascom,
    Sms,
    InApp,
}

/// Delivery status of a notification
///
/// `Timeout` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationStatus {
    Delivered,
    Ack,
    Timeout,
}

/// Alert severity
///
/// Variants are declared in ascending order, so the derived `Ord` gives
/// `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Next rung on the escalation ladder; `Critical` maps to itself
    pub fn next(self) -> Self {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High => Severity::Critical,
            Severity::Critical => Severity::Critical,
        }
    }

    /// Returns true for the absorbing top of the ladder
    pub fn is_max(self) -> bool {
        self == Severity::Critical
    }
}

/// Author role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

// Display mirrors the serde representation so log fields and JSON agree.
macro_rules! display_via_serde {
    ($($ty:ty),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    match serde_json::to_value(self) {
                        Ok(serde_json::Value::String(s)) => f.write_str(&s),
                        _ => write!(f, "{self:?}"),
                    }
                }
            }
        )*
    };
}

display_via_serde!(
    BedStatus,
    EncounterStatus,
    EventType,
    Channel,
    NotificationStatus,
    Severity,
    ChatRole,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_severity_ladder() {
        assert_eq!(Severity::Low.next(), Severity::Medium);
        assert_eq!(Severity::Medium.next(), Severity::High);
        assert_eq!(Severity::High.next(), Severity::Critical);
        assert_eq!(Severity::Critical.next(), Severity::Critical);
        assert!(Severity::Critical.is_max());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&EncounterStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
        assert_eq!(
            serde_json::to_string(&EventType::NoteSepsisKeyword).unwrap(),
            "\"NOTE_SEPSIS_KEYWORD\""
        );
        assert_eq!(serde_json::to_string(&Channel::InApp).unwrap(), "\"IN_APP\"");

        let parsed: EventType = serde_json::from_str("\"LAB_CRIT\"").unwrap();
        assert_eq!(parsed, EventType::LabCrit);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(BedStatus::Cleaning.to_string(), "CLEANING");
        assert_eq!(NotificationStatus::Ack.to_string(), "ACK");
        assert_eq!(ChatRole::Assistant.to_string(), "ASSISTANT");
        assert_eq!(EventType::SysCritBacklog.to_string(), "SYS_CRIT_BACKLOG");
    }

    #[test]
    fn test_unknown_variant_rejected() {
        assert!(serde_json::from_str::<Severity>("\"URGENT\"").is_err());
    }
}
