//! Domain models and types for OptiMed.
//!
//! This module contains the immutable value objects of the hospital
//! operations model and the rules that govern their transitions.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`], [`EncounterId`], [`EventId`])
//! - **Closed vocabularies** ([`BedStatus`], [`EventType`], [`Severity`], ...)
//! - **Value objects** ([`PatientContext`], [`Encounter`], [`Notification`],
//!   [`Alert`], [`ChatMessage`], [`DiagnosisResult`], ...)
//! - **Routing** ([`RoutingPolicy`])
//! - **Error types** ([`OptimedError`], [`FhirError`], [`LlmError`])
//! - **Result type alias** ([`Result`])
//!
//! # Immutability
//!
//! Fields are private. Every transition returns a new value and leaves the
//! receiver unchanged:
//!
//! ```rust
//! use optimed::domain::{Alert, Severity};
//!
//! # fn example() -> optimed::domain::Result<()> {
//! let alert = Alert::builder()
//!     .alert_id("A1")
//!     .message("ICU at capacity")
//!     .severity(Severity::High)
//!     .build()?;
//!
//! let critical = alert.escalate();
//! assert_eq!(alert.severity(), Severity::High);
//! assert_eq!(critical.severity(), Severity::Critical);
//! # Ok(())
//! # }
//! ```
//!
//! # Validation
//!
//! Builders and [`from_json`] both run [`Validate::validate`], so an invalid
//! value object cannot be obtained through the public API.

pub mod clinical;
pub mod diagnosis;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod info;
pub mod kpi;
pub mod result;
pub mod routing;
pub mod validate;

// Re-export commonly used types for convenience
pub use clinical::{
    BedState, BedStateBuilder, Encounter, EncounterBuilder, PatientContext,
    PatientContextBuilder,
};
pub use diagnosis::{DiagnosisResult, DiagnosisResultBuilder};
pub use enums::{
    BedStatus, Channel, ChatRole, EncounterStatus, EventType, NotificationStatus, Severity,
};
pub use errors::{FhirError, LlmError, OptimedError};
pub use ids::{EncounterId, EventId, PatientId};
pub use info::{
    ChatMessage, CommThread, CommThreadBuilder, InfoEvent, InfoEventBuilder, Notification,
    NotificationBuilder,
};
pub use kpi::{Alert, AlertBuilder, KpiEvent, KpiEventBuilder};
pub use result::Result;
pub use routing::RoutingPolicy;
pub use validate::{from_json, Validate};
