// OptiMed - Hospital Operations Prototype
// Copyright (c) 2025 OptiMed Contributors
// Licensed under the MIT License

//! # OptiMed - Hospital Operations Prototype
//!
//! OptiMed models hospital operations as immutable value objects (patients,
//! beds, encounters, clinical events, notifications, KPIs, alerts) and wires
//! them to a FHIR R4 server and a large language model through thin adapters.
//!
//! ## Architecture
//!
//! OptiMed follows a layered architecture:
//!
//! - [`domain`] - Value objects, enumerations, identifiers and errors
//! - [`core`] - Port traits and the LLM diagnostic engine
//! - [`adapters`] - FHIR, Anthropic and in-memory port implementations
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//! - [`cli`] - Command-line interface and argument parsing
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use optimed::adapters::fhir::HapiFhirRepository;
//! use optimed::config::load_config_or_default;
//! use optimed::core::ports::FhirRepository;
//! use optimed::domain::PatientId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("optimed.toml")?;
//!     let repo = HapiFhirRepository::new(config.fhir)?;
//!
//!     let patient = repo.get_patient(&PatientId::new("example")?).await?;
//!     for msg in patient.critical_lab_msgs() {
//!         println!("{msg}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Value Objects
//!
//! Every transition returns a new value; the receiver never changes:
//!
//! ```rust
//! use optimed::domain::{Channel, EventId, Notification, NotificationStatus};
//!
//! # fn example() -> optimed::domain::Result<()> {
//! let delivered = Notification::builder()
//!     .notification_id("N1")
//!     .event_id(EventId::new("E1").map_err(optimed::domain::OptimedError::Validation)?)
//!     .recipient("RN1")
//!     .channel(Channel::Ascom)
//!     .build()?;
//!
//! let acked = delivered.acknowledge()?;
//! assert_eq!(delivered.status(), NotificationStatus::Delivered);
//! assert_eq!(acked.status(), NotificationStatus::Ack);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! OptiMed uses [`domain::OptimedError`] for all errors. Adapter failures are
//! reported as [`domain::FhirError`] or [`domain::LlmError`] kinds, never as
//! HTTP client types.
//!
//! ## Logging
//!
//! OptiMed uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(patient_id = "example", "Fetching patient");
//! warn!(status = 503, "FHIR request failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
