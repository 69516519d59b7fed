//! FHIR R4 adapter implementation
//!
//! This module provides the [`crate::core::ports::FhirRepository`]
//! implementation for FHIR R4 servers and the wire models it decodes.

pub mod client;
pub mod models;

pub use client::HapiFhirRepository;
pub use models::{loinc_label, UNKNOWN_CARE_UNIT};
