//! Port interfaces
//!
//! This module defines the capability contracts that orchestration code
//! depends on. Each port is an `async_trait` trait with `Send + Sync` bounds
//! so implementations can be shared behind `Arc<dyn ...>`. Concrete
//! implementations live in [`crate::adapters`].

use crate::domain::{ChatMessage, DiagnosisResult, KpiEvent, PatientContext, PatientId, Result};
use async_trait::async_trait;
use std::collections::HashMap;

/// Metadata attached to a stored vector, also used as a search filter
pub type VectorMetadata = HashMap<String, String>;

/// Read access to patient records on a FHIR server
///
/// # Example
///
/// ```no_run
/// use optimed::adapters::fhir::HapiFhirRepository;
/// use optimed::config::FhirConfig;
/// use optimed::core::ports::FhirRepository;
/// use optimed::domain::PatientId;
///
/// # async fn example() -> optimed::domain::Result<()> {
/// let repo = HapiFhirRepository::new(FhirConfig::default())?;
/// let patient = repo.get_patient(&PatientId::new("example").unwrap()).await?;
/// println!("{} ({})", patient.name(), patient.age());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait FhirRepository: Send + Sync {
    /// Fetch one patient together with recent vitals and labs
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::FhirError::NotFound`] when the patient does
    /// not exist, or a transport error kind when the server is unreachable.
    async fn get_patient(&self, id: &PatientId) -> Result<PatientContext>;

    /// Search patients by name
    ///
    /// Results carry demographics only; vitals and labs are left empty.
    async fn search_patients(&self, query: &str) -> Result<Vec<PatientContext>>;
}

/// Destination for KPI measurements
#[async_trait]
pub trait KpiEventSink: Send + Sync {
    /// Buffer one measurement
    async fn record(&self, event: KpiEvent) -> Result<()>;

    /// Make every buffered measurement durable or visible
    async fn flush(&self) -> Result<()>;
}

/// Chat-completion language model
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a transcript and return the assistant's reply
    ///
    /// A leading [`crate::domain::ChatRole::System`] message is treated as
    /// the instruction prefix; the remaining messages are conversation turns.
    /// The returned message has role `Assistant`.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: Option<u32>,
    ) -> Result<ChatMessage>;
}

/// Store of embedding vectors searchable by similarity
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace the vector stored under `id`
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: Option<VectorMetadata>,
    ) -> Result<()>;

    /// Return up to `top_k` `(id, score)` pairs by decreasing similarity
    ///
    /// When `filter` is given, only entries whose metadata contains every
    /// filter key with an equal value are considered.
    async fn similarity_search(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&VectorMetadata>,
    ) -> Result<Vec<(String, f32)>>;
}

/// Produces a diagnosis suggestion for a patient
#[async_trait]
pub trait DiagnosticEngine: Send + Sync {
    async fn run(&self, patient: &PatientContext) -> Result<DiagnosisResult>;
}
