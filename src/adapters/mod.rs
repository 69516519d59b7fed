//! External system integrations for OptiMed.
//!
//! Each adapter implements one or more ports from [`crate::core::ports`]:
//!
//! - [`fhir`] - FHIR R4 patient repository (HAPI or any R4 server)
//! - [`anthropic`] - Anthropic Claude chat client
//! - [`memory`] - In-process KPI sink and vector store
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. Vendor HTTP types never cross the
//! port boundary; failures are mapped to [`crate::domain::FhirError`] and
//! [`crate::domain::LlmError`].
//!
//! ```rust,no_run
//! use optimed::adapters::anthropic::AnthropicClient;
//! use optimed::adapters::fhir::HapiFhirRepository;
//! use optimed::config::OptimedConfig;
//! use optimed::core::diagnostic::LlmDiagnosticEngine;
//! use optimed::core::ports::{DiagnosticEngine, FhirRepository};
//! use optimed::domain::{OptimedError, PatientId};
//! use std::sync::Arc;
//!
//! # async fn example() -> optimed::domain::Result<()> {
//! let config = OptimedConfig::default();
//! let repo = HapiFhirRepository::new(config.fhir.clone())?;
//! let llm = Arc::new(AnthropicClient::new(config.anthropic.clone())?);
//!
//! let id = PatientId::new("example").map_err(OptimedError::Validation)?;
//! let patient = repo.get_patient(&id).await?;
//! let result = LlmDiagnosticEngine::new(llm).run(&patient).await?;
//! println!("{}", result.primary_code());
//! # Ok(())
//! # }
//! ```

pub mod anthropic;
pub mod fhir;
pub mod memory;
