//! Core orchestration for OptiMed.
//!
//! # Modules
//!
//! - [`ports`] - Capability contracts (FHIR repository, LLM client, KPI sink,
//!   vector store, diagnostic engine)
//! - [`diagnostic`] - Diagnostic engine built on any LLM client
//!
//! Orchestration code depends only on the traits in [`ports`]; adapters are
//! chosen and wired together by the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use optimed::adapters::anthropic::AnthropicClient;
//! use optimed::adapters::fhir::HapiFhirRepository;
//! use optimed::config::load_config;
//! use optimed::core::diagnostic::LlmDiagnosticEngine;
//! use optimed::core::ports::{DiagnosticEngine, FhirRepository};
//! use optimed::domain::PatientId;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("optimed.toml")?;
//!
//! let repo = HapiFhirRepository::new(config.fhir.clone())?;
//! let llm = AnthropicClient::new(config.anthropic.clone())?;
//! let engine = LlmDiagnosticEngine::new(Arc::new(llm));
//!
//! let patient = repo.get_patient(&PatientId::new("example")?).await?;
//! let result = engine.run(&patient).await?;
//! println!("{}", result.primary_code());
//! # Ok(())
//! # }
//! ```

pub mod diagnostic;
pub mod ports;
