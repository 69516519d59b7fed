//! Diagnose command implementation

use crate::adapters::anthropic::AnthropicClient;
use crate::adapters::fhir::HapiFhirRepository;
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::OptimedConfig;
use crate::core::diagnostic::LlmDiagnosticEngine;
use crate::core::ports::{DiagnosticEngine, FhirRepository};
use crate::domain::{DiagnosisResult, OptimedError, PatientId};
use crate::log_error_with_context;
use clap::Args;
use std::sync::Arc;

/// Arguments for the diagnose command
#[derive(Args, Debug)]
pub struct DiagnoseArgs {
    /// FHIR Patient resource id
    pub id: String,
}

impl DiagnoseArgs {
    /// Execute the diagnose command
    pub async fn execute(&self, config: &OptimedConfig) -> anyhow::Result<i32> {
        let id = match PatientId::new(self.id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        match Self::diagnose(config, &id).await {
            Ok(result) => {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                log_error_with_context!(&e, "Diagnosis failed");
                eprintln!("❌ Diagnosis for patient {id} failed");
                eprintln!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    async fn diagnose(
        config: &OptimedConfig,
        id: &PatientId,
    ) -> Result<DiagnosisResult, OptimedError> {
        let repo = HapiFhirRepository::new(config.fhir.clone())?;
        let llm = Arc::new(AnthropicClient::new(config.anthropic.clone())?);
        let engine = LlmDiagnosticEngine::new(llm).with_max_tokens(config.anthropic.max_tokens);

        let patient = repo.get_patient(id).await?;
        for msg in patient.critical_lab_msgs() {
            eprintln!("⚠️  {msg}");
        }

        engine.run(&patient).await
    }
}
