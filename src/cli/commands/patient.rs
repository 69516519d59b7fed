//! Patient command implementation
//!
//! `patient get` and `patient search` against the configured FHIR server.
//! JSON goes to stdout; human-readable notes go to stderr.

use crate::adapters::fhir::{loinc_label, HapiFhirRepository};
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::OptimedConfig;
use crate::core::ports::FhirRepository;
use crate::domain::{PatientContext, PatientId};
use crate::log_error_with_context;
use clap::{Args, Subcommand};

/// Arguments for the patient command
#[derive(Args, Debug)]
pub struct PatientArgs {
    #[command(subcommand)]
    pub action: PatientAction,
}

#[derive(Subcommand, Debug)]
pub enum PatientAction {
    /// Fetch one patient with recent vitals and labs
    Get {
        /// FHIR Patient resource id
        id: String,
    },

    /// Search patients by name
    Search {
        /// Name fragment to search for
        query: String,
    },
}

impl PatientArgs {
    /// Execute the patient command
    pub async fn execute(&self, config: &OptimedConfig) -> anyhow::Result<i32> {
        let repo = match HapiFhirRepository::new(config.fhir.clone()) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        match &self.action {
            PatientAction::Get { id } => Self::get(&repo, id).await,
            PatientAction::Search { query } => Self::search(&repo, query).await,
        }
    }

    async fn get(repo: &HapiFhirRepository, id: &str) -> anyhow::Result<i32> {
        let id = match PatientId::new(id) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let patient = match repo.get_patient(&id).await {
            Ok(p) => p,
            Err(e) => {
                log_error_with_context!(&e, "Patient fetch failed");
                eprintln!("❌ Failed to fetch patient {id}");
                eprintln!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("{}", serde_json::to_string_pretty(&patient)?);

        for line in Self::annotations(&patient) {
            eprintln!("{line}");
        }
        for msg in patient.critical_lab_msgs() {
            eprintln!("⚠️  {msg}");
        }
        Ok(EXIT_SUCCESS)
    }

    async fn search(repo: &HapiFhirRepository, query: &str) -> anyhow::Result<i32> {
        match repo.search_patients(query).await {
            Ok(patients) => {
                println!("{}", serde_json::to_string_pretty(&patients)?);
                eprintln!("🔍 {} patient(s) matched \"{query}\"", patients.len());
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                log_error_with_context!(&e, "Patient search failed");
                eprintln!("❌ Patient search failed");
                eprintln!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }

    /// One line per vital or lab whose code has a known label
    pub fn annotations(patient: &PatientContext) -> Vec<String> {
        patient
            .vitals()
            .iter()
            .chain(patient.labs())
            .filter_map(|(code, value)| {
                loinc_label(code).map(|label| format!("   {label} ({code}): {value}"))
            })
            .collect()
    }
}
