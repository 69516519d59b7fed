//! Diagnostic engine backed by a language model
//!
//! The engine renders the patient context into a prompt, asks the model for
//! a JSON verdict and converts the verdict into a [`DiagnosisResult`].

use crate::core::ports::{DiagnosticEngine, LlmClient};
use crate::domain::{
    ChatMessage, DiagnosisResult, LlmError, OptimedError, PatientContext, Result,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Sampling temperature used for diagnostic runs
pub const DIAGNOSTIC_TEMPERATURE: f32 = 0.2;

const SYSTEM_PROMPT: &str = "You are a clinical decision support assistant. \
Given a patient summary, suggest the most likely diagnosis as an ICD-10 code. \
Respond with a single JSON object and nothing else, using the keys \
\"primary_code\" (string), \"differential\" (array of ICD-10 codes, most likely first), \
\"confidence\" (number between 0 and 1) and \"explanation\" (short string).";

/// Verdict as returned by the model
#[derive(Debug, Deserialize)]
struct Verdict {
    primary_code: String,
    #[serde(default)]
    differential: Vec<String>,
    confidence: f64,
    #[serde(default)]
    explanation: Option<String>,
}

/// [`DiagnosticEngine`] that prompts any [`LlmClient`]
///
/// # Example
///
/// ```no_run
/// use optimed::adapters::anthropic::AnthropicClient;
/// use optimed::config::AnthropicConfig;
/// use optimed::core::diagnostic::LlmDiagnosticEngine;
/// use optimed::core::ports::DiagnosticEngine;
/// use optimed::domain::PatientContext;
/// use std::sync::Arc;
///
/// # async fn example(patient: PatientContext) -> optimed::domain::Result<()> {
/// let llm = AnthropicClient::new(AnthropicConfig::default())?;
/// let engine = LlmDiagnosticEngine::new(Arc::new(llm));
/// let result = engine.run(&patient).await?;
/// println!("{} ({:.2})", result.primary_code(), result.confidence());
/// # Ok(())
/// # }
/// ```
pub struct LlmDiagnosticEngine {
    llm: Arc<dyn LlmClient>,
    max_tokens: Option<u32>,
}

impl LlmDiagnosticEngine {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            max_tokens: None,
        }
    }

    /// Caps the length of the model's reply
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Renders the patient summary sent as the user turn
    pub fn patient_summary(patient: &PatientContext) -> String {
        let mut summary = format!(
            "Patient {}: {}, age {}, sex {}, care unit {}.\n",
            patient.id(),
            patient.name(),
            patient.age(),
            patient.sex(),
            patient.care_unit()
        );

        if !patient.vitals().is_empty() {
            summary.push_str("Vitals:\n");
            for (code, value) in patient.vitals() {
                let _ = writeln!(summary, "- {code}: {value}");
            }
        }

        if !patient.labs().is_empty() {
            summary.push_str("Labs:\n");
            for (code, value) in patient.labs() {
                let _ = writeln!(summary, "- {code}: {value}");
            }
        }

        for msg in patient.critical_lab_msgs() {
            let _ = writeln!(summary, "ALERT: {msg}");
        }

        summary
    }
}

/// Slice from the first `{` to the last `}`, tolerating prose around it
fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

#[async_trait]
impl DiagnosticEngine for LlmDiagnosticEngine {
    async fn run(&self, patient: &PatientContext) -> Result<DiagnosisResult> {
        tracing::info!(patient_id = %patient.id(), "Running diagnostic engine");

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::patient_summary(patient)),
        ];
        let reply = self
            .llm
            .chat(&messages, DIAGNOSTIC_TEMPERATURE, self.max_tokens)
            .await?;

        let json = extract_json_object(reply.content()).ok_or_else(|| {
            OptimedError::Llm(LlmError::InvalidResponse(
                "reply does not contain a JSON object".to_string(),
            ))
        })?;

        let verdict: Verdict = serde_json::from_str(json).map_err(|e| {
            OptimedError::Llm(LlmError::InvalidResponse(format!(
                "malformed diagnostic verdict: {e}"
            )))
        })?;

        let mut builder = DiagnosisResult::builder()
            .patient_id(patient.id().clone())
            .primary_code(verdict.primary_code)
            .differential(verdict.differential)
            .confidence(verdict.confidence);
        if let Some(explanation) = verdict.explanation {
            builder = builder.explanation(explanation);
        }
        let result = builder.build()?;

        tracing::info!(
            patient_id = %patient.id(),
            primary_code = %result.primary_code(),
            confidence = result.confidence(),
            "Diagnostic run complete"
        );

        Ok(result)
    }
}
