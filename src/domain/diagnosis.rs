//! Result of a diagnostic run

use super::errors::OptimedError;
use super::ids::PatientId;
use super::result::Result;
use super::validate::{missing, require_non_blank, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A suggested diagnosis with differential codes and a confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    patient_id: PatientId,
    primary_code: String,
    #[serde(default)]
    differential: Vec<String>,
    confidence: f64,
    generated_at: DateTime<Utc>,
    #[serde(default)]
    explanation: Option<String>,
}

impl DiagnosisResult {
    pub fn builder() -> DiagnosisResultBuilder {
        DiagnosisResultBuilder::default()
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    /// Most likely diagnosis code (e.g. ICD-10)
    pub fn primary_code(&self) -> &str {
        &self.primary_code
    }

    /// Alternative codes, most likely first
    pub fn differential(&self) -> &[String] {
        &self.differential
    }

    /// Confidence in the primary code, between 0.0 and 1.0 inclusive
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }
}

impl Validate for DiagnosisResult {
    fn validate(&self) -> Result<()> {
        require_non_blank("primary_code", &self.primary_code)?;
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(OptimedError::Validation(format!(
                "confidence {} must be between 0 and 1",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// Builder for constructing DiagnosisResult instances
#[derive(Debug, Default)]
pub struct DiagnosisResultBuilder {
    patient_id: Option<PatientId>,
    primary_code: Option<String>,
    differential: Vec<String>,
    confidence: Option<f64>,
    generated_at: Option<DateTime<Utc>>,
    explanation: Option<String>,
}

impl DiagnosisResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patient_id(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    pub fn primary_code(mut self, code: impl Into<String>) -> Self {
        self.primary_code = Some(code.into());
        self
    }

    pub fn differential<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.differential = codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn build(self) -> Result<DiagnosisResult> {
        let result = DiagnosisResult {
            patient_id: self.patient_id.ok_or_else(|| missing("patient_id"))?,
            primary_code: self.primary_code.ok_or_else(|| missing("primary_code"))?,
            differential: self.differential,
            confidence: self.confidence.ok_or_else(|| missing("confidence"))?,
            generated_at: self.generated_at.unwrap_or_else(Utc::now),
            explanation: self.explanation,
        };
        result.validate()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn build(confidence: f64) -> Result<DiagnosisResult> {
        DiagnosisResult::builder()
            .patient_id(PatientId::new("P123").unwrap())
            .primary_code("E87.5")
            .differential(["N17.9"])
            .confidence(confidence)
            .build()
    }

    #[test_case(0.0 ; "lower bound")]
    #[test_case(0.73 ; "interior")]
    #[test_case(1.0 ; "upper bound")]
    fn test_confidence_accepted(confidence: f64) {
        assert_eq!(build(confidence).unwrap().confidence(), confidence);
    }

    #[test_case(-0.01 ; "below zero")]
    #[test_case(1.2 ; "above one")]
    #[test_case(f64::NAN ; "nan")]
    fn test_confidence_rejected(confidence: f64) {
        assert!(matches!(build(confidence), Err(OptimedError::Validation(_))));
    }

    #[test]
    fn test_blank_primary_code_rejected() {
        let result = DiagnosisResult::builder()
            .patient_id(PatientId::new("P123").unwrap())
            .primary_code(" ")
            .confidence(0.5)
            .build();
        assert!(result.is_err());
    }
}
