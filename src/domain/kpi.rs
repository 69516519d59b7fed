//! Operational metrics and alerts

use super::enums::Severity;
use super::errors::OptimedError;
use super::result::Result;
use super::validate::{missing, require_non_blank, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single measurement of an operational KPI, such as admission wait time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiEvent {
    metric: String,
    value: f64,
    unit: String,
    recorded_at: DateTime<Utc>,
    #[serde(default)]
    metric_source: Option<String>,
}

impl KpiEvent {
    pub fn builder() -> KpiEventBuilder {
        KpiEventBuilder::default()
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn metric_source(&self) -> Option<&str> {
        self.metric_source.as_deref()
    }
}

impl Validate for KpiEvent {
    fn validate(&self) -> Result<()> {
        require_non_blank("metric", &self.metric)?;
        if !self.value.is_finite() {
            return Err(OptimedError::Validation(format!(
                "metric {} has non-finite value {}",
                self.metric, self.value
            )));
        }
        Ok(())
    }
}

/// Builder for constructing KpiEvent instances
#[derive(Debug, Default)]
pub struct KpiEventBuilder {
    metric: Option<String>,
    value: Option<f64>,
    unit: Option<String>,
    recorded_at: Option<DateTime<Utc>>,
    metric_source: Option<String>,
}

impl KpiEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = Some(recorded_at);
        self
    }

    pub fn metric_source(mut self, source: impl Into<String>) -> Self {
        self.metric_source = Some(source.into());
        self
    }

    pub fn build(self) -> Result<KpiEvent> {
        let event = KpiEvent {
            metric: self.metric.ok_or_else(|| missing("metric"))?,
            value: self.value.ok_or_else(|| missing("value"))?,
            unit: self.unit.unwrap_or_default(),
            recorded_at: self.recorded_at.unwrap_or_else(Utc::now),
            metric_source: self.metric_source,
        };
        event.validate()?;
        Ok(event)
    }
}

/// An operational alert that can be escalated and resolved
///
/// # Examples
///
/// ```
/// use optimed::domain::{Alert, Severity};
///
/// let alert = Alert::builder()
///     .alert_id("A1")
///     .message("ED backlog above threshold")
///     .severity(Severity::Low)
///     .build()
///     .unwrap();
///
/// let escalated = alert.escalate().escalate();
/// assert_eq!(escalated.severity(), Severity::High);
/// assert_eq!(alert.severity(), Severity::Low);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    alert_id: String,
    message: String,
    severity: Severity,
    #[serde(default)]
    subject: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn builder() -> AlertBuilder {
        AlertBuilder::default()
    }

    pub fn alert_id(&self) -> &str {
        &self.alert_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// What the alert is about, e.g. a patient or a care unit
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }

    /// Returns a copy one rung higher on the severity ladder
    ///
    /// `Critical` stays `Critical`. Resolution state is carried over.
    pub fn escalate(&self) -> Alert {
        Alert {
            severity: self.severity.next(),
            ..self.clone()
        }
    }

    /// Returns a resolved copy of this alert
    ///
    /// # Errors
    ///
    /// Fails if the alert is already resolved or `ts` precedes creation.
    pub fn resolve_at(&self, ts: DateTime<Utc>) -> Result<Alert> {
        if self.is_resolved() {
            return Err(OptimedError::Validation(format!(
                "alert {} is already resolved",
                self.alert_id
            )));
        }
        if ts < self.created_at {
            return Err(OptimedError::Validation(format!(
                "resolution time {ts} precedes creation {}",
                self.created_at
            )));
        }

        Ok(Alert {
            resolved_at: Some(ts),
            ..self.clone()
        })
    }

    /// Returns a copy resolved at the current time
    pub fn resolve(&self) -> Result<Alert> {
        self.resolve_at(Utc::now())
    }
}

impl Validate for Alert {
    fn validate(&self) -> Result<()> {
        require_non_blank("alert_id", &self.alert_id)?;
        if let Some(resolved) = self.resolved_at {
            if resolved < self.created_at {
                return Err(OptimedError::Validation(format!(
                    "resolution time {resolved} precedes creation {}",
                    self.created_at
                )));
            }
        }
        Ok(())
    }
}

/// Builder for constructing Alert instances
#[derive(Debug, Default)]
pub struct AlertBuilder {
    alert_id: Option<String>,
    message: Option<String>,
    severity: Option<Severity>,
    subject: Option<String>,
    created_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
}

impl AlertBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alert_id(mut self, alert_id: impl Into<String>) -> Self {
        self.alert_id = Some(alert_id.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn resolved_at(mut self, resolved_at: DateTime<Utc>) -> Self {
        self.resolved_at = Some(resolved_at);
        self
    }

    pub fn build(self) -> Result<Alert> {
        let alert = Alert {
            alert_id: self.alert_id.ok_or_else(|| missing("alert_id"))?,
            message: self.message.ok_or_else(|| missing("message"))?,
            severity: self.severity.ok_or_else(|| missing("severity"))?,
            subject: self.subject,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            resolved_at: self.resolved_at,
        };
        alert.validate()?;
        Ok(alert)
    }
}
