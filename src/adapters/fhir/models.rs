//! FHIR R4 wire models
//!
//! Only the fields OptiMed reads are modeled. Conversion into domain types
//! lives here so the client stays focused on HTTP.

use crate::domain::{FhirError, OptimedError, PatientContext, PatientId, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Care unit reported for patients, since FHIR Patient carries no ward
pub const UNKNOWN_CARE_UNIT: &str = "UNKNOWN";

/// LOINC codes stored under a shorter lab key
///
/// Potassium is keyed as `K+` so critical-lab detection works on fetched data.
pub const LAB_KEY_ALIASES: &[(&str, &str)] = &[("2823-3", "K+")];

/// LOINC codes of the vital signs OptiMed tracks
pub const VITAL_CODES: &[(&str, &str)] = &[
    ("8867-4", "Heart rate"),
    ("59408-5", "Respiratory rate"),
    ("8480-6", "Systolic BP"),
    ("8462-4", "Diastolic BP"),
    ("8310-5", "Body temperature"),
];

/// LOINC codes of the labs OptiMed treats as potentially critical
pub const CRITICAL_LAB_CODES: &[(&str, &str)] = &[("2823-3", "Potassium"), ("2339-0", "Glucose")];

/// Human-readable name for a tracked LOINC code or lab alias
pub fn loinc_label(code: &str) -> Option<&'static str> {
    let code = LAB_KEY_ALIASES
        .iter()
        .find(|(_, alias)| *alias == code)
        .map(|(loinc, _)| *loinc)
        .unwrap_or(code);

    VITAL_CODES
        .iter()
        .chain(CRITICAL_LAB_CODES)
        .find(|(loinc, _)| *loinc == code)
        .map(|(_, label)| *label)
}

/// FHIR searchset or collection bundle
#[derive(Debug, Deserialize)]
pub struct Bundle {
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

/// One bundle entry; the resource is kept raw so bad entries can be skipped
#[derive(Debug, Deserialize)]
pub struct BundleEntry {
    #[serde(default)]
    pub resource: Option<serde_json::Value>,
}

impl Bundle {
    /// Resources of every entry that has one
    pub fn resources(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.entry.iter().filter_map(|e| e.resource.as_ref())
    }
}

/// FHIR Patient resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirPatient {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Vec<HumanName>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HumanName {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub family: Option<String>,
}

/// FHIR Observation resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FhirObservation {
    #[serde(default)]
    pub code: Option<CodeableConcept>,
    #[serde(default)]
    pub value_quantity: Option<Quantity>,
}

#[derive(Debug, Deserialize)]
pub struct CodeableConcept {
    #[serde(default)]
    pub coding: Vec<Coding>,
}

#[derive(Debug, Deserialize)]
pub struct Coding {
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Quantity {
    #[serde(default)]
    pub value: Option<serde_json::Number>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl FhirPatient {
    /// Best-effort display name from the first `name` entry
    pub fn display_name(&self) -> String {
        let Some(name) = self.name.first() else {
            return "Unknown".to_string();
        };

        if let Some(text) = name.text.as_deref().filter(|t| !t.trim().is_empty()) {
            return text.to_string();
        }

        let joined = name
            .given
            .iter()
            .map(String::as_str)
            .chain(name.family.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        let joined = joined.trim();

        if joined.is_empty() {
            "Unknown".to_string()
        } else {
            joined.to_string()
        }
    }

    /// Whole years between `birthDate` and `today`, counted as days / 365
    ///
    /// Partial dates (`YYYY`, `YYYY-MM`) are read as the first day of the
    /// period. A missing or unreadable date gives 0.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let Some(born) = self.birth_date.as_deref().and_then(parse_fhir_date) else {
            return 0;
        };
        let days = (today - born).num_days().max(0);
        u32::try_from(days / 365).unwrap_or(u32::MAX)
    }

    /// Converts this patient plus observation maps into a domain value
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidResponse`] when the resource has no id.
    pub fn to_domain(
        &self,
        vitals: BTreeMap<String, String>,
        labs: BTreeMap<String, String>,
    ) -> Result<PatientContext> {
        let id = self
            .id
            .as_deref()
            .ok_or_else(|| {
                OptimedError::Fhir(FhirError::InvalidResponse(
                    "Patient resource has no id".to_string(),
                ))
            })
            .and_then(|id| {
                PatientId::new(id)
                    .map_err(|e| OptimedError::Fhir(FhirError::InvalidResponse(e)))
            })?;

        PatientContext::builder()
            .id(id)
            .name(self.display_name())
            .age(self.age_on(Utc::now().date_naive()))
            .sex(self.gender.clone().unwrap_or_else(|| "unknown".to_string()))
            .care_unit(UNKNOWN_CARE_UNIT)
            .vitals(vitals)
            .labs(labs)
            .build()
    }
}

impl FhirObservation {
    /// `(code, "value unit")` when the observation has both a code and a value
    pub fn code_and_value(&self) -> Option<(String, String)> {
        let code = self.code.as_ref()?.coding.first()?.code.clone()?;
        let quantity = self.value_quantity.as_ref()?;
        let value = quantity.value.as_ref()?;

        let rendered = match quantity.unit.as_deref() {
            Some(unit) if !unit.is_empty() => format!("{value} {unit}"),
            _ => value.to_string(),
        };
        Some((code, rendered))
    }
}

/// Maps observation resources to `code -> "value unit"`
///
/// Entries that fail to parse or lack a code or value are skipped. When a
/// code repeats, the first occurrence wins, which is the newest one for
/// results sorted by `-date`.
pub fn observations_to_map<'a>(
    resources: impl IntoIterator<Item = &'a serde_json::Value>,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();

    for resource in resources {
        let observation: FhirObservation = match serde_json::from_value(resource.clone()) {
            Ok(observation) => observation,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparseable observation");
                continue;
            }
        };

        if let Some((code, value)) = observation.code_and_value() {
            let key = LAB_KEY_ALIASES
                .iter()
                .find(|(loinc, _)| *loinc == code)
                .map(|(_, alias)| (*alias).to_string())
                .unwrap_or(code);
            out.entry(key).or_insert(value);
        }
    }

    out
}

fn parse_fhir_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    match raw.len() {
        4 => NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1),
        7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok(),
    }
}
