//! Clinical value objects: patient context, bed state and encounter
//!
//! All three are immutable. Transitions such as discharging an encounter
//! return a new instance and leave the receiver untouched.

use super::enums::{BedStatus, EncounterStatus};
use super::errors::OptimedError;
use super::ids::{EncounterId, PatientId};
use super::result::Result;
use super::validate::{missing, require_non_blank, Validate};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lab keys under which a potassium value is accepted, in lookup order
pub const POTASSIUM_KEYS: [&str; 2] = ["K⁺", "K+"];

/// Potassium level (mmol/L) at or above which a lab is critical
pub const POTASSIUM_CRITICAL_MMOL_L: f64 = 6.0;

/// Reads the leading numeric token of a lab value such as `"6.2 mmol/L"`
fn parse_lab_value(raw: &str) -> Option<f64> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Snapshot of a patient's clinical context
///
/// Vitals and labs map an observation code to its value string. Keys are
/// unique and kept in sorted order.
///
/// # Examples
///
/// ```
/// use optimed::domain::{PatientContext, PatientId};
///
/// let patient = PatientContext::builder()
///     .id(PatientId::new("P123").unwrap())
///     .name("Anna")
///     .age(67)
///     .sex("F")
///     .care_unit("Ward A")
///     .lab("K+", "6.2")
///     .build()
///     .unwrap();
///
/// assert!(patient.has_critical_lab());
/// assert_eq!(patient.critical_lab_msgs(), vec!["Potassium critical: 6.2".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientContext {
    id: PatientId,
    name: String,
    age: u32,
    sex: String,
    care_unit: String,
    #[serde(default)]
    vitals: BTreeMap<String, String>,
    #[serde(default)]
    labs: BTreeMap<String, String>,
    updated_at: DateTime<Utc>,
}

impl PatientContext {
    /// Creates a new builder for constructing a PatientContext
    pub fn builder() -> PatientContextBuilder {
        PatientContextBuilder::default()
    }

    pub fn id(&self) -> &PatientId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn sex(&self) -> &str {
        &self.sex
    }

    pub fn care_unit(&self) -> &str {
        &self.care_unit
    }

    pub fn vitals(&self) -> &BTreeMap<String, String> {
        &self.vitals
    }

    pub fn labs(&self) -> &BTreeMap<String, String> {
        &self.labs
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Raw potassium lab value, looked up under each accepted key spelling
    ///
    /// An empty value counts as absent, so a blank `K⁺` falls through to `K+`.
    pub fn potassium(&self) -> Option<&str> {
        POTASSIUM_KEYS
            .iter()
            .filter_map(|key| self.labs.get(*key))
            .map(String::as_str)
            .find(|value| !value.trim().is_empty())
    }

    /// Returns true if the potassium lab is at or above the critical threshold
    ///
    /// Absent potassium is not critical. Non-numeric potassium values never
    /// reach this point because construction rejects them.
    pub fn has_critical_lab(&self) -> bool {
        self.potassium()
            .and_then(parse_lab_value)
            .is_some_and(|value| value >= POTASSIUM_CRITICAL_MMOL_L)
    }

    /// Human-readable messages for every critical lab, empty if none
    pub fn critical_lab_msgs(&self) -> Vec<String> {
        let mut msgs = Vec::new();
        if self.has_critical_lab() {
            if let Some(raw) = self.potassium() {
                msgs.push(format!("Potassium critical: {raw}"));
            }
        }
        msgs
    }
}

impl Validate for PatientContext {
    fn validate(&self) -> Result<()> {
        require_non_blank("patient id", self.id.as_str())?;

        for key in POTASSIUM_KEYS {
            if let Some(raw) = self.labs.get(key) {
                if !raw.trim().is_empty() && parse_lab_value(raw).is_none() {
                    return Err(OptimedError::Validation(format!(
                        "lab {key} has non-numeric value '{raw}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Builder for constructing PatientContext instances
#[derive(Debug, Default)]
pub struct PatientContextBuilder {
    id: Option<PatientId>,
    name: Option<String>,
    age: Option<u32>,
    sex: Option<String>,
    care_unit: Option<String>,
    vitals: BTreeMap<String, String>,
    labs: BTreeMap<String, String>,
    updated_at: Option<DateTime<Utc>>,
}

impl PatientContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: PatientId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn sex(mut self, sex: impl Into<String>) -> Self {
        self.sex = Some(sex.into());
        self
    }

    pub fn care_unit(mut self, care_unit: impl Into<String>) -> Self {
        self.care_unit = Some(care_unit.into());
        self
    }

    /// Adds one vital sign; a repeated code replaces the earlier value
    pub fn vital(mut self, code: impl Into<String>, value: impl Into<String>) -> Self {
        self.vitals.insert(code.into(), value.into());
        self
    }

    /// Replaces all vital signs
    pub fn vitals(mut self, vitals: BTreeMap<String, String>) -> Self {
        self.vitals = vitals;
        self
    }

    /// Adds one lab value; a repeated code replaces the earlier value
    pub fn lab(mut self, code: impl Into<String>, value: impl Into<String>) -> Self {
        self.labs.insert(code.into(), value.into());
        self
    }

    /// Replaces all lab values
    pub fn labs(mut self, labs: BTreeMap<String, String>) -> Self {
        self.labs = labs;
        self
    }

    /// Sets the snapshot time (defaults to the moment of `build`)
    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Builds the PatientContext
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or a
    /// potassium lab value is not numeric.
    pub fn build(self) -> Result<PatientContext> {
        let patient = PatientContext {
            id: self.id.ok_or_else(|| missing("id"))?,
            name: self.name.ok_or_else(|| missing("name"))?,
            age: self.age.ok_or_else(|| missing("age"))?,
            sex: self.sex.ok_or_else(|| missing("sex"))?,
            care_unit: self.care_unit.ok_or_else(|| missing("care_unit"))?,
            vitals: self.vitals,
            labs: self.labs,
            updated_at: self.updated_at.unwrap_or_else(Utc::now),
        };
        patient.validate()?;
        Ok(patient)
    }
}

/// Observed state of a single bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedState {
    bed_id: String,
    care_unit: String,
    status: BedStatus,
    since: DateTime<Utc>,
    #[serde(default)]
    current_encounter: Option<EncounterId>,
}

impl BedState {
    pub fn builder() -> BedStateBuilder {
        BedStateBuilder::default()
    }

    pub fn bed_id(&self) -> &str {
        &self.bed_id
    }

    pub fn care_unit(&self) -> &str {
        &self.care_unit
    }

    pub fn status(&self) -> BedStatus {
        self.status
    }

    pub fn since(&self) -> DateTime<Utc> {
        self.since
    }

    pub fn current_encounter(&self) -> Option<&EncounterId> {
        self.current_encounter.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.status == BedStatus::Occupied
    }

    /// Whole minutes the bed has been vacant or cleaning as of `now`
    ///
    /// Occupied beds are never idle. The result is truncated toward zero.
    pub fn idle_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        if self.is_occupied() {
            return 0;
        }
        (now - self.since).num_minutes()
    }

    /// Whole minutes the bed has been idle as of the current time
    pub fn idle_minutes(&self) -> i64 {
        self.idle_minutes_at(Utc::now())
    }
}

impl Validate for BedState {
    fn validate(&self) -> Result<()> {
        require_non_blank("bed_id", &self.bed_id)?;

        if self.since > Utc::now() {
            return Err(OptimedError::Validation(format!(
                "bed {} status since {} is in the future",
                self.bed_id, self.since
            )));
        }

        if self.current_encounter.is_some() && !self.is_occupied() {
            return Err(OptimedError::Validation(format!(
                "bed {} has a current encounter but status is {}",
                self.bed_id, self.status
            )));
        }
        Ok(())
    }
}

/// Builder for constructing BedState instances
#[derive(Debug, Default)]
pub struct BedStateBuilder {
    bed_id: Option<String>,
    care_unit: Option<String>,
    status: Option<BedStatus>,
    since: Option<DateTime<Utc>>,
    current_encounter: Option<EncounterId>,
}

impl BedStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bed_id(mut self, bed_id: impl Into<String>) -> Self {
        self.bed_id = Some(bed_id.into());
        self
    }

    pub fn care_unit(mut self, care_unit: impl Into<String>) -> Self {
        self.care_unit = Some(care_unit.into());
        self
    }

    pub fn status(mut self, status: BedStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets when the current status began (defaults to the moment of `build`)
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn current_encounter(mut self, encounter_id: EncounterId) -> Self {
        self.current_encounter = Some(encounter_id);
        self
    }

    /// Builds the BedState
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing, `since` is
    /// in the future, or an encounter is attached to a bed that is not occupied.
    pub fn build(self) -> Result<BedState> {
        let bed = BedState {
            bed_id: self.bed_id.ok_or_else(|| missing("bed_id"))?,
            care_unit: self.care_unit.ok_or_else(|| missing("care_unit"))?,
            status: self.status.ok_or_else(|| missing("status"))?,
            since: self.since.unwrap_or_else(Utc::now),
            current_encounter: self.current_encounter,
        };
        bed.validate()?;
        Ok(bed)
    }
}

/// A patient's stay, from admission to discharge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    encounter_id: EncounterId,
    patient_id: PatientId,
    status: EncounterStatus,
    admit_ts: DateTime<Utc>,
    #[serde(default)]
    discharge_ts: Option<DateTime<Utc>>,
    #[serde(default)]
    bed_history: Vec<BedState>,
}

impl Encounter {
    pub fn builder() -> EncounterBuilder {
        EncounterBuilder::default()
    }

    pub fn encounter_id(&self) -> &EncounterId {
        &self.encounter_id
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn status(&self) -> EncounterStatus {
        self.status
    }

    pub fn admit_ts(&self) -> DateTime<Utc> {
        self.admit_ts
    }

    pub fn discharge_ts(&self) -> Option<DateTime<Utc>> {
        self.discharge_ts
    }

    pub fn bed_history(&self) -> &[BedState] {
        &self.bed_history
    }

    /// Most recently observed bed, if any
    pub fn current_bed(&self) -> Option<&BedState> {
        self.bed_history.last()
    }

    pub fn is_discharged(&self) -> bool {
        self.status == EncounterStatus::Discharged
    }

    /// Length of stay: up to discharge if discharged, otherwise up to `now`
    pub fn length_of_stay_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.discharge_ts.unwrap_or(now);
        end - self.admit_ts
    }

    /// Length of stay as of the current time
    pub fn length_of_stay(&self) -> Duration {
        self.length_of_stay_at(Utc::now())
    }

    /// Returns a discharged copy of this encounter
    ///
    /// # Errors
    ///
    /// Fails if the encounter is already discharged or `ts` precedes admission.
    pub fn discharge_at(&self, ts: DateTime<Utc>) -> Result<Encounter> {
        if self.is_discharged() {
            return Err(OptimedError::Validation(format!(
                "encounter {} is already discharged",
                self.encounter_id
            )));
        }
        if ts < self.admit_ts {
            return Err(OptimedError::Validation(format!(
                "discharge time {ts} precedes admission {}",
                self.admit_ts
            )));
        }

        Ok(Encounter {
            status: EncounterStatus::Discharged,
            discharge_ts: Some(ts),
            ..self.clone()
        })
    }

    /// Returns a copy discharged at the current time
    pub fn discharge(&self) -> Result<Encounter> {
        self.discharge_at(Utc::now())
    }

    /// Returns a copy with `bed` appended to the bed history
    pub fn with_bed_state(&self, bed: BedState) -> Encounter {
        let mut bed_history = self.bed_history.clone();
        bed_history.push(bed);
        Encounter {
            bed_history,
            ..self.clone()
        }
    }
}

impl Validate for Encounter {
    fn validate(&self) -> Result<()> {
        match (self.status, self.discharge_ts) {
            (EncounterStatus::Discharged, None) => {
                return Err(OptimedError::Validation(format!(
                    "encounter {} is discharged but has no discharge time",
                    self.encounter_id
                )));
            }
            (EncounterStatus::InProgress, Some(_)) => {
                return Err(OptimedError::Validation(format!(
                    "encounter {} is in progress but has a discharge time",
                    self.encounter_id
                )));
            }
            (_, Some(discharge)) if discharge < self.admit_ts => {
                return Err(OptimedError::Validation(format!(
                    "discharge time {discharge} precedes admission {}",
                    self.admit_ts
                )));
            }
            _ => {}
        }

        self.bed_history.iter().try_for_each(Validate::validate)
    }
}

/// Builder for constructing Encounter instances
#[derive(Debug, Default)]
pub struct EncounterBuilder {
    encounter_id: Option<EncounterId>,
    patient_id: Option<PatientId>,
    status: Option<EncounterStatus>,
    admit_ts: Option<DateTime<Utc>>,
    discharge_ts: Option<DateTime<Utc>>,
    bed_history: Vec<BedState>,
}

impl EncounterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encounter_id(mut self, encounter_id: EncounterId) -> Self {
        self.encounter_id = Some(encounter_id);
        self
    }

    pub fn patient_id(mut self, patient_id: PatientId) -> Self {
        self.patient_id = Some(patient_id);
        self
    }

    /// Sets the status (defaults to `InProgress`)
    pub fn status(mut self, status: EncounterStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn admit_ts(mut self, admit_ts: DateTime<Utc>) -> Self {
        self.admit_ts = Some(admit_ts);
        self
    }

    pub fn discharge_ts(mut self, discharge_ts: DateTime<Utc>) -> Self {
        self.discharge_ts = Some(discharge_ts);
        self
    }

    pub fn bed_state(mut self, bed: BedState) -> Self {
        self.bed_history.push(bed);
        self
    }

    /// Builds the Encounter
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or the
    /// status and discharge time disagree.
    pub fn build(self) -> Result<Encounter> {
        let encounter = Encounter {
            encounter_id: self.encounter_id.ok_or_else(|| missing("encounter_id"))?,
            patient_id: self.patient_id.ok_or_else(|| missing("patient_id"))?,
            status: self.status.unwrap_or(EncounterStatus::InProgress),
            admit_ts: self.admit_ts.ok_or_else(|| missing("admit_ts"))?,
            discharge_ts: self.discharge_ts,
            bed_history: self.bed_history,
        };
        encounter.validate()?;
        Ok(encounter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_with_labs(labs: &[(&str, &str)]) -> Result<PatientContext> {
        let mut builder = PatientContext::builder()
            .id(PatientId::new("P123").unwrap())
            .name("Anna")
            .age(67)
            .sex("F")
            .care_unit("Ward A");
        for (code, value) in labs {
            builder = builder.lab(*code, *value);
        }
        builder.build()
    }

    #[test]
    fn test_critical_potassium_superscript_key() {
        let patient = patient_with_labs(&[("K⁺", "6.2")]).unwrap();
        assert!(patient.has_critical_lab());
        let msgs = patient.critical_lab_msgs();
        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("Potassium"));
        assert!(msgs[0].contains("6.2"));
    }

    #[test]
    fn test_potassium_at_threshold_is_critical() {
        let patient = patient_with_labs(&[("K+", "6.0")]).unwrap();
        assert!(patient.has_critical_lab());
    }

    #[test]
    fn test_potassium_with_unit_suffix() {
        let patient = patient_with_labs(&[("K+", "6.4 mmol/L")]).unwrap();
        assert!(patient.has_critical_lab());
        assert_eq!(
            patient.critical_lab_msgs(),
            vec!["Potassium critical: 6.4 mmol/L".to_string()]
        );
    }

    #[test]
    fn test_superscript_key_takes_precedence() {
        let patient = patient_with_labs(&[("K⁺", "4.1"), ("K+", "7.0")]).unwrap();
        assert_eq!(patient.potassium(), Some("4.1"));
        assert!(!patient.has_critical_lab());
    }

    #[test]
    fn test_empty_superscript_key_falls_through() {
        let patient = patient_with_labs(&[("K⁺", ""), ("K+", "6.5")]).unwrap();
        assert_eq!(patient.potassium(), Some("6.5"));
        assert!(patient.has_critical_lab());

        let blank = patient_with_labs(&[("K+", " ")]).unwrap();
        assert_eq!(blank.potassium(), None);
        assert!(!blank.has_critical_lab());
    }

    #[test]
    fn test_absent_potassium_is_not_critical() {
        let patient = patient_with_labs(&[("Na", "140")]).unwrap();
        assert!(!patient.has_critical_lab());
        assert!(patient.critical_lab_msgs().is_empty());
    }

    #[test]
    fn test_non_numeric_potassium_rejected() {
        let result = patient_with_labs(&[("K+", "hemolyzed")]);
        assert!(matches!(result, Err(OptimedError::Validation(_))));
    }

    #[test]
    fn test_patient_builder_missing_field() {
        let result = PatientContext::builder()
            .id(PatientId::new("P1").unwrap())
            .build();
        assert!(result.unwrap_err().to_string().contains("name is required"));
    }

    #[test]
    fn test_patient_updated_at_defaults_per_instance() {
        let first = patient_with_labs(&[]).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = patient_with_labs(&[]).unwrap();
        assert!(second.updated_at() > first.updated_at());
    }

    #[test]
    fn test_bed_idle_minutes() {
        let now = Utc::now();
        let bed = BedState::builder()
            .bed_id("A12")
            .care_unit("Ward A")
            .status(BedStatus::Vacant)
            .since(now - Duration::minutes(42))
            .build()
            .unwrap();
        assert_eq!(bed.idle_minutes_at(now), 42);
    }

    #[test]
    fn test_bed_idle_minutes_truncates() {
        let now = Utc::now();
        let bed = BedState::builder()
            .bed_id("A12")
            .care_unit("Ward A")
            .status(BedStatus::Cleaning)
            .since(now - Duration::seconds(59 * 60 + 59))
            .build()
            .unwrap();
        assert_eq!(bed.idle_minutes_at(now), 59);
    }

    #[test]
    fn test_occupied_bed_is_never_idle() {
        let now = Utc::now();
        let bed = BedState::builder()
            .bed_id("A12")
            .care_unit("Ward A")
            .status(BedStatus::Occupied)
            .since(now - Duration::hours(5))
            .current_encounter(EncounterId::new("E1").unwrap())
            .build()
            .unwrap();
        assert_eq!(bed.idle_minutes_at(now), 0);
        assert_eq!(bed.idle_minutes(), 0);
    }

    #[test]
    fn test_encounter_on_vacant_bed_rejected() {
        let result = BedState::builder()
            .bed_id("A12")
            .care_unit("Ward A")
            .status(BedStatus::Vacant)
            .current_encounter(EncounterId::new("E1").unwrap())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_bed_since_in_future_rejected() {
        let result = BedState::builder()
            .bed_id("A12")
            .care_unit("Ward A")
            .status(BedStatus::Vacant)
            .since(Utc::now() + Duration::hours(1))
            .build();
        assert!(result.is_err());
    }

    fn encounter(admit_ts: DateTime<Utc>) -> Encounter {
        Encounter::builder()
            .encounter_id(EncounterId::new("E1").unwrap())
            .patient_id(PatientId::new("P123").unwrap())
            .admit_ts(admit_ts)
            .build()
            .unwrap()
    }

    #[test]
    fn test_length_of_stay_in_progress() {
        let now = Utc::now();
        let enc = encounter(now - Duration::days(2) - Duration::hours(3));
        let los = enc.length_of_stay_at(now);
        assert_eq!(los.num_days(), 2);
        assert_eq!((los - Duration::days(2)).num_hours(), 3);
    }

    #[test]
    fn test_length_of_stay_discharged_ignores_now() {
        let admit = Utc::now() - Duration::days(10);
        let enc = encounter(admit)
            .discharge_at(admit + Duration::days(4))
            .unwrap();
        let later = Utc::now() + Duration::days(30);
        assert_eq!(enc.length_of_stay_at(later), Duration::days(4));
    }

    #[test]
    fn test_discharge_is_copy_on_write() {
        let admit = Utc::now() - Duration::days(1);
        let enc = encounter(admit);
        let discharged = enc.discharge().unwrap();

        assert_eq!(enc.status(), EncounterStatus::InProgress);
        assert!(enc.discharge_ts().is_none());
        assert!(discharged.is_discharged());
        assert!(discharged.discharge_ts().is_some());
    }

    #[test]
    fn test_discharge_twice_rejected() {
        let enc = encounter(Utc::now() - Duration::days(1)).discharge().unwrap();
        assert!(enc.discharge().is_err());
    }

    #[test]
    fn test_discharge_before_admit_rejected() {
        let admit = Utc::now() - Duration::days(1);
        let enc = encounter(admit);
        assert!(enc.discharge_at(admit - Duration::minutes(1)).is_err());
    }

    #[test]
    fn test_discharged_without_timestamp_rejected() {
        let result = Encounter::builder()
            .encounter_id(EncounterId::new("E1").unwrap())
            .patient_id(PatientId::new("P1").unwrap())
            .status(EncounterStatus::Discharged)
            .admit_ts(Utc::now())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_bed_history_append_only_copy() {
        let enc = encounter(Utc::now() - Duration::hours(2));
        let bed = BedState::builder()
            .bed_id("B7")
            .care_unit("ICU")
            .status(BedStatus::Occupied)
            .current_encounter(EncounterId::new("E1").unwrap())
            .build()
            .unwrap();

        let moved = enc.with_bed_state(bed.clone());
        assert!(enc.bed_history().is_empty());
        assert_eq!(moved.bed_history(), &[bed.clone()]);
        assert_eq!(moved.current_bed(), Some(&bed));
    }
}
