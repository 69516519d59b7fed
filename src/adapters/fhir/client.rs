//! HAPI FHIR R4 repository
//!
//! Read-only [`FhirRepository`] implementation that talks to a FHIR R4 server
//! over REST. No authentication is sent; the public HAPI demo server does not
//! require any.

use super::models::{observations_to_map, Bundle, FhirPatient};
use crate::config::FhirConfig;
use crate::core::ports::FhirRepository;
use crate::domain::{FhirError, OptimedError, PatientContext, PatientId, Result};
use crate::log_adapter_request;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// FHIR observation category for vital signs
pub const CATEGORY_VITAL_SIGNS: &str = "vital-signs";

/// FHIR observation category for lab results
pub const CATEGORY_LABORATORY: &str = "laboratory";

/// FHIR repository backed by a HAPI (or any R4) server
///
/// # Example
///
/// ```no_run
/// use optimed::adapters::fhir::HapiFhirRepository;
/// use optimed::config::FhirConfig;
/// use optimed::core::ports::FhirRepository;
///
/// # async fn example() -> optimed::domain::Result<()> {
/// let repo = HapiFhirRepository::new(FhirConfig::default())?;
/// let hits = repo.search_patients("smith").await?;
/// println!("{} patients", hits.len());
/// # Ok(())
/// # }
/// ```
pub struct HapiFhirRepository {
    base_url: String,
    client: Client,
    config: FhirConfig,
}

impl HapiFhirRepository {
    /// Create a new repository from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: FhirConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                OptimedError::Configuration(format!("Failed to build FHIR HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url,
            client,
            config,
        })
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GETs `path` with `query` and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        resource: &str,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        log_adapter_request!("fhir", "GET", url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/fhir+json")
            .query(query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let resp = check_status(resp, resource).await?;

        resp.json::<T>().await.map_err(|e| {
            OptimedError::Fhir(FhirError::InvalidResponse(format!(
                "Failed to decode {resource}: {e}"
            )))
        })
    }

    async fn fetch_patient_resource(&self, id: &PatientId) -> Result<FhirPatient> {
        let resource = format!("Patient/{id}");
        self.get_json(&resource, &[], &resource).await
    }

    async fn fetch_observations(
        &self,
        id: &PatientId,
        category: &str,
    ) -> Result<BTreeMap<String, String>> {
        let count = self.config.observation_count.to_string();
        let query = [
            ("patient", id.as_str()),
            ("category", category),
            ("_sort", "-date"),
            ("_count", count.as_str()),
        ];

        let bundle: Bundle = self
            .get_json("Observation", &query, "Observation bundle")
            .await?;
        let observations = observations_to_map(bundle.resources());

        tracing::debug!(
            patient_id = %id,
            category = category,
            count = observations.len(),
            "Fetched observations"
        );

        Ok(observations)
    }
}

#[async_trait]
impl FhirRepository for HapiFhirRepository {
    async fn get_patient(&self, id: &PatientId) -> Result<PatientContext> {
        tracing::info!(patient_id = %id, base_url = %self.base_url, "Fetching patient");

        let patient = self.fetch_patient_resource(id).await?;

        let (vitals, labs) = futures::try_join!(
            self.fetch_observations(id, CATEGORY_VITAL_SIGNS),
            self.fetch_observations(id, CATEGORY_LABORATORY),
        )?;

        patient.to_domain(vitals, labs)
    }

    async fn search_patients(&self, query: &str) -> Result<Vec<PatientContext>> {
        tracing::info!(query = query, base_url = %self.base_url, "Searching patients");

        let count = self.config.search_count.to_string();
        let bundle: Bundle = self
            .get_json(
                "Patient",
                &[("name", query), ("_count", count.as_str())],
                "Patient bundle",
            )
            .await?;

        // Malformed entries are skipped like malformed observations.
        let mut results = Vec::new();
        for resource in bundle.resources() {
            let mapped = serde_json::from_value::<FhirPatient>(resource.clone())
                .map_err(OptimedError::from)
                .and_then(|patient| patient.to_domain(BTreeMap::new(), BTreeMap::new()));
            match mapped {
                Ok(patient) => results.push(patient),
                Err(e) => {
                    tracing::debug!(error = %e, query = query, "Skipping malformed patient entry");
                }
            }
        }

        tracing::info!(query = query, count = results.len(), "Patient search complete");
        Ok(results)
    }
}

fn map_transport_error(e: reqwest::Error) -> OptimedError {
    if e.is_timeout() {
        OptimedError::Fhir(FhirError::Timeout(e.to_string()))
    } else {
        OptimedError::Fhir(FhirError::ConnectionFailed(e.to_string()))
    }
}

/// Maps a non-success status to the matching [`FhirError`] kind
async fn check_status(resp: Response, resource: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), resource = resource, "FHIR request failed");

    let err = match status {
        StatusCode::NOT_FOUND => FhirError::NotFound(resource.to_string()),
        s if s.is_server_error() => FhirError::ServerError {
            status: s.as_u16(),
            message,
        },
        s => FhirError::ClientError {
            status: s.as_u16(),
            message,
        },
    };
    Err(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_trims_trailing_slash() {
        let config = FhirConfig {
            base_url: "https://hapi.fhir.org/baseR4/".to_string(),
            ..Default::default()
        };
        let repo = HapiFhirRepository::new(config).unwrap();
        assert_eq!(repo.base_url(), "https://hapi.fhir.org/baseR4");
    }
}
