// REST backend repository implementation
use crate::application::measurement_repository::MeasurementRepository;
use crate::domain::measurement::MeasurementSample;
use crate::domain::observation::{MeasurementReport, NetworkTest};
use crate::infrastructure::wire::{extract_id, CellInfoRecord, NetworkTestPayload};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

const CELL_INFOS_PATH: &str = "/api/get_cell_infos/";
const ADD_CELL_INFO_PATH: &str = "/api/add_cell_info/";
const ADD_TEST_PATH: &str = "/api/add_test/";

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request to {path} failed with status {status}: {body}")]
    Status {
        path: &'static str,
        status: StatusCode,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct BackendRepository {
    host: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl BackendRepository {
    pub fn new(host: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn build_list_url(&self, phone_number: &str, since_ms: i64) -> String {
        format!(
            "{}{}?phone_number={}&from={}",
            self.host,
            CELL_INFOS_PATH,
            urlencoding::encode(phone_number),
            since_ms
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Token {}", token)),
            None => request,
        }
    }

    async fn check_status(
        path: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { path, status, body }.into());
        }
        Ok(response)
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &'static str, body: &T) -> Result<Option<i64>> {
        let url = format!("{}{}", self.host, path);
        let response = self
            .authorize(self.client.post(&url))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", path))?;

        let response = Self::check_status(path, response).await?;
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", path))?;

        let id = extract_id(&body);
        if id.is_none() {
            tracing::debug!("Backend accepted {} without an id: {}", path, body);
        }
        Ok(id)
    }
}

#[async_trait]
impl MeasurementRepository for BackendRepository {
    async fn list_samples(&self, phone_number: &str, since_ms: i64) -> Result<Vec<MeasurementSample>> {
        let url = self.build_list_url(phone_number, since_ms);
        tracing::debug!("Fetching cell infos: {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to backend")?;

        let records = Self::check_status(CELL_INFOS_PATH, response)
            .await?
            .json::<Vec<CellInfoRecord>>()
            .await
            .context("Failed to parse backend cell infos")?;

        let total = records.len();
        // The backend returns every device's records and may ignore the range
        let samples: Vec<MeasurementSample> = records
            .into_iter()
            .filter(|record| record.phone_number.as_deref() == Some(phone_number))
            .filter_map(|record| {
                let id = record.id;
                let sample = record.into_sample();
                if sample.is_none() {
                    tracing::warn!("Skipping cell info {:?} with unparseable timestamp", id);
                }
                sample
            })
            .filter(|s| s.timestamp_ms >= since_ms)
            .collect();

        tracing::debug!(
            "Kept {} of {} cell infos for {}",
            samples.len(),
            total,
            phone_number
        );
        Ok(samples)
    }

    async fn add_cell_info(&self, report: &MeasurementReport) -> Result<Option<i64>> {
        self.post_json(ADD_CELL_INFO_PATH, report).await
    }

    async fn add_test(&self, test: &NetworkTest) -> Result<Option<i64>> {
        self.post_json(ADD_TEST_PATH, &NetworkTestPayload::from(test)).await
    }
}
