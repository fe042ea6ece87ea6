// Repository trait for measurement storage
use crate::domain::measurement::MeasurementSample;
use crate::domain::observation::{MeasurementReport, NetworkTest};
use async_trait::async_trait;

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Samples recorded for a device at or after `since_ms`
    async fn list_samples(
        &self,
        phone_number: &str,
        since_ms: i64,
    ) -> anyhow::Result<Vec<MeasurementSample>>;

    /// Store an enriched cell record; returns the backend id when one is issued
    async fn add_cell_info(&self, report: &MeasurementReport) -> anyhow::Result<Option<i64>>;

    /// Store a network test result linked to a cell record
    async fn add_test(&self, test: &NetworkTest) -> anyhow::Result<Option<i64>>;
}
