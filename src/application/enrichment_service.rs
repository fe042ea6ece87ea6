// Enrichment service - Turns raw device observations into backend reports
use crate::application::measurement_repository::MeasurementRepository;
use crate::domain::network_type::{classify_connection, classify_technology};
use crate::domain::observation::{CellObservation, MeasurementReport, NetworkTest, ObservationError};
use crate::domain::radio::{resolve_channel, RadioSample};
use crate::infrastructure::wire::format_timestamp;
use anyhow::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct EnrichmentService {
    repository: Arc<dyn MeasurementRepository>,
}

impl EnrichmentService {
    pub fn new(repository: Arc<dyn MeasurementRepository>) -> Self {
        Self { repository }
    }

    /// Enrich and store an observation, returning the backend id
    pub async fn submit(&self, observation: &CellObservation) -> Result<Option<i64>> {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let report = enrich(observation, now_ms)?;

        let id = self.repository.add_cell_info(&report).await?;
        tracing::info!(
            "Stored {} {} cell {} for {} (id {:?})",
            report.generation,
            report.tech,
            report.cid,
            report.phone_number,
            id
        );
        Ok(id)
    }

    pub async fn submit_test(&self, test: &NetworkTest) -> Result<Option<i64>> {
        let id = self.repository.add_test(test).await?;
        tracing::info!(
            "Stored {} test for cell info {} (id {:?})",
            test.kind.type_name(),
            test.cell_info,
            id
        );
        Ok(id)
    }
}

/// Build the backend report for an observation.
///
/// Location, cell id and PLMN are required; `now_ms` stamps observations
/// that arrive without their own timestamp.
pub fn enrich(observation: &CellObservation, now_ms: i64) -> Result<MeasurementReport, ObservationError> {
    if observation.phone_number.trim().is_empty() {
        return Err(ObservationError::EmptyPhoneNumber);
    }
    let (Some(lat), Some(lng)) = (observation.lat, observation.lng) else {
        return Err(ObservationError::MissingField("location"));
    };
    let cid = observation.cid.ok_or(ObservationError::MissingField("cid"))?;
    let plmn = observation
        .plmn
        .clone()
        .filter(|p| !p.trim().is_empty())
        .ok_or(ObservationError::MissingField("plmn"))?;

    let timestamp_ms = observation.timestamp_ms.unwrap_or(now_ms);
    let timestamp =
        format_timestamp(timestamp_ms).ok_or(ObservationError::InvalidTimestamp(timestamp_ms))?;

    let mut report = MeasurementReport {
        phone_number: observation.phone_number.clone(),
        lat,
        lng,
        timestamp,
        generation: classify_connection(observation.transport()),
        tech: classify_technology(observation.network_type),
        plmn,
        cid,
        lac: observation.lac,
        rac: observation.rac,
        tac: observation.tac,
        freq_band: None,
        afrn: None,
        freq: None,
        rsrp: observation.rsrp,
        rsrq: observation.rsrq,
        rscp: observation.rscp,
        ecno: observation.ecno,
        rxlev: observation.rxlev,
    };

    if let (Some(rat), Some(channel)) = (observation.rat, observation.channel) {
        let resolved = resolve_channel(RadioSample::new(rat, channel));
        if resolved.is_resolved() {
            report.freq = Some(resolved.frequency_mhz);
        } else {
            tracing::debug!("Channel {} is outside every {} range", channel, rat);
        }
        report.freq_band = Some(resolved.band_label);
        report.afrn = Some(channel);
    }

    Ok(report)
}
