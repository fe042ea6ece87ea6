// Observation domain model - raw readings from the device and the enriched report sent upstream
use crate::domain::network_type::Transport;
use crate::domain::radio::Rat;
use serde::{Deserialize, Serialize};

/// Which transport the device's default network was using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Wifi,
    #[default]
    Cellular,
    Disconnected,
    Other,
}

/// Raw radio and location readings for the registered cell
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellObservation {
    pub phone_number: String,
    #[serde(default)]
    pub timestamp_ms: Option<i64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub transport: TransportKind,
    /// OS data network-type code
    #[serde(default)]
    pub network_type: i32,
    #[serde(default)]
    pub rat: Option<Rat>,
    /// ARFCN, UARFCN, EARFCN or NR-ARFCN depending on `rat`
    #[serde(default)]
    pub channel: Option<i64>,
    #[serde(default)]
    pub plmn: Option<String>,
    #[serde(default)]
    pub cid: Option<i64>,
    #[serde(default)]
    pub lac: Option<i64>,
    #[serde(default)]
    pub rac: Option<i64>,
    #[serde(default)]
    pub tac: Option<i64>,
    #[serde(default)]
    pub rsrp: Option<f64>,
    #[serde(default)]
    pub rsrq: Option<f64>,
    #[serde(default)]
    pub rscp: Option<f64>,
    #[serde(default)]
    pub ecno: Option<f64>,
    #[serde(default)]
    pub rxlev: Option<f64>,
}

impl CellObservation {
    pub fn transport(&self) -> Transport {
        match self.transport {
            TransportKind::Wifi => Transport::Wifi,
            TransportKind::Cellular => Transport::Cellular(self.network_type),
            TransportKind::Disconnected => Transport::Disconnected,
            TransportKind::Other => Transport::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservationError {
    #[error("observation is missing {0}")]
    MissingField(&'static str),
    #[error("phone number must not be empty")]
    EmptyPhoneNumber,
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Enriched cell record, serialized with the backend's field names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementReport {
    pub phone_number: String,
    pub lat: f64,
    pub lng: f64,
    pub timestamp: String,
    #[serde(rename = "gen")]
    pub generation: String,
    pub tech: String,
    pub plmn: String,
    pub cid: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lac: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rac: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tac: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq_band: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub afrn: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsrp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsrq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rscp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecno: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rxlev: Option<f64>,
}

/// Active network test kinds run alongside a cell measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Dns,
    Ping,
    HttpDownload,
    HttpUpload,
    Web,
    Sms,
}

impl TestKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            TestKind::Dns => "dns",
            TestKind::Ping => "ping",
            TestKind::HttpDownload => "http_download",
            TestKind::HttpUpload => "http_upload",
            TestKind::Web => "web",
            TestKind::Sms => "sms",
        }
    }

    /// Name of the measured property in the test detail
    pub fn property(&self) -> &'static str {
        match self {
            TestKind::Dns => "time",
            TestKind::Ping => "latency",
            TestKind::HttpDownload | TestKind::HttpUpload => "throughput",
            TestKind::Web => "response_time",
            TestKind::Sms => "delivery_time",
        }
    }
}

/// Result of one network test, linked to the cell record it ran under
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkTest {
    pub kind: TestKind,
    pub phone_number: String,
    pub timestamp: String,
    pub cell_info: i64,
    pub value: f64,
}
