// Backend JSON records and their mapping to domain models
use crate::domain::measurement::MeasurementSample;
use crate::domain::observation::NetworkTest;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cell record as returned by `GET /api/get_cell_infos/`
#[derive(Debug, Clone, Deserialize)]
pub struct CellInfoRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub timestamp: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, rename = "gen")]
    pub generation: Option<String>,
    #[serde(default)]
    pub tech: Option<String>,
    #[serde(default)]
    pub plmn: Option<Value>,
    #[serde(default)]
    pub tac: Option<Value>,
    #[serde(default)]
    pub freq_band: Option<Value>,
    #[serde(default)]
    pub rsrp: Option<f64>,
    #[serde(default)]
    pub rsrq: Option<f64>,
    #[serde(default)]
    pub ecno: Option<f64>,
    #[serde(default)]
    pub rxlev: Option<f64>,
}

/// Text form of a loosely typed JSON field; numbers and strings both occur
fn as_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        }),
        _ => None,
    }
}

fn as_integer(value: Option<Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Milliseconds since the epoch; naive timestamps are taken as UTC
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.timestamp_millis());
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|time| time.and_utc().timestamp_millis())
}

pub fn format_timestamp(timestamp_ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|time| time.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
}

impl CellInfoRecord {
    /// `None` when the timestamp cannot be parsed
    pub fn into_sample(self) -> Option<MeasurementSample> {
        let timestamp_ms = parse_timestamp(&self.timestamp)?;

        Some(MeasurementSample {
            timestamp_ms,
            generation: self.generation.filter(|s| !s.is_empty()),
            tech: self.tech.filter(|s| !s.is_empty()),
            plmn: as_text(self.plmn),
            tac: as_text(self.tac),
            freq_band: as_text(self.freq_band),
            rsrp: self.rsrp,
            rsrq: self.rsrq,
            ecno: self.ecno,
            rxlev: self.rxlev,
        })
    }
}

/// Body of `POST /api/add_test/`
#[derive(Debug, Clone, Serialize)]
pub struct NetworkTestPayload {
    pub type_: String,
    pub phone_number: String,
    pub timestamp: String,
    pub cell_info: i64,
    pub detail: serde_json::Map<String, Value>,
}

impl From<&NetworkTest> for NetworkTestPayload {
    fn from(test: &NetworkTest) -> Self {
        let mut detail = serde_json::Map::new();
        detail.insert(test.kind.property().to_string(), Value::from(test.value));

        Self {
            type_: test.kind.type_name().to_string(),
            phone_number: test.phone_number.clone(),
            timestamp: test.timestamp.clone(),
            cell_info: test.cell_info,
            detail,
        }
    }
}

/// Id assigned by the backend, if the response carries one
pub fn extract_id(body: &str) -> Option<i64> {
    let value: Value = serde_json::from_str(body).ok()?;
    as_integer(value.get("id").cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::TestKind;
    use serde_json::json;

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("1970-01-01 00:00:01.500"), Some(1500));
        assert_eq!(parse_timestamp("1970-01-01T00:01:00"), Some(60_000));
        assert_eq!(parse_timestamp("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1500).as_deref(),
            Some("1970-01-01 00:00:01.500")
        );
    }

    #[test]
    fn test_record_into_sample() {
        let record: CellInfoRecord = serde_json::from_value(json!({
            "id": 7,
            "phone_number": "09120000000",
            "timestamp": "2024-03-01 10:00:00",
            "lat": 35.7,
            "lng": 51.4,
            "gen": "4G",
            "tech": "LTE",
            "plmn": 43211,
            "cid": 123456,
            "tac": 5021,
            "freq_band": "Band 3",
            "afrn": 1300.0,
            "freq": 1815.0,
            "rsrp": -95,
            "rsrq": null
        }))
        .unwrap();

        let sample = record.into_sample().unwrap();
        assert_eq!(sample.plmn.as_deref(), Some("43211"));
        assert_eq!(sample.tac.as_deref(), Some("5021"));
        assert_eq!(sample.generation.as_deref(), Some("4G"));
        assert_eq!(sample.freq_band.as_deref(), Some("Band 3"));
        assert_eq!(sample.rsrp, Some(-95.0));
        assert_eq!(sample.rsrq, None);
    }

    #[test]
    fn test_record_with_bad_timestamp_is_dropped() {
        let record: CellInfoRecord =
            serde_json::from_value(json!({ "timestamp": "not a time" })).unwrap();
        assert!(record.into_sample().is_none());
    }

    #[test]
    fn test_network_test_payload() {
        let test = NetworkTest {
            kind: TestKind::Ping,
            phone_number: "09120000000".to_string(),
            timestamp: "2024-03-01 10:00:00".to_string(),
            cell_info: 42,
            value: 31.5,
        };

        let payload = serde_json::to_value(NetworkTestPayload::from(&test)).unwrap();
        assert_eq!(
            payload,
            json!({
                "type_": "ping",
                "phone_number": "09120000000",
                "timestamp": "2024-03-01 10:00:00",
                "cell_info": 42,
                "detail": { "latency": 31.5 }
            })
        );
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(extract_id(r#"{"id": 12}"#), Some(12));
        assert_eq!(extract_id(r#"{"id": "12"}"#), Some(12));
        assert_eq!(extract_id(r#"{"status": "ok"}"#), None);
        assert_eq!(extract_id("created"), None);
    }
}
