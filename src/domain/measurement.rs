// Measurement domain model - stored samples, categorical fields and signal metrics
use serde::Deserialize;
use std::borrow::Cow;

/// Category name used when a sample has no value for a categorical field
pub const MISSING_CATEGORY: &str = "N/A";

/// One stored cell measurement, as fetched back from the backend
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementSample {
    pub timestamp_ms: i64,
    pub generation: Option<String>,
    pub tech: Option<String>,
    pub plmn: Option<String>,
    pub tac: Option<String>,
    pub freq_band: Option<String>,
    pub rsrp: Option<f64>,
    pub rsrq: Option<f64>,
    pub ecno: Option<f64>,
    pub rxlev: Option<f64>,
}

/// Categorical fields a sample can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum CategoryField {
    #[serde(rename = "gen")]
    Generation,
    #[serde(rename = "tech")]
    Technology,
    #[serde(rename = "freq_band")]
    FreqBand,
    #[serde(rename = "plmn")]
    Plmn,
    #[serde(rename = "tac")]
    Tac,
    #[serde(rename = "signal_quality")]
    SignalQuality,
}

impl CategoryField {
    pub fn value<'a>(&self, sample: &'a MeasurementSample) -> Option<Cow<'a, str>> {
        let field = match self {
            CategoryField::Generation => &sample.generation,
            CategoryField::Technology => &sample.tech,
            CategoryField::FreqBand => &sample.freq_band,
            CategoryField::Plmn => &sample.plmn,
            CategoryField::Tac => &sample.tac,
            CategoryField::SignalQuality => {
                return sample
                    .rsrq
                    .and_then(SignalQuality::from_rsrq)
                    .map(|q| Cow::Borrowed(q.label()));
            }
        };
        field.as_deref().map(Cow::Borrowed)
    }

    /// Category name of a sample; missing values collapse into [`MISSING_CATEGORY`]
    pub fn category_of(&self, sample: &MeasurementSample) -> String {
        self.value(sample)
            .map(Cow::into_owned)
            .unwrap_or_else(|| MISSING_CATEGORY.to_string())
    }
}

/// Numeric signal metrics carried by a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Rsrp,
    Rsrq,
    Ecno,
    Rxlev,
}

impl Metric {
    /// Present, finite value of this metric
    pub fn value(&self, sample: &MeasurementSample) -> Option<f64> {
        let value = match self {
            Metric::Rsrp => sample.rsrp,
            Metric::Rsrq => sample.rsrq,
            Metric::Ecno => sample.ecno,
            Metric::Rxlev => sample.rxlev,
        };
        value.filter(|v| v.is_finite())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Rsrp => "RSRP",
            Metric::Rsrq => "RSRQ",
            Metric::Ecno => "ECNO",
            Metric::Rxlev => "RXLEV",
        }
    }

    /// Key of this metric's average in chart records
    pub fn average_key(&self) -> &'static str {
        match self {
            Metric::Rsrp => "avgRsrp",
            Metric::Rsrq => "avgRsrq",
            Metric::Ecno => "avgEcno",
            Metric::Rxlev => "avgRxlev",
        }
    }
}

/// Coarse LTE link quality derived from RSRQ (dB)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SignalQuality {
    pub fn from_rsrq(rsrq: f64) -> Option<Self> {
        if !rsrq.is_finite() {
            return None;
        }
        let quality = if rsrq >= -7.0 {
            SignalQuality::Excellent
        } else if rsrq >= -10.0 {
            SignalQuality::Good
        } else if rsrq >= -15.0 {
            SignalQuality::Fair
        } else {
            SignalQuality::Poor
        };
        Some(quality)
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalQuality::Excellent => "Excellent",
            SignalQuality::Good => "Good",
            SignalQuality::Fair => "Fair",
            SignalQuality::Poor => "Poor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_category_is_distinct_and_stable() {
        let sample = MeasurementSample {
            tech: Some("LTE".to_string()),
            ..Default::default()
        };
        assert_eq!(CategoryField::Technology.category_of(&sample), "LTE");
        assert_eq!(CategoryField::Plmn.category_of(&sample), MISSING_CATEGORY);
        assert_eq!(
            CategoryField::Plmn.category_of(&sample),
            CategoryField::Plmn.category_of(&MeasurementSample::default())
        );
    }

    #[test]
    fn test_signal_quality_thresholds() {
        assert_eq!(SignalQuality::from_rsrq(-7.0), Some(SignalQuality::Excellent));
        assert_eq!(SignalQuality::from_rsrq(-9.5), Some(SignalQuality::Good));
        assert_eq!(SignalQuality::from_rsrq(-15.0), Some(SignalQuality::Fair));
        assert_eq!(SignalQuality::from_rsrq(-19.0), Some(SignalQuality::Poor));
        assert_eq!(SignalQuality::from_rsrq(f64::NAN), None);
    }

    #[test]
    fn test_signal_quality_category() {
        let sample = MeasurementSample {
            rsrq: Some(-12.0),
            ..Default::default()
        };
        assert_eq!(CategoryField::SignalQuality.category_of(&sample), "Fair");
        assert_eq!(
            CategoryField::SignalQuality.category_of(&MeasurementSample::default()),
            MISSING_CATEGORY
        );
    }

    #[test]
    fn test_metric_ignores_non_finite_values() {
        let sample = MeasurementSample {
            rsrp: Some(f64::NAN),
            rsrq: Some(-11.0),
            ..Default::default()
        };
        assert_eq!(Metric::Rsrp.value(&sample), None);
        assert_eq!(Metric::Rsrq.value(&sample), Some(-11.0));
        assert_eq!(Metric::Ecno.value(&sample), None);
    }
}
