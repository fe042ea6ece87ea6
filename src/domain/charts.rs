// Chart data domain models - aggregate views handed to the chart renderers
use crate::domain::measurement::Metric;
use serde::Serialize;
use std::collections::BTreeMap;

/// Share of total dwell time spent in one category, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPercentage {
    pub name: String,
    #[serde(rename = "value")]
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    #[serde(rename = "value")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBucket {
    pub range: String,
    pub count: usize,
}

/// Per-metric averages keyed by `Metric::average_key`
pub type MetricAverages = BTreeMap<&'static str, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    /// Bucket start, epoch milliseconds
    pub time: i64,
    pub label: String,
    #[serde(flatten)]
    pub averages: MetricAverages,
}

impl TimeSeriesPoint {
    #[cfg(test)]
    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.averages.get(metric.average_key()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    #[serde(rename = "groupKey")]
    pub group_key: String,
    #[serde(flatten)]
    pub averages: MetricAverages,
}

impl GroupAverage {
    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.averages.get(metric.average_key()).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Pie,
    Line,
    Bar,
    Area,
}

impl ChartKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "pie" => ChartKind::Pie,
            "bar" => ChartKind::Bar,
            "area" => ChartKind::Area,
            _ => ChartKind::Line,
        }
    }
}

/// Rows of one chart, shaped for its renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartSeries {
    Percentages(Vec<CategoryPercentage>),
    Counts(Vec<CategoryCount>),
    Histogram(Vec<HistogramBucket>),
    TimeSeries(Vec<TimeSeriesPoint>),
    Groups(Vec<GroupAverage>),
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Percentages(rows) => rows.len(),
            ChartSeries::Counts(rows) => rows.len(),
            ChartSeries::Histogram(rows) => rows.len(),
            ChartSeries::TimeSeries(rows) => rows.len(),
            ChartSeries::Groups(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub data: ChartSeries,
}

impl ChartData {
    pub fn new(id: String, title: String, kind: ChartKind, data: ChartSeries) -> Self {
        Self {
            id,
            title,
            kind,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chart_rows_use_renderer_field_names() {
        let pie = ChartSeries::Percentages(vec![CategoryPercentage {
            name: "LTE".to_string(),
            percent: 75.0,
        }]);
        assert_eq!(
            serde_json::to_value(&pie).unwrap(),
            json!([{ "name": "LTE", "value": 75.0 }])
        );

        let mut averages = MetricAverages::new();
        averages.insert(Metric::Rsrp.average_key(), -90.5);
        let point = TimeSeriesPoint {
            time: 300_000,
            label: "00:05".to_string(),
            averages,
        };
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({ "time": 300_000, "label": "00:05", "avgRsrp": -90.5 })
        );
        assert_eq!(point.average(Metric::Rsrp), Some(-90.5));
        assert_eq!(point.average(Metric::Rsrq), None);
    }

    #[test]
    fn test_chart_kind_defaults_to_line() {
        assert_eq!(ChartKind::parse("pie"), ChartKind::Pie);
        assert_eq!(ChartKind::parse("sparkline"), ChartKind::Line);
    }
}
