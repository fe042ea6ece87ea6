// Dashboard domain model
use super::charts::ChartData;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    #[serde(rename = "sampleCount")]
    pub sample_count: usize,
    pub charts: Vec<ChartData>,
}

impl Dashboard {
    pub fn new(title: String, sample_count: usize, charts: Vec<ChartData>) -> Self {
        Self {
            title,
            sample_count,
            charts,
        }
    }

    #[cfg(test)]
    pub fn chart(&self, id: &str) -> Option<&ChartData> {
        self.charts.iter().find(|c| c.id == id)
    }
}
