use crate::domain::measurement::{CategoryField, Metric};
use serde::Deserialize;

const ENV_PREFIX: &str = "CELL_TELEMETRY";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub host: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    /// Look-back window used when a request does not name one
    #[serde(default = "default_minutes")]
    pub default_minutes: i64,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

fn default_minutes() -> i64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub view: ViewConfig,
}

/// Which aggregation feeds a chart
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewConfig {
    DwellPercentage {
        field: CategoryField,
    },
    CategoryCount {
        field: CategoryField,
    },
    Histogram {
        metric: Metric,
        bucket_width: f64,
    },
    TimeSeries {
        metrics: Vec<Metric>,
        window_minutes: i64,
    },
    GroupAverage {
        field: CategoryField,
        metrics: Vec<Metric>,
        #[serde(default)]
        key_prefix: Option<String>,
    },
}

impl ViewConfig {
    /// Metrics the view reads, empty for purely categorical views
    pub fn metrics(&self) -> &[Metric] {
        match self {
            ViewConfig::Histogram { metric, .. } => std::slice::from_ref(metric),
            ViewConfig::TimeSeries { metrics, .. } | ViewConfig::GroupAverage { metrics, .. } => {
                metrics
            }
            ViewConfig::DwellPercentage { .. } | ViewConfig::CategoryCount { .. } => &[],
        }
    }
}

fn load(name: &str) -> anyhow::Result<config::Config> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    Ok(settings)
}

pub fn load_backend_config() -> anyhow::Result<BackendConfig> {
    Ok(load("config/backend")?.try_deserialize()?)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    Ok(load("config/dashboard")?.try_deserialize()?)
}
