// Dashboard service - Use case for building chart dashboards
use crate::application::aggregator;
use crate::application::measurement_repository::MeasurementRepository;
use crate::domain::charts::{ChartData, ChartKind, ChartSeries};
use crate::domain::dashboard::Dashboard;
use crate::domain::measurement::MeasurementSample;
use crate::infrastructure::config::{ChartConfig, DashboardConfig, ViewConfig};
use std::sync::Arc;

const MS_PER_MINUTE: i64 = 60 * 1000;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn MeasurementRepository>,
    dashboard_config: DashboardConfig,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn MeasurementRepository>, dashboard_config: DashboardConfig) -> Self {
        Self {
            repository,
            dashboard_config,
        }
    }

    pub fn default_minutes(&self) -> i64 {
        self.dashboard_config.default_minutes
    }

    pub async fn get_dashboard(&self, phone_number: &str, minutes: i64) -> anyhow::Result<Dashboard> {
        let title = format!("{} measurements (last {}m)", phone_number, minutes);
        let samples = self
            .repository
            .list_samples(phone_number, window_start_ms(minutes))
            .await?;

        let charts = build_charts(&self.dashboard_config.charts, &samples);
        tracing::debug!(
            "Built {} charts from {} samples for {}",
            charts.len(),
            samples.len(),
            phone_number
        );

        Ok(Dashboard::new(title, samples.len(), charts))
    }
}

/// Start of the look-back window, epoch milliseconds
pub fn window_start_ms(minutes: i64) -> i64 {
    chrono::Utc::now()
        .timestamp_millis()
        .saturating_sub(minutes.max(0).saturating_mul(MS_PER_MINUTE))
}

/// Charts with at least one row, in configured order
pub fn build_charts(configs: &[ChartConfig], samples: &[MeasurementSample]) -> Vec<ChartData> {
    configs
        .iter()
        .filter(|c| is_view_available(&c.view, samples))
        .filter_map(|c| {
            let data = compute_view(&c.view, samples);
            (!data.is_empty()).then(|| chart_data(c, data))
        })
        .collect()
}

pub fn chart_data(config: &ChartConfig, data: ChartSeries) -> ChartData {
    ChartData::new(
        config.id.clone(),
        config.title.clone(),
        ChartKind::parse(&config.kind),
        data,
    )
}

/// A view is available when there is at least one sample and, for metric
/// views, at least one sample carries one of its metrics
pub fn is_view_available(view: &ViewConfig, samples: &[MeasurementSample]) -> bool {
    if samples.is_empty() {
        return false;
    }

    let metrics = view.metrics();
    metrics.is_empty()
        || samples
            .iter()
            .any(|s| metrics.iter().any(|m| m.value(s).is_some()))
}

pub fn compute_view(view: &ViewConfig, samples: &[MeasurementSample]) -> ChartSeries {
    match view {
        ViewConfig::DwellPercentage { field } => {
            ChartSeries::Percentages(aggregator::category_dwell_percentages(samples, *field))
        }
        ViewConfig::CategoryCount { field } => {
            ChartSeries::Counts(aggregator::category_counts(samples, *field))
        }
        ViewConfig::Histogram {
            metric,
            bucket_width,
        } => ChartSeries::Histogram(aggregator::histogram(samples, *metric, *bucket_width)),
        ViewConfig::TimeSeries {
            metrics,
            window_minutes,
        } => ChartSeries::TimeSeries(aggregator::time_windowed_average(
            samples,
            window_minutes.saturating_mul(MS_PER_MINUTE),
            metrics,
        )),
        ViewConfig::GroupAverage {
            field,
            metrics,
            key_prefix,
        } => {
            let mut groups = aggregator::group_average(samples, *field, metrics);
            if let Some(prefix) = key_prefix {
                for group in &mut groups {
                    group.group_key = format!("{}{}", prefix, group.group_key);
                }
            }
            ChartSeries::Groups(groups)
        }
    }
}
