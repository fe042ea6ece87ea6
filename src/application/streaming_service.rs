// Streaming dashboard service - Progressive loading over chunked JSON
use crate::application::dashboard_service::{
    chart_data, compute_view, is_view_available, window_start_ms,
};
use crate::application::measurement_repository::MeasurementRepository;
use crate::domain::charts::{ChartData, ChartKind};
use crate::infrastructure::config::{ChartConfig, DashboardConfig};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSkeleton {
    #[serde(rename = "dashboardId")]
    pub dashboard_id: String,
    #[serde(rename = "sampleCount")]
    pub sample_count: usize,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionEvent {
    pub charts: usize,
    #[serde(rename = "durationMs")]
    pub duration_ms: i64,
}

/// One message of the progressive dashboard stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    ChartUpdate(ChartData),
    Complete(CompletionEvent),
}

#[derive(Clone)]
pub struct StreamingDashboardService {
    repository: Arc<dyn MeasurementRepository>,
    dashboard_config: DashboardConfig,
}

impl StreamingDashboardService {
    pub fn new(repository: Arc<dyn MeasurementRepository>, dashboard_config: DashboardConfig) -> Self {
        Self {
            repository,
            dashboard_config,
        }
    }

    /// Skeleton first, then one update per chart with rows, then completion
    pub async fn stream_dashboard(
        &self,
        phone_number: &str,
        minutes: i64,
    ) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(100);
        let start_time = Instant::now();

        let samples = match self
            .repository
            .list_samples(phone_number, window_start_ms(minutes))
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!("Error fetching samples for {}: {:#}", phone_number, e);
                Vec::new()
            }
        };
        let samples = Arc::new(samples);

        // 1. Skeleton with the charts that can have data
        let available: Vec<ChartConfig> = self
            .dashboard_config
            .charts
            .iter()
            .filter(|c| {
                let available = is_view_available(&c.view, &samples);
                if !available {
                    tracing::debug!("Skipping chart {} - no data for its view", c.id);
                }
                available
            })
            .cloned()
            .collect();

        let skeleton = build_skeleton(phone_number, samples.len(), &available);
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        // 2. One task per chart
        let mut handles = Vec::with_capacity(available.len());
        for chart_config in available {
            let tx = tx.clone();
            let samples = samples.clone();

            handles.push(tokio::spawn(async move {
                let data = compute_view(&chart_config.view, &samples);
                if data.is_empty() {
                    return false;
                }
                let update = StreamMessage::ChartUpdate(chart_data(&chart_config, data));
                tx.send(update).await.is_ok()
            }));
        }

        // 3. Completion once every chart task has finished
        tokio::spawn(async move {
            let mut sent = 0;
            for handle in handles {
                match handle.await {
                    Ok(true) => sent += 1,
                    Ok(false) => {}
                    Err(e) => tracing::error!("Chart task failed: {}", e),
                }
            }

            let complete = CompletionEvent {
                charts: sent,
                duration_ms: start_time.elapsed().as_millis() as i64,
            };
            let _ = tx.send(StreamMessage::Complete(complete)).await;
        });

        rx
    }
}

fn build_skeleton(
    phone_number: &str,
    sample_count: usize,
    charts: &[ChartConfig],
) -> DashboardSkeleton {
    DashboardSkeleton {
        dashboard_id: phone_number.to_string(),
        sample_count,
        charts: charts
            .iter()
            .map(|c| ChartSkeleton {
                id: c.id.clone(),
                title: c.title.clone(),
                kind: ChartKind::parse(&c.kind),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::measurement_repository::memory::MemoryRepository;
    use crate::domain::measurement::{CategoryField, MeasurementSample, Metric};
    use crate::infrastructure::config::ViewConfig;
    use tokio_stream::wrappers::ReceiverStream;
    use tokio_stream::StreamExt;

    fn config() -> DashboardConfig {
        DashboardConfig {
            default_minutes: 60,
            charts: vec![
                ChartConfig {
                    id: "genDistribution".to_string(),
                    title: "Generations".to_string(),
                    kind: "pie".to_string(),
                    view: ViewConfig::DwellPercentage {
                        field: CategoryField::Generation,
                    },
                },
                ChartConfig {
                    id: "rxlevDistribution".to_string(),
                    title: "RXLEV".to_string(),
                    kind: "bar".to_string(),
                    view: ViewConfig::Histogram {
                        metric: Metric::Rxlev,
                        bucket_width: 5.0,
                    },
                },
                ChartConfig {
                    id: "rsrpDistribution".to_string(),
                    title: "RSRP".to_string(),
                    kind: "bar".to_string(),
                    view: ViewConfig::Histogram {
                        metric: Metric::Rsrp,
                        bucket_width: 5.0,
                    },
                },
            ],
        }
    }

    async fn collect(rx: mpsc::Receiver<StreamMessage>) -> Vec<StreamMessage> {
        ReceiverStream::new(rx).collect().await
    }

    #[tokio::test]
    async fn test_stream_sends_skeleton_updates_and_completion() {
        let now = chrono::Utc::now().timestamp_millis();
        let samples = vec![
            MeasurementSample {
                timestamp_ms: now - 1_000,
                generation: Some("4G".to_string()),
                rsrp: Some(-97.0),
                ..Default::default()
            },
            MeasurementSample {
                timestamp_ms: now - 500,
                generation: Some("5G".to_string()),
                ..Default::default()
            },
        ];
        let service = StreamingDashboardService::new(
            Arc::new(MemoryRepository::with_samples(samples)),
            config(),
        );

        let messages = collect(service.stream_dashboard("0912", 60).await).await;

        assert_eq!(messages.len(), 4);
        match &messages[0] {
            StreamMessage::Skeleton(skeleton) => {
                let ids: Vec<&str> = skeleton.charts.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["genDistribution", "rsrpDistribution"]);
                assert_eq!(skeleton.sample_count, 2);
            }
            other => panic!("expected skeleton, got {other:?}"),
        }

        let mut updated: Vec<&str> = messages[1..3]
            .iter()
            .map(|m| match m {
                StreamMessage::ChartUpdate(chart) => chart.id.as_str(),
                other => panic!("expected chart update, got {other:?}"),
            })
            .collect();
        updated.sort();
        assert_eq!(updated, vec!["genDistribution", "rsrpDistribution"]);

        match &messages[3] {
            StreamMessage::Complete(done) => assert_eq!(done.charts, 2),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_survives_repository_failure() {
        let service =
            StreamingDashboardService::new(Arc::new(MemoryRepository::failing()), config());

        let messages = collect(service.stream_dashboard("0912", 60).await).await;

        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], StreamMessage::Skeleton(s) if s.charts.is_empty()));
        assert!(matches!(&messages[1], StreamMessage::Complete(c) if c.charts == 0));
    }

    #[test]
    fn test_message_tagging() {
        let msg = StreamMessage::Complete(CompletionEvent {
            charts: 3,
            duration_ms: 12,
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({ "type": "complete", "charts": 3, "durationMs": 12 })
        );
    }
}
