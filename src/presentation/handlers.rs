// HTTP request handlers
use crate::domain::network_type::{classify_generation, classify_technology};
use crate::domain::observation::{CellObservation, NetworkTest, ObservationError};
use crate::domain::radio::{resolve_channel as resolve, RadioSample, Rat};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::json_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub minutes: Option<i64>,
}

impl RangeQuery {
    fn minutes_or(&self, default_minutes: i64) -> i64 {
        self.minutes.filter(|m| *m > 0).unwrap_or(default_minutes)
    }
}

#[derive(Debug, Serialize)]
pub struct NetworkTypeInfo {
    pub code: i32,
    #[serde(rename = "gen")]
    pub generation: String,
    pub tech: String,
}

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "error": message.to_string() }))).into_response()
}

async fn respond<T: Serialize>(data: &T, headers: &HeaderMap) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard for a device in one response
pub async fn get_dashboard(
    Path(phone_number): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let minutes = query.minutes_or(state.dashboard_service.default_minutes());

    match state.dashboard_service.get_dashboard(&phone_number, minutes).await {
        Ok(dashboard) => respond(&dashboard, &headers).await,
        Err(e) => {
            tracing::error!("Error building dashboard for {}: {:#}", phone_number, e);
            error_response(StatusCode::BAD_GATEWAY, "measurement backend unavailable")
        }
    }
}

/// Stream dashboard for a device (progressive loading)
pub async fn stream_dashboard(
    Path(phone_number): Path<String>,
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let minutes = query.minutes_or(state.dashboard_service.default_minutes());
    let compress = accepts_brotli(&headers);

    let rx = state.streaming_service.stream_dashboard(&phone_number, minutes).await;
    stream_from_receiver(rx, compress).await
}

/// Frequency and band for a channel number
pub async fn resolve_channel(Path((rat, channel)): Path<(String, i64)>, headers: HeaderMap) -> Response {
    let rat: Rat = match rat.parse() {
        Ok(rat) => rat,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    respond(&resolve(RadioSample::new(rat, channel)), &headers).await
}

pub async fn classify_network_type(Path(code): Path<i32>) -> Json<NetworkTypeInfo> {
    Json(NetworkTypeInfo {
        code,
        generation: classify_generation(code),
        tech: classify_technology(code),
    })
}

/// Enrich an observation and store it upstream
pub async fn submit_observation(
    State(state): State<Arc<AppState>>,
    Json(observation): Json<CellObservation>,
) -> Response {
    match state.enrichment_service.submit(&observation).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(e) => match e.downcast_ref::<ObservationError>() {
            Some(rejected) => error_response(StatusCode::UNPROCESSABLE_ENTITY, rejected),
            None => {
                tracing::error!("Error storing observation: {:#}", e);
                error_response(StatusCode::BAD_GATEWAY, "measurement backend unavailable")
            }
        },
    }
}

pub async fn submit_test(
    State(state): State<Arc<AppState>>,
    Json(test): Json<NetworkTest>,
) -> Response {
    match state.enrichment_service.submit_test(&test).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        Err(e) => {
            tracing::error!("Error storing {} test: {:#}", test.kind.type_name(), e);
            error_response(StatusCode::BAD_GATEWAY, "measurement backend unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_service::DashboardService;
    use crate::application::enrichment_service::EnrichmentService;
    use crate::application::measurement_repository::memory::MemoryRepository;
    use crate::application::measurement_repository::MeasurementRepository;
    use crate::application::streaming_service::StreamingDashboardService;
    use crate::domain::measurement::{CategoryField, MeasurementSample};
    use crate::infrastructure::config::{ChartConfig, DashboardConfig, ViewConfig};
    use serde_json::Value;

    fn state(repository: Arc<dyn MeasurementRepository>) -> State<Arc<AppState>> {
        let config = DashboardConfig {
            default_minutes: 60,
            charts: vec![ChartConfig {
                id: "genDistribution".to_string(),
                title: "Generations".to_string(),
                kind: "pie".to_string(),
                view: ViewConfig::CategoryCount {
                    field: CategoryField::Generation,
                },
            }],
        };

        State(Arc::new(AppState {
            dashboard_service: DashboardService::new(repository.clone(), config.clone()),
            streaming_service: StreamingDashboardService::new(repository.clone(), config),
            enrichment_service: EnrichmentService::new(repository),
        }))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn observation() -> CellObservation {
        CellObservation {
            phone_number: "0912".to_string(),
            lat: Some(35.7),
            lng: Some(51.4),
            network_type: 20,
            plmn: Some("43211".to_string()),
            cid: Some(1),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_channel() {
        let response =
            resolve_channel(Path(("lte".to_string(), 1300)), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["bandLabel"], "Band 3");
    }

    #[tokio::test]
    async fn test_resolve_channel_rejects_unknown_rat() {
        let response =
            resolve_channel(Path(("cdma".to_string(), 1)), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classify_network_type() {
        let Json(info) = classify_network_type(Path(20)).await;
        assert_eq!(info.generation, "5G");
        assert_eq!(info.code, 20);
        assert_eq!(serde_json::to_value(&info).unwrap()["gen"], "5G");
    }

    #[tokio::test]
    async fn test_get_dashboard() {
        let repository = Arc::new(MemoryRepository::with_samples(vec![MeasurementSample {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            generation: Some("4G".to_string()),
            ..Default::default()
        }]));

        let response = get_dashboard(
            Path("0912".to_string()),
            Query(RangeQuery { minutes: None }),
            HeaderMap::new(),
            state(repository),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["sampleCount"], 1);
        assert_eq!(body["charts"][0]["data"][0]["name"], "4G");
    }

    #[tokio::test]
    async fn test_get_dashboard_backend_failure() {
        let response = get_dashboard(
            Path("0912".to_string()),
            Query(RangeQuery { minutes: Some(5) }),
            HeaderMap::new(),
            state(Arc::new(MemoryRepository::failing())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_submit_observation() {
        let response = submit_observation(
            state(Arc::new(MemoryRepository::default())),
            Json(observation()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["id"], 1);
    }

    #[tokio::test]
    async fn test_submit_observation_status_codes() {
        let rejected = CellObservation {
            cid: None,
            ..observation()
        };
        let response =
            submit_observation(state(Arc::new(MemoryRepository::default())), Json(rejected)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response =
            submit_observation(state(Arc::new(MemoryRepository::failing())), Json(observation()))
                .await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_submit_observation_accepts_lowercase_rat() {
        let observation: CellObservation = serde_json::from_value(json!({
            "phone_number": "0912",
            "lat": 35.7,
            "lng": 51.4,
            "network_type": 13,
            "rat": "lte",
            "channel": 1300,
            "plmn": "43211",
            "cid": 9
        }))
        .unwrap();
        let repository = Arc::new(MemoryRepository::default());

        let response = submit_observation(state(repository.clone()), Json(observation)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let reports = repository.reports.lock().unwrap();
        assert_eq!(reports[0].freq_band.as_deref(), Some("Band 3"));
        assert_eq!(reports[0].generation, "4G");
    }

    #[test]
    fn test_range_query_falls_back_to_default() {
        assert_eq!(RangeQuery { minutes: None }.minutes_or(60), 60);
        assert_eq!(RangeQuery { minutes: Some(0) }.minutes_or(60), 60);
        assert_eq!(RangeQuery { minutes: Some(15) }.minutes_or(60), 15);
    }
}
