// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::enrichment_service::EnrichmentService;
use crate::application::streaming_service::StreamingDashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub streaming_service: StreamingDashboardService,
    pub enrichment_service: EnrichmentService,
}
