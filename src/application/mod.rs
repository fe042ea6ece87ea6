// Application layer - Aggregation and use cases
pub mod aggregator;
pub mod dashboard_service;
pub mod enrichment_service;
pub mod measurement_repository;
pub mod streaming_service;
