// Domain layer - Radio, measurement and chart models
pub mod charts;
pub mod dashboard;
pub mod measurement;
pub mod network_type;
pub mod observation;
pub mod radio;
