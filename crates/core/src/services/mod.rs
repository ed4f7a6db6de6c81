pub mod profit_service;
pub mod progress;
pub mod reconciliation_service;
pub mod refresh_coordinator;
pub mod retry_policy;
pub mod view_service;
