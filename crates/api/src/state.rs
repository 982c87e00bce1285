use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::cost_provider::CostProvider;
use crate::engine::orchestrator::AdviceOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: florapack_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Process-wide cost cache over the tariff source.
    pub cost_provider: Arc<CostProvider>,
    /// Advice engine entry point (calculation and label application).
    pub orchestrator: Arc<AdviceOrchestrator>,
}
