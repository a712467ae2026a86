use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::orchestrator::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; holds the four stage clients.
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
