//! Signal Engine - technical-analysis trading signals over live or synthetic prices

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use axum::Router;
use config::Config;
use services::SignalOrchestrator;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: Arc<SignalOrchestrator>,
}

impl AppState {
    /// Build state with the pipeline wired from `config`.
    pub fn from_config(config: Config) -> Self {
        let orchestrator = SignalOrchestrator::from_config(&config);
        Self::new(config, orchestrator)
    }

    pub fn new(config: Config, orchestrator: SignalOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        }
    }
}

/// Build the HTTP application.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
