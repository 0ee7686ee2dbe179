//! HTTP gateway (Axum) for ranking and stored results.
//!
//! This module is primarily used by the `ranker` server binary.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use handler::{
    delete_results_handler, get_results_handler, list_results_handler, rank_handler,
};
pub use state::HandlerState;

use ranker::constants::STUB_MODEL_ID;
use ranker::embedding::TextEncoder;

use crate::gateway::handler::make_response;

/// Response header carrying a short machine-readable outcome.
pub const RANKER_STATUS_HEADER: &str = "x-ranker-status";

pub fn create_router_with_state<E>(state: HandlerState<E>) -> Router
where
    E: TextEncoder + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<E>))
        .route("/v1/rank", post(rank_handler::<E>))
        .route("/v1/results", get(list_results_handler::<E>))
        .route(
            "/v1/results/{query_id}",
            get(get_results_handler::<E>).delete(delete_results_handler::<E>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ComponentStatus {
    pub encoder_mode: String,
    pub model_id: String,
    pub embedding_dim: usize,
    pub store: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    make_response(
        StatusCode::OK,
        "healthy",
        HealthResponse {
            status: "ok".to_string(),
        },
    )
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<E>(State(state): State<HandlerState<E>>) -> Response
where
    E: TextEncoder + 'static,
{
    let encoder = state.engine.encoder();
    let encoder_mode = if encoder.model_id() == STUB_MODEL_ID {
        "stub"
    } else {
        "model"
    };

    make_response(
        StatusCode::OK,
        "ready",
        ReadyResponse {
            status: "ok".to_string(),
            components: ComponentStatus {
                encoder_mode: encoder_mode.to_string(),
                model_id: encoder.model_id().to_string(),
                embedding_dim: encoder.embedding_dim(),
                store: state.store.kind().to_string(),
            },
        },
    )
}
