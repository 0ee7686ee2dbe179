use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info, instrument};

use ranker::constants::DEFAULT_PREVIEW_LEN;
use ranker::embedding::TextEncoder;
use ranker::ranking::DocumentId;
use ranker::storage::{RankingStore, StorageResult};
use ranker::text::preview;

use crate::gateway::RANKER_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{QueryListResponse, RankPayload, RankResponse};
use crate::gateway::state::HandlerState;

#[instrument(skip(state, request), fields(query_id = tracing::field::Empty))]
pub async fn rank_handler<E>(
    State(state): State<HandlerState<E>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    E: TextEncoder + 'static,
{
    let payload: RankPayload = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    let request = payload.into_request();

    let query_preview = request.query.as_ref().map(|q| {
        tracing::Span::current().record("query_id", tracing::field::display(q.id()));
        preview(q.text(), DEFAULT_PREVIEW_LEN)
    });

    debug!(candidates = request.candidates.len(), "Processing rank request");

    let result = state
        .engine
        .rank_with_timeout(request, state.embed_timeout)
        .await?;

    let store = Arc::clone(&state.store);
    let stored = result.clone();
    let superseded = tokio::task::spawn_blocking(move || store.replace(stored))
        .await
        .map_err(|e| GatewayError::Internal(format!("store task failed: {}", e)))??;

    info!(
        run_id = %result.run_id,
        candidates = result.len(),
        superseded_run = ?superseded.map(|s| s.run_id),
        "Ranking stored"
    );

    Ok(make_response(
        StatusCode::OK,
        "ranked",
        RankResponse::from_result(&result, query_preview),
    ))
}

#[instrument(skip(state))]
pub async fn get_results_handler<E>(
    State(state): State<HandlerState<E>>,
    Path(query_id): Path<String>,
) -> Result<Response, GatewayError>
where
    E: TextEncoder + 'static,
{
    let query_id = DocumentId::new(query_id);
    let lookup = query_id.clone();
    let set = with_store(&state, move |store| store.get(&lookup))
        .await?
        .ok_or_else(|| GatewayError::NotFound(format!("no results for query {}", query_id)))?;

    Ok(make_response(
        StatusCode::OK,
        "found",
        RankResponse::from_result(&set, None),
    ))
}

#[instrument(skip(state))]
pub async fn delete_results_handler<E>(
    State(state): State<HandlerState<E>>,
    Path(query_id): Path<String>,
) -> Result<Response, GatewayError>
where
    E: TextEncoder + 'static,
{
    let query_id = DocumentId::new(query_id);
    let target = query_id.clone();
    let removed = with_store(&state, move |store| store.remove(&target)).await?;

    if !removed {
        return Err(GatewayError::NotFound(format!(
            "no results for query {}",
            query_id
        )));
    }

    info!(query_id = %query_id, "Results deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[instrument(skip(state))]
pub async fn list_results_handler<E>(
    State(state): State<HandlerState<E>>,
) -> Result<Response, GatewayError>
where
    E: TextEncoder + 'static,
{
    let query_ids = with_store(&state, |store| store.query_ids()).await?;
    Ok(make_response(
        StatusCode::OK,
        "listed",
        QueryListResponse { query_ids },
    ))
}

async fn with_store<E, T, F>(state: &HandlerState<E>, f: F) -> Result<T, GatewayError>
where
    E: TextEncoder + 'static,
    T: Send + 'static,
    F: FnOnce(&dyn RankingStore) -> StorageResult<T> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    let result = tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| GatewayError::Internal(format!("store task failed: {}", e)))??;
    Ok(result)
}

pub(crate) fn make_response<T: serde::Serialize>(
    status: StatusCode,
    ranker_status: &'static str,
    body: T,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(RANKER_STATUS_HEADER, HeaderValue::from_static(ranker_status));
    (status, headers, Json(body)).into_response()
}
