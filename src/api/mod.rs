use crate::{
    error::{FieldIssue, GatewayError, StoreError, ValidationError},
    history::HistoryStore,
    models::{HistoryEntry, SearchResult, VideoResult, VideoSummary},
    resolver::ResolverClient,
    search::SearchClient,
    validation,
};
use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub resolver: ResolverClient,
    pub search: SearchClient,
    pub history: Arc<HistoryStore>,
}

impl AppState {
    pub fn new(
        resolver: ResolverClient,
        search: SearchClient,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            resolver,
            search,
            history,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Failures the alternate routes report as a flat 500.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Gateway(GatewayError::UpstreamUnavailable { status, .. }) => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(match status {
                    Some(_) => StatusCode::BAD_GATEWAY,
                    None => StatusCode::SERVICE_UNAVAILABLE,
                }),
            ApiError::Gateway(GatewayError::SchemaMismatch(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Gateway(GatewayError::SearchFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldIssue>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ApiError::Validation(err) => ErrorBody {
                error: message,
                fields: err.issues,
            },
            _ => ErrorBody {
                error: message,
                fields: Vec::new(),
            },
        };
        if status.is_server_error() {
            tracing::error!(%status, "{}", body.error);
        }
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/youtube/fetch", post(fetch_video))
        .route("/api/youtube/search", post(search_videos))
        .route(
            "/api/download-history",
            get(list_history).post(add_history).delete(clear_history),
        )
        .route("/api/search", get(search_summaries))
        .route("/api/video-info", get(video_info))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(bind_addr: String, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {bind_addr}"))?;
    tracing::info!("API server listening on {}", bind_addr);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to install Ctrl+C handler: {err}");
    }
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ValidationError::single("body", rejection.body_text()).into())
}

async fn fetch_video(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<VideoResult> {
    let request = validation::validate_fetch_request(&json_body(payload)?)?;
    let video = state.resolver.fetch(&request.url).await?;
    Ok(Json(video))
}

async fn search_videos(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Vec<SearchResult>> {
    let request = validation::validate_search_request(&json_body(payload)?)?;
    let results = state.search.search(&request.query).await?;
    Ok(Json(results))
}

async fn add_history(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<HistoryEntry> {
    let entry = validation::validate_history_insert(&json_body(payload)?)?;
    let stored = state.history.add(entry)?;
    Ok(Json(stored))
}

async fn list_history(State(state): State<AppState>) -> ApiResult<Vec<HistoryEntry>> {
    Ok(Json(state.history.list()?))
}

async fn clear_history(State(state): State<AppState>) -> ApiResult<Value> {
    state.history.clear()?;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

async fn search_summaries(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<VideoSummary>> {
    let query = validation::require_param("q", params.q.as_deref())?;
    let results = state.search.search_summaries(&query).await?;
    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfoParams {
    pub video_id: Option<String>,
}

async fn video_info(
    State(state): State<AppState>,
    Query(params): Query<VideoInfoParams>,
) -> ApiResult<Value> {
    let video_id = validation::require_param("videoId", params.video_id.as_deref())?;
    let info = state
        .resolver
        .video_info(&video_id)
        .await
        .map_err(|err| ApiError::Internal(format!("failed to fetch video info: {err}")))?;
    Ok(Json(info))
}
