use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use grounder_index::IndexError;

use super::server::AppState;

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Deserialize)]
pub(crate) struct StatusParams {
    repo: Option<String>,
}

#[derive(Serialize)]
struct StatusResponse {
    total: usize,
    processed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at_ms: Option<i64>,
}

pub(crate) async fn status_handler(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Response {
    let Some(repo) = params.repo.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "repo is required");
    };

    let response = state.progress.get(repo).map_or(
        StatusResponse {
            total: 0,
            processed: 0,
            started_at_ms: None,
        },
        |progress| StatusResponse {
            total: progress.total,
            processed: progress.processed,
            started_at_ms: Some(progress.started_at_ms),
        },
    );

    Json(response).into_response()
}

#[derive(Deserialize)]
pub(crate) struct ReindexRequest {
    repo: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ReindexResponse {
    indexed: usize,
}

fn reindex_error(err: &IndexError) -> (StatusCode, &'static str) {
    match err {
        IndexError::NoIndexableFiles { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "no files eligible for indexing",
        ),
        IndexError::InvalidChunkConfig { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "invalid chunking configuration",
        ),
        IndexError::Source(_) | IndexError::IndexingFailed(_) => (
            StatusCode::BAD_GATEWAY,
            "failed to fetch repository files",
        ),
        IndexError::EmbeddingFailed(_) | IndexError::Store(_) | IndexError::Llm(_) => {
            (StatusCode::BAD_GATEWAY, "failed to store embeddings")
        }
    }
}

pub(crate) async fn reindex_handler(
    State(state): State<AppState>,
    Json(payload): Json<ReindexRequest>,
) -> Response {
    let repo = payload.repo.trim();
    if repo.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "repo is required");
    }
    let Some(token) = payload.token.or_else(|| state.github_token.clone()) else {
        return error_response(StatusCode::UNAUTHORIZED, "authentication missing");
    };

    match state.indexer.reindex(&token, repo).await {
        Ok(indexed) => Json(ReindexResponse { indexed }).into_response(),
        Err(e) => {
            tracing::error!(repo, error = %e, "reindex failed");
            let (status, message) = reindex_error(&e);
            error_response(status, message)
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ContextRequest {
    repo: String,
    query: String,
}

#[derive(Serialize)]
struct ContextResponse {
    chunks: Vec<grounder_index::store::RetrievedChunk>,
}

/// Retrieval never fails outward: errors degrade to an empty context set.
pub(crate) async fn context_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContextRequest>,
) -> Response {
    let repo = payload.repo.trim();
    let query = payload.query.trim();
    if repo.is_empty() || query.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "repo and query are required");
    }

    let chunks = match state.retriever.retrieve(repo, query).await {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!(repo, error = %e, "retrieval degraded to empty context");
            Vec::new()
        }
    };

    Json(ContextResponse { chunks }).into_response()
}

#[derive(Deserialize)]
pub(crate) struct DraftRequest {
    repo: String,
    description: String,
    token: Option<String>,
}

pub(crate) async fn draft_handler(
    State(state): State<AppState>,
    Json(payload): Json<DraftRequest>,
) -> Response {
    let repo = payload.repo.trim();
    let description = payload.description.trim();
    if repo.is_empty() || description.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "repo and description are required");
    }

    let token = payload.token.or_else(|| state.github_token.clone());
    let context = match token {
        Some(token) => Some(state.github.repo_context(&token, repo).await),
        None => None,
    };

    let retrieved = match state.retriever.retrieve(repo, description).await {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!(repo, error = %e, "drafting without retrieved context");
            Vec::new()
        }
    };

    match grounder_draft::draft_issue(
        state.provider.as_ref(),
        repo,
        description,
        context.as_ref(),
        &retrieved,
    )
    .await
    {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => {
            tracing::error!(repo, error = %e, "draft generation failed");
            error_response(StatusCode::BAD_GATEWAY, "draft generation failed")
        }
    }
}
