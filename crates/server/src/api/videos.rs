//! Simulated video service endpoints.
//!
//! Item and transcript lookups and write-backs each pass their operation's
//! [`DegradingGate`](crate::degradation::DegradingGate) before touching the
//! catalog, so unknown ids pay the same latency as known ones.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vidwarn_core::{CatalogError, GateError, ItemMetadata, WarningsUpdate};

use crate::state::AppState;

const DEFAULT_LIST_SIZE: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    /// Number of ids to return.
    pub n: Option<usize>,
}

/// An item without its transcript.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub id: String,
    #[serde(flatten)]
    pub metadata: ItemMetadata,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Video not found: {}", id),
        }),
    )
}

fn unavailable(e: GateError) -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn catalog_error(id: &str, e: CatalogError) -> ApiError {
    match e {
        CatalogError::NotFound(_) => not_found(id),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: other.to_string(),
            }),
        ),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List up to `n` ids in catalog order.
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVideosQuery>,
) -> Json<Vec<String>> {
    tokio::time::sleep(state.list_delay()).await;
    let n = query.n.unwrap_or(DEFAULT_LIST_SIZE);
    Json(state.catalog().list_ids(n))
}

/// Get an item's metadata.
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    let delay = state.metadata_gate().admit().await.map_err(unavailable)?;
    debug!(item_id = %id, delay_ms = delay.as_millis() as u64, "Serving metadata");

    let item = state
        .catalog()
        .get(&id)
        .map_err(|e| catalog_error(&id, e))?;
    Ok(Json(VideoResponse {
        metadata: item.metadata(),
        id: item.id,
    }))
}

/// Get an item's transcript as plain text.
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let delay = state.transcript_gate().admit().await.map_err(unavailable)?;
    debug!(item_id = %id, delay_ms = delay.as_millis() as u64, "Serving transcript");

    let item = state
        .catalog()
        .get(&id)
        .map_err(|e| catalog_error(&id, e))?;
    Ok(item.transcript)
}

/// Replace an item's warnings.
pub async fn update_warnings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<WarningsUpdate>,
) -> Result<Json<&'static str>, ApiError> {
    state.update_gate().admit().await.map_err(unavailable)?;

    let count = update.warnings.len();
    state
        .catalog()
        .replace_warnings(&id, update.warnings)
        .map_err(|e| catalog_error(&id, e))?;
    debug!(item_id = %id, warnings = count, "Warnings replaced");
    Ok(Json("success"))
}
