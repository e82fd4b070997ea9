//! Annotation loading API handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::ingest::Shape;
use crate::service::LoadSummary;
use crate::AppState;

/// Query parameters for annotation loads
#[derive(Debug, Deserialize)]
pub struct LoadQuery {
    /// Declared source shape; auto-detected when absent
    pub shape: Option<Shape>,
}

/// POST /api/annotations
///
/// Load an annotation source from the request body. The body is raw
/// delimited text or WER-log text, not JSON. Parsing never fails; the
/// summary reports how many rows were kept and skipped.
pub async fn load_annotations(
    State(state): State<AppState>,
    Query(query): Query<LoadQuery>,
    body: String,
) -> Json<LoadSummary> {
    Json(state.service.load_annotations(&body, query.shape).await)
}

/// POST /api/annotations/path request
#[derive(Debug, Deserialize)]
pub struct LoadFromPathRequest {
    pub path: String,
    pub shape: Option<Shape>,
}

/// POST /api/annotations/path
///
/// Load an annotation source from a file on the server. A missing or
/// non-file path is a 400.
pub async fn load_annotations_from_path(
    State(state): State<AppState>,
    Json(request): Json<LoadFromPathRequest>,
) -> ApiResult<Json<LoadSummary>> {
    let summary = state
        .service
        .load_annotations_from_path(&request.path, request.shape)
        .await?;
    Ok(Json(summary))
}
