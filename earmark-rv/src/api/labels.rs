//! Label log API handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiResult;
use crate::labels::LabelRecord;
use crate::service::AppendLabelRequest;
use crate::AppState;

/// POST /api/labels
///
/// Validate and append one labeling decision. Returns 201 with the record
/// as persisted, timing fields rounded. Validation failures are a 400 and
/// leave the log untouched.
pub async fn append_label(
    State(state): State<AppState>,
    Json(request): Json<AppendLabelRequest>,
) -> ApiResult<(StatusCode, Json<LabelRecord>)> {
    let record = state.service.append_label(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/labels
///
/// Every persisted label in file order. Empty when the log does not exist
/// yet.
pub async fn list_labels(State(state): State<AppState>) -> ApiResult<Json<Vec<LabelRecord>>> {
    let records = state.service.read_labels().await?;
    Ok(Json(records))
}
