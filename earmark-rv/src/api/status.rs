//! Service status API handler

use axum::{extract::State, Json};

use crate::service::StatusView;
use crate::AppState;

/// GET /api/status
///
/// Current corpus root and counts for every loaded data kind.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusView> {
    Json(state.service.status().await)
}
