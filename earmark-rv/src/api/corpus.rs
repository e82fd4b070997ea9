//! Corpus build and playlist API handlers

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::service::PlaylistItem;
use crate::AppState;

/// POST /api/corpus request
#[derive(Debug, Deserialize)]
pub struct BuildCorpusRequest {
    pub root_path: String,
}

/// POST /api/corpus response
#[derive(Debug, Serialize)]
pub struct BuildCorpusResponse {
    pub entries_count: usize,
}

/// POST /api/corpus
///
/// Scan a directory tree for supported audio files and publish the
/// resulting index. An invalid root is a 400; a failed scan leaves any
/// previously built index in place.
pub async fn build_corpus(
    State(state): State<AppState>,
    Json(request): Json<BuildCorpusRequest>,
) -> ApiResult<Json<BuildCorpusResponse>> {
    let entries_count = state.service.build_corpus(&request.root_path).await?;
    Ok(Json(BuildCorpusResponse { entries_count }))
}

/// GET /api/playlist
///
/// Ordered corpus entries joined with their annotation records and
/// transcription info. Empty until a corpus is built.
pub async fn get_playlist(State(state): State<AppState>) -> Json<Vec<PlaylistItem>> {
    Json(state.service.playlist().await)
}
