//! Audio serving API handlers

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Media type for a corpus filename, by extension
fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// GET /api/audio/:name
///
/// Serve a corpus file whole, in its original encoding. The name is
/// resolved through the corpus index, so stems work as well as full
/// filenames.
pub async fn get_audio_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let entry = state.service.resolve(&name).await?;

    // The file can vanish between indexing and the read
    let bytes = match tokio::fs::read(&entry.absolute_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "{} is gone from disk",
                entry.base_name
            )));
        }
        Err(e) => return Err(ApiError::Io(e)),
    };

    Ok((
        [("content-type", content_type_for(&entry.base_name))],
        bytes,
    )
        .into_response())
}

/// Query parameters for segment extraction
#[derive(Debug, Deserialize)]
pub struct SegmentQuery {
    pub start: f64,
    pub end: f64,
}

/// GET /api/segment/:name?start=..&end=..
///
/// Extract the requested window, padded on both sides and clipped to the
/// file, re-encoded as WAV.
pub async fn get_segment(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<SegmentQuery>,
) -> ApiResult<Response> {
    let bytes = state.service.extract(&name, query.start, query.end).await?;
    Ok(([("content-type", "audio/wav")], bytes).into_response())
}
