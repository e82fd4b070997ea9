//! earmark-rv library - Audio Review module
//!
//! Serves the review workflow over HTTP: build an index of an audio corpus,
//! load annotation and candidate sources against it, stream whole files or
//! padded segments, and append labeling decisions to a persistent log.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod corpus;
pub mod error;
pub mod ingest;
pub mod labels;
pub mod segment;
pub mod service;

pub use service::ReviewService;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Coordinating review service
    pub service: Arc<ReviewService>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: ReviewService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/corpus", post(api::corpus::build_corpus))
        .route("/api/playlist", get(api::corpus::get_playlist))
        .route("/api/annotations", post(api::annotations::load_annotations))
        .route(
            "/api/annotations/path",
            post(api::annotations::load_annotations_from_path),
        )
        .route("/api/audio/:name", get(api::audio::get_audio_file))
        .route("/api/segment/:name", get(api::audio::get_segment))
        .route(
            "/api/labels",
            post(api::labels::append_label).get(api::labels::list_labels),
        )
        .route("/api/status", get(api::status::get_status))
        .merge(api::health::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
