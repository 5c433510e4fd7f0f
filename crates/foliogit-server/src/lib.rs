//! Admin HTTP backend for a statically published portfolio site
//!
//! Everything lives under `/api/admin`. A login secret buys a signed
//! session cookie; every other endpoint demands that cookie before it
//! reads or publishes content through the configured [`SiteStore`]
//! backend.
//!
//! [`SiteStore`]: foliogit_store::SiteStore

pub mod handlers;
pub mod sections;
pub mod state;

pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest accepted upload body. Media files are photographs and video
/// stills, so a generous cap well above typical asset size.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the admin API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/admin/login", post(handlers::login))
        .route("/api/admin/logout", post(handlers::logout))
        .route("/api/admin/verify", get(handlers::verify))
        .route(
            "/api/admin/content",
            get(handlers::content_get).post(handlers::content_update),
        )
        .route(
            "/api/admin/media/files",
            get(handlers::media_files).put(handlers::media_upload),
        )
        .route("/api/admin/upload", post(handlers::media_upload))
        .route("/api/admin/media/delete", delete(handlers::media_delete))
        .route("/api/admin/stats/media", get(handlers::media_stats))
        .route("/api/admin/debug/env", get(handlers::debug_env))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
