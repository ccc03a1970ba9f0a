use std::path::Path;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

pub mod config;
pub mod domain;
pub mod errors;
pub mod firestore;
pub mod http;
pub mod logging;

use firestore::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub cv_data_path: Arc<Path>,
    pub static_dir: Arc<Path>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, cv_data_path: &Path, static_dir: &Path) -> Self {
        Self {
            store,
            cv_data_path: Arc::from(cv_data_path),
            static_dir: Arc::from(static_dir),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let index_page = state.static_dir.join("index.html");
    let static_dir = state.static_dir.to_path_buf();

    Router::new()
        .route("/api/cv-data", get(http::handlers::cv_data))
        .route("/api/contact", post(http::handlers::submit_contact))
        .route("/api/analytics", post(http::handlers::track_analytics))
        .route("/api/stats", get(http::handlers::site_stats))
        .route("/health", get(http::handlers::health))
        .route_service("/", ServeFile::new(index_page))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(http::handlers::not_found)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
