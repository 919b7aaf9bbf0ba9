//! HTTP server and routes.

mod handlers;
mod state;

pub use state::AppState;

use crate::catalog::{NEWEST_PATH, SEARCH_PATH};
use crate::library::SHELF_PREFIX;
use crate::opds::SEARCH_DEFINITION_PATH;
use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::catalog_root))
        .route(SEARCH_DEFINITION_PATH, get(handlers::opensearch))
        .route(NEWEST_PATH, get(handlers::catalog_newest))
        .route(SEARCH_PATH, get(handlers::catalog_search))
        .route(SHELF_PREFIX, get(handlers::shelf))
        .route("/shelf/", get(handlers::shelf))
        .route("/shelf/{*path}", get(handlers::shelf))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
