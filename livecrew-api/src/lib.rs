//! livecrew-api library - production planning service
//!
//! REST endpoints for productions, their ordered segments and title
//! definitions, and per-segment crew assignments.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod db;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    let productions = Router::new()
        .route(
            "/api/productions",
            get(api::productions::list).post(api::productions::create),
        )
        .route(
            "/api/productions/:id",
            get(api::productions::get)
                .patch(api::productions::update)
                .delete(api::productions::delete),
        )
        .route("/api/productions/:id/runtime", get(api::productions::runtime));

    let segments = Router::new()
        .route(
            "/api/productions/:id/segments",
            get(api::segments::list).post(api::segments::create),
        )
        .route(
            "/api/segments/:id",
            get(api::segments::get)
                .patch(api::segments::update)
                .delete(api::segments::delete),
        )
        .route(
            "/api/segments/:id/assignments",
            get(api::assignments::list).post(api::assignments::create),
        )
        .route("/api/assignments/:id", delete(api::assignments::delete));

    let titles = Router::new()
        .route(
            "/api/productions/:id/title-definitions",
            get(api::title_definitions::list).post(api::title_definitions::create),
        )
        .route(
            "/api/title-definitions/:id",
            get(api::title_definitions::get)
                .patch(api::title_definitions::update)
                .delete(api::title_definitions::delete),
        );

    Router::new()
        .merge(productions)
        .merge(segments)
        .merge(titles)
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
