//! Production endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use livecrew_common::db::Production;

use crate::db::productions::{self, NewProduction, ProductionUpdate};
use crate::db::segments::{self, ProductionRuntime};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/productions
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Production>>> {
    Ok(Json(productions::list_productions(&state.db).await?))
}

/// POST /api/productions
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewProduction>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Production>)> {
    let Json(input) = body?;
    let production = productions::create_production(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(production)))
}

/// GET /api/productions/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Production>> {
    let Path(id) = path?;
    Ok(Json(productions::get_production(&state.db, id).await?))
}

/// PATCH /api/productions/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ProductionUpdate>, JsonRejection>,
) -> ApiResult<Json<Production>> {
    let Path(id) = path?;
    let Json(input) = body?;
    Ok(Json(productions::update_production(&state.db, id, input).await?))
}

/// DELETE /api/productions/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    productions::delete_production(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/productions/:id/runtime
pub async fn runtime(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ProductionRuntime>> {
    let Path(id) = path?;
    Ok(Json(segments::production_runtime(&state.db, id).await?))
}
