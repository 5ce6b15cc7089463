//! Title definition endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use livecrew_common::db::TitleDefinition;

use crate::db::title_definitions::{self, NewTitleDefinition, TitleDefinitionUpdate};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/productions/:id/title-definitions
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<TitleDefinition>>> {
    let Path(production_id) = path?;
    Ok(Json(
        title_definitions::list_title_definitions(&state.db, production_id).await?,
    ))
}

/// POST /api/productions/:id/title-definitions
pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewTitleDefinition>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TitleDefinition>)> {
    let Path(production_id) = path?;
    let Json(input) = body?;
    let title =
        title_definitions::create_title_definition(&state.db, production_id, input).await?;
    Ok((StatusCode::CREATED, Json(title)))
}

/// GET /api/title-definitions/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<TitleDefinition>> {
    let Path(id) = path?;
    Ok(Json(title_definitions::get_title_definition(&state.db, id).await?))
}

/// PATCH /api/title-definitions/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<TitleDefinitionUpdate>, JsonRejection>,
) -> ApiResult<Json<TitleDefinition>> {
    let Path(id) = path?;
    let Json(input) = body?;
    Ok(Json(
        title_definitions::update_title_definition(&state.db, id, input).await?,
    ))
}

/// DELETE /api/title-definitions/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    title_definitions::delete_title_definition(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
