//! Segment endpoints
//!
//! `order` in request bodies is a 1-based position. Positions past the end
//! are clamped; zero, negative or fractional values are rejected with 400.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use livecrew_common::db::Segment;

use crate::db::segments::{self, NewSegment, SegmentUpdate};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/productions/:id/segments
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Segment>>> {
    let Path(production_id) = path?;
    Ok(Json(segments::list_segments(&state.db, production_id).await?))
}

/// POST /api/productions/:id/segments
pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewSegment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Segment>)> {
    let Path(production_id) = path?;
    let Json(input) = body?;
    let segment = segments::create_segment(&state.db, production_id, input).await?;
    Ok((StatusCode::CREATED, Json(segment)))
}

/// GET /api/segments/:id
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Segment>> {
    let Path(id) = path?;
    Ok(Json(segments::get_segment(&state.db, id).await?))
}

/// PATCH /api/segments/:id
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SegmentUpdate>, JsonRejection>,
) -> ApiResult<Json<Segment>> {
    let Path(id) = path?;
    let Json(input) = body?;
    Ok(Json(segments::update_segment(&state.db, id, input).await?))
}

/// DELETE /api/segments/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    segments::delete_segment(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
