//! Crew assignment endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use livecrew_common::db::SegmentAssignment;

use crate::db::assignments::{self, NewAssignment};
use crate::error::ApiResult;
use crate::AppState;

/// GET /api/segments/:id/assignments
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<SegmentAssignment>>> {
    let Path(segment_id) = path?;
    Ok(Json(assignments::list_assignments(&state.db, segment_id).await?))
}

/// POST /api/segments/:id/assignments
pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<NewAssignment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SegmentAssignment>)> {
    let Path(segment_id) = path?;
    let Json(input) = body?;
    let assignment = assignments::assign(&state.db, segment_id, input).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/assignments/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    assignments::unassign(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
