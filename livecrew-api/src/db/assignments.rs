//! Segment crew assignments

use chrono::Utc;
use livecrew_common::db::SegmentAssignment;
use livecrew_common::{Error, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;

/// Body of `POST /api/segments/:id/assignments`
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    pub position: String,
    pub person: String,
}

async fn ensure_segment(db: &SqlitePool, segment_id: i64) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM segments WHERE id = ?)")
        .bind(segment_id)
        .fetch_one(db)
        .await?;

    if !exists {
        return Err(Error::NotFound(format!("segment {}", segment_id)));
    }
    Ok(())
}

pub async fn list_assignments(db: &SqlitePool, segment_id: i64) -> Result<Vec<SegmentAssignment>> {
    ensure_segment(db, segment_id).await?;

    let rows = sqlx::query_as::<_, SegmentAssignment>(
        r#"
        SELECT id, segment_id, position, person, created_at
        FROM segment_assignments
        WHERE segment_id = ?
        ORDER BY position
        "#,
    )
    .bind(segment_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Put a person on a position for one segment
///
/// A position holds one person per segment; a second assignment is a `Conflict`.
pub async fn assign(
    db: &SqlitePool,
    segment_id: i64,
    input: NewAssignment,
) -> Result<SegmentAssignment> {
    let position = input.position.trim();
    let person = input.person.trim();
    if position.is_empty() || person.is_empty() {
        return Err(Error::InvalidInput(
            "position and person must not be empty".to_string(),
        ));
    }

    ensure_segment(db, segment_id).await?;

    let id = sqlx::query(
        r#"
        INSERT INTO segment_assignments (segment_id, position, person, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(segment_id)
    .bind(position)
    .bind(person)
    .bind(Utc::now())
    .execute(db)
    .await?
    .last_insert_rowid();

    info!(segment_id, position, person, "Assigned crew");

    sqlx::query_as::<_, SegmentAssignment>(
        "SELECT id, segment_id, position, person, created_at FROM segment_assignments WHERE id = ?",
    )
    .bind(id)
    .fetch_one(db)
    .await
    .map_err(Error::from)
}

pub async fn unassign(db: &SqlitePool, assignment_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM segment_assignments WHERE id = ?")
        .bind(assignment_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("assignment {}", assignment_id)));
    }
    Ok(())
}
