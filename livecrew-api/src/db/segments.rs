//! Segment queries
//!
//! Segments form the agenda of a production. Their `order` is dense and
//! 1-based per production; insert, move and delete go through the ordering
//! planner and the two-phase writer in one transaction each.

use chrono::{DateTime, Duration, Utc};
use livecrew_common::db::{Segment, SEGMENTS};
use livecrew_common::ordering::{plan_delete, plan_insert, plan_move};
use livecrew_common::{Error, Position, Result};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::productions::fetch_production;
use super::require_name;

/// Body of `POST /api/productions/:id/segments`
#[derive(Debug, Clone, Deserialize)]
pub struct NewSegment {
    pub name: String,
    #[serde(default)]
    pub duration_minutes: i64,
    #[serde(default)]
    pub is_break: bool,
    /// Requested position; appended when absent, clamped when past the end
    pub order: Option<Position>,
}

/// Body of `PATCH /api/segments/:id`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentUpdate {
    pub name: Option<String>,
    pub duration_minutes: Option<i64>,
    pub is_break: Option<bool>,
    pub order: Option<Position>,
}

/// Segment with its planned start relative to the production
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledSegment {
    pub id: i64,
    pub name: String,
    pub order: i64,
    pub is_break: bool,
    pub duration_minutes: i64,
    pub start_offset_minutes: i64,
    pub starts_at: Option<DateTime<Utc>>,
}

/// Running order of a production with cumulative timings
#[derive(Debug, Clone, Serialize)]
pub struct ProductionRuntime {
    pub production_id: i64,
    pub total_minutes: i64,
    pub ends_at: Option<DateTime<Utc>>,
    pub segments: Vec<ScheduledSegment>,
}

/// Longest single segment accepted (one day)
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

fn check_duration(minutes: i64) -> Result<()> {
    if minutes < 0 {
        return Err(Error::InvalidInput(format!(
            "duration_minutes must not be negative, got {}",
            minutes
        )));
    }
    if minutes > MAX_DURATION_MINUTES {
        return Err(Error::InvalidInput(format!(
            "duration_minutes must be at most {}, got {}",
            MAX_DURATION_MINUTES, minutes
        )));
    }
    Ok(())
}

/// Wall-clock time `offset` minutes after `start`
fn time_after(start: DateTime<Utc>, offset: i64) -> Result<DateTime<Utc>> {
    Duration::try_minutes(offset)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| {
            Error::Internal(format!("{} minutes after {} is out of range", offset, start))
        })
}

async fn fetch_segment<'e, E>(executor: E, id: i64) -> Result<Segment>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Segment>(
        r#"
        SELECT id, production_id, name, duration_minutes, is_break, sort_order,
               created_at, updated_at
        FROM segments
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::NotFound(format!("segment {}", id)))
}

/// Segments of a production in running order
pub async fn list_segments(db: &SqlitePool, production_id: i64) -> Result<Vec<Segment>> {
    fetch_production(db, production_id).await?;

    let rows = sqlx::query_as::<_, Segment>(
        r#"
        SELECT id, production_id, name, duration_minutes, is_break, sort_order,
               created_at, updated_at
        FROM segments
        WHERE production_id = ?
        ORDER BY sort_order
        "#,
    )
    .bind(production_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get_segment(db: &SqlitePool, id: i64) -> Result<Segment> {
    fetch_segment(db, id).await
}

/// Insert a segment, shifting later segments down one slot
pub async fn create_segment(
    db: &SqlitePool,
    production_id: i64,
    input: NewSegment,
) -> Result<Segment> {
    let name = require_name(&input.name, "segment")?;
    check_duration(input.duration_minutes)?;

    let mut tx = db.begin().await?;
    fetch_production(&mut *tx, production_id).await?;

    let siblings = SEGMENTS.siblings(&mut tx, production_id).await?;
    let plan = plan_insert(&siblings, input.order);
    debug!(
        production_id,
        requested = ?input.order,
        position = plan.position,
        shifted = plan.shifts.len(),
        "Inserting segment"
    );

    SEGMENTS.stage(&mut tx, &plan.shifts, plan.offset).await?;

    let now = Utc::now();
    let id = sqlx::query(
        r#"
        INSERT INTO segments (
            production_id, name, duration_minutes, is_break, sort_order,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(production_id)
    .bind(&name)
    .bind(input.duration_minutes)
    .bind(input.is_break)
    .bind(plan.position)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    SEGMENTS.restore(&mut tx, &plan.shifts, plan.offset).await?;

    let segment = fetch_segment(&mut *tx, id).await?;
    tx.commit().await?;

    info!(
        production_id,
        segment_id = id,
        order = segment.order,
        "Created segment"
    );
    Ok(segment)
}

/// Update a segment's fields and, when `order` is given, move it
pub async fn update_segment(db: &SqlitePool, id: i64, input: SegmentUpdate) -> Result<Segment> {
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "segment"))
        .transpose()?;
    if let Some(minutes) = input.duration_minutes {
        check_duration(minutes)?;
    }

    let mut tx = db.begin().await?;
    let production_id = SEGMENTS.group_of(&mut tx, id).await?;

    if let Some(target) = input.order {
        let siblings = SEGMENTS.siblings(&mut tx, production_id).await?;
        let plan = plan_move(&siblings, id, target)?;
        SEGMENTS.apply_move(&mut tx, &plan).await?;
    }

    sqlx::query(
        r#"
        UPDATE segments
        SET name = COALESCE(?, name),
            duration_minutes = COALESCE(?, duration_minutes),
            is_break = COALESCE(?, is_break),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(input.duration_minutes)
    .bind(input.is_break)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let segment = fetch_segment(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(segment)
}

/// Delete a segment and its assignments, then close the gap
pub async fn delete_segment(db: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = db.begin().await?;
    let production_id = SEGMENTS.group_of(&mut tx, id).await?;
    let siblings = SEGMENTS.siblings(&mut tx, production_id).await?;
    let plan = plan_delete(&siblings, id)?;

    sqlx::query("DELETE FROM segment_assignments WHERE segment_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    SEGMENTS.apply_delete(&mut tx, &plan).await?;
    tx.commit().await?;

    info!(production_id, segment_id = id, "Deleted segment");
    Ok(())
}

/// Cumulative schedule of a production, used for callsheets
pub async fn production_runtime(db: &SqlitePool, production_id: i64) -> Result<ProductionRuntime> {
    let production = fetch_production(db, production_id).await?;
    let segments = list_segments(db, production_id).await?;

    let mut offset: i64 = 0;
    let mut scheduled = Vec::with_capacity(segments.len());
    for segment in segments {
        let starts_at = production
            .starts_at
            .map(|start| time_after(start, offset))
            .transpose()?;
        let next = offset.checked_add(segment.duration_minutes).ok_or_else(|| {
            Error::Internal(format!(
                "runtime of production {} overflows at segment {}",
                production_id, segment.id
            ))
        })?;

        scheduled.push(ScheduledSegment {
            id: segment.id,
            name: segment.name,
            order: segment.order,
            is_break: segment.is_break,
            duration_minutes: segment.duration_minutes,
            start_offset_minutes: offset,
            starts_at,
        });
        offset = next;
    }

    Ok(ProductionRuntime {
        production_id,
        total_minutes: offset,
        ends_at: production
            .starts_at
            .map(|start| time_after(start, offset))
            .transpose()?,
        segments: scheduled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::productions::{create_production, NewProduction};
    use livecrew_common::db::init_memory_database;

    async fn setup() -> (SqlitePool, i64) {
        let db = init_memory_database().await.unwrap();
        let production = create_production(
            &db,
            NewProduction {
                name: "Derby".to_string(),
                home_team: String::new(),
                away_team: String::new(),
                starts_at: Some("2026-03-14T19:00:00Z".parse().unwrap()),
            },
        )
        .await
        .unwrap();
        (db, production.id)
    }

    fn segment(name: &str, minutes: i64) -> NewSegment {
        NewSegment {
            name: name.to_string(),
            duration_minutes: minutes,
            is_break: false,
            order: None,
        }
    }

    #[tokio::test]
    async fn test_append_assigns_next_order() {
        let (db, production) = setup().await;
        let first = create_segment(&db, production, segment("Pre-show", 15)).await.unwrap();
        let second = create_segment(&db, production, segment("First half", 35)).await.unwrap();

        assert_eq!(first.order, 1);
        assert_eq!(second.order, 2);
    }

    #[tokio::test]
    async fn test_create_in_missing_production() {
        let (db, _) = setup().await;
        let err = create_segment(&db, 404, segment("Pre-show", 15)).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_negative_duration_rejected() {
        let (db, production) = setup().await;
        let err = create_segment(&db, production, segment("Oops", -5)).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_overlong_duration_rejected() {
        let (db, production) = setup().await;
        let err = create_segment(&db, production, segment("Marathon", i64::MAX / 2))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let day = create_segment(&db, production, segment("Telethon", MAX_DURATION_MINUTES))
            .await
            .unwrap();
        let err = update_segment(
            &db,
            day.id,
            SegmentUpdate {
                duration_minutes: Some(MAX_DURATION_MINUTES + 1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_payload_only_update_keeps_order() {
        let (db, production) = setup().await;
        create_segment(&db, production, segment("Pre-show", 15)).await.unwrap();
        let half = create_segment(&db, production, segment("First half", 35)).await.unwrap();

        let updated = update_segment(
            &db,
            half.id,
            SegmentUpdate {
                duration_minutes: Some(30),
                order: Some(Position::new(2).unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.order, 2);
        assert_eq!(updated.duration_minutes, 30);
        assert_eq!(updated.name, "First half");
    }

    #[tokio::test]
    async fn test_runtime_accumulates_offsets() {
        let (db, production) = setup().await;
        create_segment(&db, production, segment("Pre-show", 15)).await.unwrap();
        create_segment(&db, production, segment("First half", 35)).await.unwrap();
        create_segment(&db, production, segment("Halftime", 10)).await.unwrap();

        let runtime = production_runtime(&db, production).await.unwrap();
        assert_eq!(runtime.total_minutes, 60);
        assert_eq!(
            runtime
                .segments
                .iter()
                .map(|s| s.start_offset_minutes)
                .collect::<Vec<_>>(),
            vec![0, 15, 50]
        );
        assert_eq!(
            runtime.segments[2].starts_at,
            Some("2026-03-14T19:50:00Z".parse().unwrap())
        );
        assert_eq!(runtime.ends_at, Some("2026-03-14T20:00:00Z".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_runtime_out_of_range_is_an_error() {
        let (db, production) = setup().await;
        create_segment(&db, production, segment("Pre-show", 15)).await.unwrap();
        for order in [2, 3, 4] {
            sqlx::query(
                r#"
                INSERT INTO segments (
                    production_id, name, duration_minutes, is_break, sort_order,
                    created_at, updated_at
                ) VALUES (?, 'Imported', ?, 0, ?, ?, ?)
                "#,
            )
            .bind(production)
            .bind(i64::MAX / 2)
            .bind(order)
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(&db)
            .await
            .unwrap();
        }

        let err = production_runtime(&db, production).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));

        sqlx::query("UPDATE productions SET starts_at = NULL WHERE id = ?")
            .bind(production)
            .execute(&db)
            .await
            .unwrap();
        let err = production_runtime(&db, production).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
