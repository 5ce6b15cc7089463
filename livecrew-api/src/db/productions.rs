//! Production queries

use chrono::{DateTime, Utc};
use livecrew_common::db::Production;
use livecrew_common::{Error, Result};
use serde::{Deserialize, Deserializer};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use super::require_name;

/// Body of `POST /api/productions`
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduction {
    pub name: String,
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    pub starts_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /api/productions/:id`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductionUpdate {
    pub name: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    /// `Some(None)` (JSON `null`) clears the kick-off time
    #[serde(default, deserialize_with = "present")]
    pub starts_at: Option<Option<DateTime<Utc>>>,
}

/// Marks a field that appeared in the body, even as `null`
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub(crate) async fn fetch_production<'e, E>(executor: E, id: i64) -> Result<Production>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Production>(
        r#"
        SELECT id, name, home_team, away_team, starts_at, created_at, updated_at
        FROM productions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::NotFound(format!("production {}", id)))
}

/// All productions, earliest kick-off first
pub async fn list_productions(db: &SqlitePool) -> Result<Vec<Production>> {
    let rows = sqlx::query_as::<_, Production>(
        r#"
        SELECT id, name, home_team, away_team, starts_at, created_at, updated_at
        FROM productions
        ORDER BY starts_at IS NULL, starts_at, id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get_production(db: &SqlitePool, id: i64) -> Result<Production> {
    fetch_production(db, id).await
}

pub async fn create_production(db: &SqlitePool, input: NewProduction) -> Result<Production> {
    let name = require_name(&input.name, "production")?;
    let now = Utc::now();

    let id = sqlx::query(
        r#"
        INSERT INTO productions (name, home_team, away_team, starts_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&name)
    .bind(input.home_team.trim())
    .bind(input.away_team.trim())
    .bind(input.starts_at)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?
    .last_insert_rowid();

    info!(production_id = id, name = %name, "Created production");

    fetch_production(db, id).await
}

pub async fn update_production(
    db: &SqlitePool,
    id: i64,
    input: ProductionUpdate,
) -> Result<Production> {
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "production"))
        .transpose()?;

    let result = sqlx::query(
        r#"
        UPDATE productions
        SET name = COALESCE(?, name),
            home_team = COALESCE(?, home_team),
            away_team = COALESCE(?, away_team),
            starts_at = CASE WHEN ? THEN ? ELSE starts_at END,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(input.home_team.as_deref().map(str::trim))
    .bind(input.away_team.as_deref().map(str::trim))
    .bind(input.starts_at.is_some())
    .bind(input.starts_at.flatten())
    .bind(Utc::now())
    .bind(id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("production {}", id)));
    }

    fetch_production(db, id).await
}

/// Delete a production together with its segments, assignments and titles
pub async fn delete_production(db: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM productions WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("production {}", id)));
    }

    info!(production_id = id, "Deleted production");
    Ok(())
}
