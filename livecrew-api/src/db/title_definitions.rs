//! Title definition queries
//!
//! Lower-thirds share the segment ordering contract: dense, 1-based,
//! unique per production.

use chrono::Utc;
use livecrew_common::db::{TitleDefinition, TITLE_DEFINITIONS};
use livecrew_common::ordering::{plan_delete, plan_insert, plan_move};
use livecrew_common::{Error, Position, Result};
use serde::Deserialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::productions::fetch_production;
use super::require_name;

fn default_enabled() -> bool {
    true
}

/// Body of `POST /api/productions/:id/title-definitions`
#[derive(Debug, Clone, Deserialize)]
pub struct NewTitleDefinition {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub order: Option<Position>,
}

/// Body of `PATCH /api/title-definitions/:id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleDefinitionUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<Position>,
}

async fn fetch_title_definition<'e, E>(executor: E, id: i64) -> Result<TitleDefinition>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TitleDefinition>(
        r#"
        SELECT id, production_id, name, enabled, sort_order, created_at, updated_at
        FROM title_definitions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| Error::NotFound(format!("title definition {}", id)))
}

pub async fn list_title_definitions(
    db: &SqlitePool,
    production_id: i64,
) -> Result<Vec<TitleDefinition>> {
    fetch_production(db, production_id).await?;

    let rows = sqlx::query_as::<_, TitleDefinition>(
        r#"
        SELECT id, production_id, name, enabled, sort_order, created_at, updated_at
        FROM title_definitions
        WHERE production_id = ?
        ORDER BY sort_order
        "#,
    )
    .bind(production_id)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get_title_definition(db: &SqlitePool, id: i64) -> Result<TitleDefinition> {
    fetch_title_definition(db, id).await
}

pub async fn create_title_definition(
    db: &SqlitePool,
    production_id: i64,
    input: NewTitleDefinition,
) -> Result<TitleDefinition> {
    let name = require_name(&input.name, "title definition")?;

    let mut tx = db.begin().await?;
    fetch_production(&mut *tx, production_id).await?;

    let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production_id).await?;
    let plan = plan_insert(&siblings, input.order);
    debug!(
        production_id,
        position = plan.position,
        shifted = plan.shifts.len(),
        "Inserting title definition"
    );

    TITLE_DEFINITIONS.stage(&mut tx, &plan.shifts, plan.offset).await?;

    let now = Utc::now();
    let id = sqlx::query(
        r#"
        INSERT INTO title_definitions (
            production_id, name, enabled, sort_order, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(production_id)
    .bind(&name)
    .bind(input.enabled)
    .bind(plan.position)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    TITLE_DEFINITIONS.restore(&mut tx, &plan.shifts, plan.offset).await?;

    let title = fetch_title_definition(&mut *tx, id).await?;
    tx.commit().await?;

    info!(production_id, title_definition_id = id, "Created title definition");
    Ok(title)
}

pub async fn update_title_definition(
    db: &SqlitePool,
    id: i64,
    input: TitleDefinitionUpdate,
) -> Result<TitleDefinition> {
    let name = input
        .name
        .as_deref()
        .map(|n| require_name(n, "title definition"))
        .transpose()?;

    let mut tx = db.begin().await?;
    let production_id = TITLE_DEFINITIONS.group_of(&mut tx, id).await?;

    if let Some(target) = input.order {
        let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production_id).await?;
        let plan = plan_move(&siblings, id, target)?;
        TITLE_DEFINITIONS.apply_move(&mut tx, &plan).await?;
    }

    sqlx::query(
        r#"
        UPDATE title_definitions
        SET name = COALESCE(?, name),
            enabled = COALESCE(?, enabled),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(input.enabled)
    .bind(Utc::now())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let title = fetch_title_definition(&mut *tx, id).await?;
    tx.commit().await?;

    Ok(title)
}

pub async fn delete_title_definition(db: &SqlitePool, id: i64) -> Result<()> {
    let mut tx = db.begin().await?;
    let production_id = TITLE_DEFINITIONS.group_of(&mut tx, id).await?;
    let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production_id).await?;
    let plan = plan_delete(&siblings, id)?;

    TITLE_DEFINITIONS.apply_delete(&mut tx, &plan).await?;
    tx.commit().await?;

    info!(production_id, title_definition_id = id, "Deleted title definition");
    Ok(())
}
