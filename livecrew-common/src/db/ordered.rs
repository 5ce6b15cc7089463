//! Transactional writer for densely ordered tables
//!
//! Applies plans from [`crate::ordering`] inside a caller-owned transaction.
//! SQLite checks `UNIQUE (production_id, sort_order)` on every row write, so
//! a ±1 shift of a run is done in two phases: park the rows at
//! `order ± offset`, write the subject row, then bring the parked rows back
//! by `offset - 1`.

use crate::ordering::{DeletePlan, MovePlan, Shift, Slot};
use crate::{Error, Result};
use sqlx::{Sqlite, Transaction};
use tracing::debug;

/// A table whose rows carry a dense `sort_order` within a group column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedTable {
    table: &'static str,
    group_column: &'static str,
    /// Human-readable row kind, used in error messages
    item: &'static str,
}

/// Production agenda
pub const SEGMENTS: OrderedTable = OrderedTable {
    table: "segments",
    group_column: "production_id",
    item: "segment",
};

/// Production lower-thirds
pub const TITLE_DEFINITIONS: OrderedTable = OrderedTable {
    table: "title_definitions",
    group_column: "production_id",
    item: "title definition",
};

impl OrderedTable {
    /// Current slots of every row in `group_id`, ascending
    pub async fn siblings(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        group_id: i64,
    ) -> Result<Vec<Slot>> {
        let sql = format!(
            "SELECT id, sort_order FROM {} WHERE {} = ? ORDER BY sort_order, id",
            self.table, self.group_column
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql)
            .bind(group_id)
            .fetch_all(&mut **tx)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(id, order)| Slot { id, order })
            .collect())
    }

    /// Group the row belongs to
    pub async fn group_of(&self, tx: &mut Transaction<'_, Sqlite>, id: i64) -> Result<i64> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", self.group_column, self.table);
        sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.item, id)))
    }

    /// Phase one: park every shifted row outside the live range
    pub async fn stage(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        shifts: &[Shift],
        offset: i64,
    ) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET sort_order = sort_order + ? WHERE id = ?",
            self.table
        );
        for shift in shifts {
            sqlx::query(&sql)
                .bind(shift.direction() * offset)
                .bind(shift.id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Phase two: bring parked rows back, one slot from where they started
    pub async fn restore(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        shifts: &[Shift],
        offset: i64,
    ) -> Result<()> {
        let sql = format!(
            "UPDATE {} SET sort_order = sort_order - ? WHERE id = ?",
            self.table
        );
        for shift in shifts {
            sqlx::query(&sql)
                .bind(shift.direction() * (offset - 1))
                .bind(shift.id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Write final orders directly; safe only when rows move toward free slots
    pub async fn renumber(&self, tx: &mut Transaction<'_, Sqlite>, shifts: &[Shift]) -> Result<()> {
        let sql = format!("UPDATE {} SET sort_order = ? WHERE id = ?", self.table);
        for shift in shifts {
            sqlx::query(&sql)
                .bind(shift.to)
                .bind(shift.id)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }

    /// Reposition the subject of a move and shift the rows in between
    pub async fn apply_move(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        plan: &MovePlan,
    ) -> Result<()> {
        if plan.is_noop() {
            return Ok(());
        }

        debug!(
            table = self.table,
            id = plan.id,
            from = plan.from,
            to = plan.to,
            shifted = plan.shifts.len(),
            "Moving row"
        );

        self.stage(tx, &plan.shifts, plan.offset).await?;

        let sql = format!("UPDATE {} SET sort_order = ? WHERE id = ?", self.table);
        sqlx::query(&sql)
            .bind(plan.to)
            .bind(plan.id)
            .execute(&mut **tx)
            .await?;

        self.restore(tx, &plan.shifts, plan.offset).await
    }

    /// Remove the subject of a delete and close the gap
    ///
    /// Dependent rows go with it through `ON DELETE CASCADE`.
    pub async fn apply_delete(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        plan: &DeletePlan,
    ) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?", self.table);
        let result = sqlx::query(&sql).bind(plan.id).execute(&mut **tx).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("{} {}", self.item, plan.id)));
        }

        debug!(
            table = self.table,
            id = plan.id,
            renumbered = plan.renumber.len(),
            "Deleted row"
        );

        self.renumber(tx, &plan.renumber).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use crate::ordering::{plan_delete, plan_insert, plan_move, Position};
    use chrono::Utc;
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, i64) {
        let pool = init_memory_database().await.unwrap();
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO productions (name, created_at, updated_at) VALUES ('Cup final', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        (pool, id)
    }

    async fn insert_title(
        pool: &SqlitePool,
        production_id: i64,
        name: &str,
        order: Option<i64>,
    ) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production_id).await.unwrap();
        let plan = plan_insert(&siblings, order.map(|o| Position::new(o).unwrap()));

        TITLE_DEFINITIONS.stage(&mut tx, &plan.shifts, plan.offset).await.unwrap();
        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO title_definitions (production_id, name, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(production_id)
        .bind(name)
        .bind(plan.position)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .unwrap()
        .last_insert_rowid();
        TITLE_DEFINITIONS.restore(&mut tx, &plan.shifts, plan.offset).await.unwrap();

        tx.commit().await.unwrap();
        id
    }

    async fn names(pool: &SqlitePool, production_id: i64) -> Vec<(String, i64)> {
        sqlx::query_as(
            r#"
            SELECT name, sort_order FROM title_definitions
            WHERE production_id = ?
            ORDER BY sort_order
            "#,
        )
        .bind(production_id)
        .fetch_all(pool)
        .await
        .unwrap()
    }

    fn expect(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(n, o)| (n.to_string(), *o)).collect()
    }

    #[tokio::test]
    async fn test_two_phase_insert_under_unique_constraint() {
        let (pool, production) = setup().await;
        for name in ["A", "B", "C"] {
            insert_title(&pool, production, name, None).await;
        }
        insert_title(&pool, production, "New", Some(1)).await;

        assert_eq!(
            names(&pool, production).await,
            expect(&[("New", 1), ("A", 2), ("B", 3), ("C", 4)])
        );
    }

    #[tokio::test]
    async fn test_naive_shift_violates_constraint() {
        let (pool, production) = setup().await;
        for name in ["A", "B", "C"] {
            insert_title(&pool, production, name, None).await;
        }

        // Row-by-row +1 in ascending order hits the next row's slot
        let mut tx = pool.begin().await.unwrap();
        let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production).await.unwrap();
        let shifts: Vec<Shift> = siblings
            .iter()
            .map(|s| Shift {
                id: s.id,
                from: s.order,
                to: s.order + 1,
            })
            .collect();
        let err = TITLE_DEFINITIONS.renumber(&mut tx, &shifts).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_apply_move_and_delete() {
        let (pool, production) = setup().await;
        let mut ids = Vec::new();
        for name in ["A", "B", "C", "D"] {
            ids.push(insert_title(&pool, production, name, None).await);
        }

        let mut tx = pool.begin().await.unwrap();
        let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production).await.unwrap();
        let plan = plan_move(&siblings, ids[3], Position::new(2).unwrap()).unwrap();
        TITLE_DEFINITIONS.apply_move(&mut tx, &plan).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            names(&pool, production).await,
            expect(&[("A", 1), ("D", 2), ("B", 3), ("C", 4)])
        );

        let mut tx = pool.begin().await.unwrap();
        let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production).await.unwrap();
        let plan = plan_delete(&siblings, ids[3]).unwrap();
        TITLE_DEFINITIONS.apply_delete(&mut tx, &plan).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(
            names(&pool, production).await,
            expect(&[("A", 1), ("B", 2), ("C", 3)])
        );
    }

    #[tokio::test]
    async fn test_group_of_missing_row() {
        let (pool, _) = setup().await;
        let mut tx = pool.begin().await.unwrap();
        let err = SEGMENTS.group_of(&mut tx, 42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(msg) if msg == "segment 42"));
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let (pool, production) = setup().await;
        for name in ["A", "B"] {
            insert_title(&pool, production, name, None).await;
        }

        {
            let mut tx = pool.begin().await.unwrap();
            let siblings = TITLE_DEFINITIONS.siblings(&mut tx, production).await.unwrap();
            let plan = plan_insert(&siblings, Some(Position::new(1).unwrap()));
            TITLE_DEFINITIONS.stage(&mut tx, &plan.shifts, plan.offset).await.unwrap();
            // dropped without commit
        }

        assert_eq!(names(&pool, production).await, expect(&[("A", 1), ("B", 2)]));
    }
}
