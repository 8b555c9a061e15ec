//! # Billiard Table Repository
//!
//! Database operations for the table catalog and floor status.
//!
//! Status changes go through [`TableRepository::set_status`], a
//! compare-and-swap UPDATE. Occupying a table that another request just
//! occupied simply affects zero rows; the caller turns that into a
//! conflict instead of silently double-booking.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use baize_core::{BilliardTable, TableStatus};

/// Repository for billiard table database operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Gets a table by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(BilliardTable))` - Table found
    /// * `Ok(None)` - Table not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BilliardTable>> {
        let table = sqlx::query_as::<_, BilliardTable>(
            r#"
            SELECT id, name, status, hourly_rate_minor, per_minute_rate_minor,
                   pricing_package_id, is_active, created_at, updated_at
            FROM billiard_tables
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    /// Lists active tables, ordered by name (floor map order).
    pub async fn list_active(&self) -> DbResult<Vec<BilliardTable>> {
        let tables = sqlx::query_as::<_, BilliardTable>(
            r#"
            SELECT id, name, status, hourly_rate_minor, per_minute_rate_minor,
                   pricing_package_id, is_active, created_at, updated_at
            FROM billiard_tables
            WHERE is_active = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Inserts a new table.
    pub async fn insert(&self, table: &BilliardTable) -> DbResult<()> {
        debug!(name = %table.name, "Inserting table");

        sqlx::query(
            r#"
            INSERT INTO billiard_tables (
                id, name, status, hourly_rate_minor, per_minute_rate_minor,
                pricing_package_id, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&table.id)
        .bind(&table.name)
        .bind(table.status)
        .bind(table.hourly_rate_minor)
        .bind(table.per_minute_rate_minor)
        .bind(&table.pricing_package_id)
        .bind(table.is_active)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates catalog fields of an existing table (name, rates, package).
    ///
    /// Does not touch `status`; lifecycle changes go through
    /// [`TableRepository::set_status`].
    pub async fn update(&self, table: &BilliardTable) -> DbResult<()> {
        debug!(id = %table.id, "Updating table");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE billiard_tables SET
                name = ?2,
                hourly_rate_minor = ?3,
                per_minute_rate_minor = ?4,
                pricing_package_id = ?5,
                is_active = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&table.id)
        .bind(&table.name)
        .bind(table.hourly_rate_minor)
        .bind(table.per_minute_rate_minor)
        .bind(&table.pricing_package_id)
        .bind(table.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("BilliardTable", &table.id));
        }

        Ok(())
    }

    /// Compare-and-swap status transition.
    ///
    /// ## Why CAS
    /// `UPDATE ... WHERE id = ? AND status = ?` affects zero rows when a
    /// concurrent request already moved the table. The boolean result
    /// tells the caller whether *this* call won the transition.
    ///
    /// ## Returns
    /// * `Ok(true)` - Transition applied
    /// * `Ok(false)` - Table was not in `from` status (raced or wrong state)
    pub async fn set_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        from: TableStatus,
        to: TableStatus,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Table status transition");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE billiard_tables SET
                status = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
