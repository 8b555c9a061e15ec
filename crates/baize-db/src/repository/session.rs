//! # Table Session Repository
//!
//! Database operations for table sessions.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Lifecycle                                 │
//! │                                                                         │
//! │  1. START                                                              │
//! │     └── insert() → TableSession { status: Active }                     │
//! │         (same transaction flips the table available → occupied)        │
//! │                                                                         │
//! │  2. (OPTIONAL) EDIT                                                    │
//! │     └── update_duration() → manual override of billed minutes          │
//! │     └── move_table()      → relocate to another table                  │
//! │                                                                         │
//! │  3. END (manual or auto-expiry)                                        │
//! │     └── complete() → status, end_time, total_cost and payment link     │
//! │         frozen in ONE compare-and-swap UPDATE                          │
//! │                                                                         │
//! │  The one-active-session-per-table rule is a partial unique index in    │
//! │  the schema, so even racing inserts cannot double-book a table.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why `complete()` is a CAS
//! Two cashiers (or a cashier racing the expiry watcher) can both try to
//! end the same session. The `WHERE status = 'active'` guard lets exactly
//! one UPDATE land; the loser sees zero rows affected and backs out
//! without creating a second payment.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use baize_core::{BillingKind, TableSession};

/// Repository for table session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

const SESSION_COLUMNS: &str = r#"
    id, table_id, pricing_package_id, customer_name, customer_phone,
    start_time, end_time, planned_duration, actual_duration,
    original_duration, duration_type, status, total_cost_minor,
    payment_id, created_at, updated_at
"#;

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Gets a session by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<TableSession>> {
        let sql = format!(
            "SELECT {} FROM table_sessions WHERE id = ?1",
            SESSION_COLUMNS
        );

        let session = sqlx::query_as::<_, TableSession>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Finds the active session on a table, if any.
    ///
    /// The partial unique index guarantees at most one row matches.
    pub async fn find_active_by_table(&self, table_id: &str) -> DbResult<Option<TableSession>> {
        let sql = format!(
            "SELECT {} FROM table_sessions WHERE table_id = ?1 AND status = 'active'",
            SESSION_COLUMNS
        );

        let session = sqlx::query_as::<_, TableSession>(&sql)
            .bind(table_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(session)
    }

    /// Lists all active sessions (expiry sweep, floor overview).
    pub async fn list_active(&self) -> DbResult<Vec<TableSession>> {
        let sql = format!(
            "SELECT {} FROM table_sessions WHERE status = 'active' ORDER BY start_time",
            SESSION_COLUMNS
        );

        let sessions = sqlx::query_as::<_, TableSession>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(sessions)
    }

    /// Inserts a new session.
    ///
    /// Takes a transaction connection: session start also occupies the
    /// table, and the two writes must commit together.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Table already has an active session
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        session: &TableSession,
    ) -> DbResult<()> {
        debug!(id = %session.id, table_id = %session.table_id, "Inserting session");

        sqlx::query(
            r#"
            INSERT INTO table_sessions (
                id, table_id, pricing_package_id, customer_name, customer_phone,
                start_time, end_time, planned_duration, actual_duration,
                original_duration, duration_type, status, total_cost_minor,
                payment_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15, ?16
            )
            "#,
        )
        .bind(&session.id)
        .bind(&session.table_id)
        .bind(&session.pricing_package_id)
        .bind(&session.customer_name)
        .bind(&session.customer_phone)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.planned_duration)
        .bind(session.actual_duration)
        .bind(session.original_duration)
        .bind(session.duration_type)
        .bind(session.status)
        .bind(session.total_cost_minor)
        .bind(&session.payment_id)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Edits the billed duration and/or billing kind of an active session.
    ///
    /// `original_duration` captures the planned value the first time staff
    /// edit anything, so the receipt can show what was booked originally.
    /// Fields passed as `None` are left unchanged.
    ///
    /// ## Returns
    /// * `Ok(true)` - Session updated
    /// * `Ok(false)` - No active session with that ID
    pub async fn update_duration(
        &self,
        id: &str,
        duration_type: Option<BillingKind>,
        actual_minutes: Option<i64>,
    ) -> DbResult<bool> {
        debug!(id = %id, ?duration_type, ?actual_minutes, "Editing session duration");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE table_sessions SET
                actual_duration = COALESCE(?2, actual_duration),
                duration_type = COALESCE(?3, duration_type),
                original_duration = COALESCE(original_duration, planned_duration),
                updated_at = ?4
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(actual_minutes)
        .bind(duration_type)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Freezes a session: status, end time, total cost and payment link
    /// in one compare-and-swap UPDATE.
    ///
    /// ## Returns
    /// * `Ok(true)` - This call completed the session
    /// * `Ok(false)` - Session was already completed (or unknown ID)
    pub async fn complete(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        end_time: DateTime<Utc>,
        total_cost_minor: i64,
        payment_id: &str,
    ) -> DbResult<bool> {
        debug!(id = %id, total_cost_minor = %total_cost_minor, "Completing session");

        let result = sqlx::query(
            r#"
            UPDATE table_sessions SET
                status = 'completed',
                end_time = ?2,
                total_cost_minor = ?3,
                payment_id = ?4,
                updated_at = ?2
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(end_time)
        .bind(total_cost_minor)
        .bind(payment_id)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Re-points an active session at a different table.
    ///
    /// Timing fields are untouched; the clock keeps running. The caller
    /// flips both tables' statuses and re-points pending orders in the
    /// same transaction.
    ///
    /// ## Returns
    /// * `Ok(true)` - Session moved
    /// * `Ok(false)` - No active session with that ID
    pub async fn move_table(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        destination_table_id: &str,
    ) -> DbResult<bool> {
        debug!(id = %id, destination = %destination_table_id, "Moving session");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE table_sessions SET
                table_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'active'
            "#,
        )
        .bind(id)
        .bind(destination_table_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamps a payment back-reference on a session without completing it.
    ///
    /// Used by manual consolidation, where the bill is cut while the
    /// session keeps running. Guarded on `payment_id IS NULL` so a session
    /// is never silently re-billed; `complete()` remains the only writer
    /// allowed to overwrite the link.
    ///
    /// ## Returns
    /// * `Ok(true)` - Link stamped
    /// * `Ok(false)` - Session already carries a payment (or unknown ID)
    pub async fn link_payment(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        payment_id: &str,
    ) -> DbResult<bool> {
        debug!(id = %id, payment_id = %payment_id, "Linking session to payment");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE table_sessions SET
                payment_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND payment_id IS NULL
            "#,
        )
        .bind(id)
        .bind(payment_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists sessions linked to a payment (reverse foreign-key lookup).
    pub async fn find_by_payment(&self, payment_id: &str) -> DbResult<Vec<TableSession>> {
        let sql = format!(
            "SELECT {} FROM table_sessions WHERE payment_id = ?1 ORDER BY start_time",
            SESSION_COLUMNS
        );

        let sessions = sqlx::query_as::<_, TableSession>(&sql)
            .bind(payment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sessions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
