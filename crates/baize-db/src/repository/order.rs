//! # F&B Order Repository
//!
//! Database operations for food & beverage orders and their line items.
//!
//! ## Order State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Status Transitions                           │
//! │                                                                         │
//! │        draft ──────────► pending ──────────► billed ──────► paid       │
//! │          │    assign_to_table │   bill_pending  │   (payment           │
//! │          │                    │   mark_billed   │    confirmed)        │
//! │          │ assign_to_payment  │                 │                      │
//! │          └────────────────────┴────────► billed │                      │
//! │          │                    │                 │                      │
//! │          └──────────┬─────────┴────────┬────────┘                      │
//! │                     ▼                  ▼                               │
//! │                      cancelled (from any non-paid state)               │
//! │                                                                         │
//! │  Every arrow is a compare-and-swap UPDATE: the WHERE clause names      │
//! │  the REQUIRED current status, so a raced or repeated call affects      │
//! │  zero rows instead of skipping states. Stock is decremented in the     │
//! │  same transaction as the draft-exit arrow, never on any other one.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use baize_core::{FnbOrder, FnbOrderItem};

/// Repository for F&B order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

const ORDER_COLUMNS: &str = r#"
    id, order_number, context, customer_name, customer_phone, table_id,
    staff_id, subtotal_minor, tax_minor, total_minor, status, notes,
    payment_id, created_at, updated_at
"#;

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets an order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<FnbOrder>> {
        let sql = format!("SELECT {} FROM fnb_orders WHERE id = ?1", ORDER_COLUMNS);

        let order = sqlx::query_as::<_, FnbOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets the line items of an order, in creation order.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<FnbOrderItem>> {
        let items = sqlx::query_as::<_, FnbOrderItem>(
            r#"
            SELECT id, order_id, menu_item_id, name_snapshot, unit_price_minor,
                   quantity, subtotal_minor, created_at
            FROM fnb_order_items
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists draft ("waiting") orders, oldest first.
    pub async fn list_drafts(&self) -> DbResult<Vec<FnbOrder>> {
        let sql = format!(
            "SELECT {} FROM fnb_orders WHERE status = 'draft' ORDER BY created_at",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, FnbOrder>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists the pending orders on a table, inside the caller's
    /// transaction.
    ///
    /// Session end gathers these into the consolidated bill; reading on
    /// the transaction connection means the set cannot change between
    /// the read and the bill.
    pub async fn list_pending_by_table(
        &self,
        conn: &mut SqliteConnection,
        table_id: &str,
    ) -> DbResult<Vec<FnbOrder>> {
        let sql = format!(
            "SELECT {} FROM fnb_orders WHERE table_id = ?1 AND status = 'pending' ORDER BY created_at",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, FnbOrder>(&sql)
            .bind(table_id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(orders)
    }

    /// Inserts an order and its line items in the caller's transaction.
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        order: &FnbOrder,
        items: &[FnbOrderItem],
    ) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_number = %order.order_number,
            items = items.len(),
            "Inserting order"
        );

        sqlx::query(
            r#"
            INSERT INTO fnb_orders (
                id, order_number, context, customer_name, customer_phone,
                table_id, staff_id, subtotal_minor, tax_minor, total_minor,
                status, notes, payment_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(order.context)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(&order.table_id)
        .bind(&order.staff_id)
        .bind(order.subtotal_minor)
        .bind(order.tax_minor)
        .bind(order.total_minor)
        .bind(order.status)
        .bind(&order.notes)
        .bind(&order.payment_id)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO fnb_order_items (
                    id, order_id, menu_item_id, name_snapshot,
                    unit_price_minor, quantity, subtotal_minor, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.order_id)
            .bind(&item.menu_item_id)
            .bind(&item.name_snapshot)
            .bind(item.unit_price_minor)
            .bind(item.quantity)
            .bind(item.subtotal_minor)
            .bind(item.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Moves a draft order onto a table: `draft → pending`, table stamped.
    ///
    /// ## Returns
    /// * `Ok(true)` - Order assigned
    /// * `Ok(false)` - Order was not in `draft` (already assigned, or unknown)
    pub async fn assign_to_table(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        table_id: &str,
    ) -> DbResult<bool> {
        debug!(order_id = %order_id, table_id = %table_id, "Assigning order to table");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'pending',
                table_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(order_id)
        .bind(table_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a draft order onto an existing payment: `draft → billed`,
    /// payment linked.
    ///
    /// The caller verifies the payment is still pending and bumps its
    /// amounts in the same transaction.
    pub async fn assign_to_payment(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        payment_id: &str,
    ) -> DbResult<bool> {
        debug!(order_id = %order_id, payment_id = %payment_id, "Assigning order to payment");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'billed',
                payment_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'draft'
            "#,
        )
        .bind(order_id)
        .bind(payment_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bills one pending order: `pending → billed`, payment linked.
    ///
    /// Used for standalone auto-consolidation and explicit checkout of a
    /// single order.
    pub async fn mark_billed(
        &self,
        conn: &mut SqliteConnection,
        order_id: &str,
        payment_id: &str,
    ) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'billed',
                payment_id = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(order_id)
        .bind(payment_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bills every pending order on a table at session end.
    ///
    /// ## Returns
    /// Number of orders billed.
    pub async fn bill_pending_by_table(
        &self,
        conn: &mut SqliteConnection,
        table_id: &str,
        payment_id: &str,
    ) -> DbResult<u64> {
        debug!(table_id = %table_id, payment_id = %payment_id, "Billing pending orders");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'billed',
                payment_id = ?2,
                updated_at = ?3
            WHERE table_id = ?1 AND status = 'pending'
            "#,
        )
        .bind(table_id)
        .bind(payment_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Marks every billed order on a payment as paid (payment confirmed).
    pub async fn mark_paid_by_payment(
        &self,
        conn: &mut SqliteConnection,
        payment_id: &str,
    ) -> DbResult<u64> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'paid',
                updated_at = ?2
            WHERE payment_id = ?1 AND status = 'billed'
            "#,
        )
        .bind(payment_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Cancels an order from any non-terminal state.
    ///
    /// Stock is deliberately not restored: kitchen work may already have
    /// started, and shrinkage corrections go through the menu repository.
    ///
    /// ## Returns
    /// * `Ok(true)` - Order cancelled
    /// * `Ok(false)` - Order was already paid or cancelled (or unknown)
    pub async fn cancel(&self, order_id: &str) -> DbResult<bool> {
        debug!(order_id = %order_id, "Cancelling order");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                status = 'cancelled',
                updated_at = ?2
            WHERE id = ?1 AND status NOT IN ('paid', 'cancelled')
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Re-points pending orders from one table to another (session move).
    ///
    /// ## Returns
    /// Number of orders moved.
    pub async fn repoint_pending(
        &self,
        conn: &mut SqliteConnection,
        from_table_id: &str,
        to_table_id: &str,
    ) -> DbResult<u64> {
        debug!(from = %from_table_id, to = %to_table_id, "Re-pointing pending orders");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE fnb_orders SET
                table_id = ?2,
                updated_at = ?3
            WHERE table_id = ?1 AND status = 'pending'
            "#,
        )
        .bind(from_table_id)
        .bind(to_table_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Lists orders linked to a payment (reverse foreign-key lookup).
    pub async fn find_by_payment(&self, payment_id: &str) -> DbResult<Vec<FnbOrder>> {
        let sql = format!(
            "SELECT {} FROM fnb_orders WHERE payment_id = ?1 ORDER BY created_at",
            ORDER_COLUMNS
        );

        let orders = sqlx::query_as::<_, FnbOrder>(&sql)
            .bind(payment_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }
}

/// Generates an order number: `{PREFIX}-YYYYMMDD-xxxxxx`.
///
/// The tail is a random UUID fragment rather than a daily counter, so
/// two terminals can generate numbers concurrently without coordination.
pub fn generate_order_number(prefix: &str) -> String {
    let date = Utc::now().format("%Y%m%d");
    let tail = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, date, &tail[..6])
}

// =============================================================================
// Unit Tests
// =============================================================================
