//! # Payment Repository
//!
//! Database operations for consolidated payments.
//!
//! ## Back-Reference Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Payment Linkage (who points at whom)                  │
//! │                                                                         │
//! │   table_sessions.payment_id ──┐                                        │
//! │                               ├──► payments.id                         │
//! │   fnb_orders.payment_id ──────┘                                        │
//! │                                                                         │
//! │  A payment stores amounts only; it never points back out. Lookups      │
//! │  "payment for this session/order" are reverse foreign-key joins,       │
//! │  so one payment can aggregate any number of sessions and orders        │
//! │  without schema changes.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status moves only forward (`pending → success | failed | cancelled`)
//! and every move is a compare-and-swap UPDATE, which is what makes
//! confirmation idempotent at the service layer.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use baize_core::{Payment, PaymentStatus};

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

const PAYMENT_COLUMNS: &str = r#"
    id, transaction_number, customer_name, customer_phone,
    table_amount_minor, fnb_amount_minor, discount_amount_minor,
    tax_amount_minor, total_amount_minor, payment_methods_json,
    status, staff_id, created_at, updated_at
"#;

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Gets a payment by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = ?1", PAYMENT_COLUMNS);

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Lists pending payments, oldest first (cashier work queue).
    pub async fn list_pending(&self) -> DbResult<Vec<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE status = 'pending' ORDER BY created_at",
            PAYMENT_COLUMNS
        );

        let payments = sqlx::query_as::<_, Payment>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    /// Inserts a new payment in the caller's transaction.
    pub async fn insert(&self, conn: &mut SqliteConnection, payment: &Payment) -> DbResult<()> {
        debug!(
            id = %payment.id,
            transaction_number = %payment.transaction_number,
            total = %payment.total_amount_minor,
            "Inserting payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (
                id, transaction_number, customer_name, customer_phone,
                table_amount_minor, fnb_amount_minor, discount_amount_minor,
                tax_amount_minor, total_amount_minor, payment_methods_json,
                status, staff_id, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.transaction_number)
        .bind(&payment.customer_name)
        .bind(&payment.customer_phone)
        .bind(payment.table_amount_minor)
        .bind(payment.fnb_amount_minor)
        .bind(payment.discount_amount_minor)
        .bind(payment.tax_amount_minor)
        .bind(payment.total_amount_minor)
        .bind(&payment.payment_methods_json)
        .bind(payment.status)
        .bind(&payment.staff_id)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Compare-and-swap status transition.
    ///
    /// ## Returns
    /// * `Ok(true)` - Transition applied
    /// * `Ok(false)` - Payment was not in `from` status (raced, repeated,
    ///   or unknown ID)
    pub async fn set_status(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> DbResult<bool> {
        debug!(id = %id, from = %from, to = %to, "Payment status transition");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE payments SET
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

    /// Folds an order's total into a still-pending payment.
    ///
    /// Both `fnb_amount` and `total_amount` grow by the same amount; the
    /// `status = 'pending'` guard rejects the fold once the payment has
    /// been confirmed or cancelled.
    ///
    /// ## Returns
    /// * `Ok(true)` - Amounts updated
    /// * `Ok(false)` - Payment no longer pending
    pub async fn add_order_total(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        amount_minor: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, amount_minor = %amount_minor, "Folding order into payment");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE payments SET
                fnb_amount_minor = fnb_amount_minor + ?2,
                total_amount_minor = total_amount_minor + ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(amount_minor)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds the payment a session is linked to, if any.
    pub async fn find_by_session(&self, session_id: &str) -> DbResult<Option<Payment>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM payments p
            INNER JOIN table_sessions s ON s.payment_id = p.id
            WHERE s.id = ?1
            "#,
            payment_columns_prefixed()
        );

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    /// Finds the payment an order is linked to, if any.
    pub async fn find_by_order(&self, order_id: &str) -> DbResult<Option<Payment>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM payments p
            INNER JOIN fnb_orders o ON o.payment_id = p.id
            WHERE o.id = ?1
            "#,
            payment_columns_prefixed()
        );

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }
}

/// Payment column list with a `p.` prefix for joined queries.
fn payment_columns_prefixed() -> String {
    PAYMENT_COLUMNS
        .split(',')
        .map(|c| format!("p.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generates a transaction number: `TRX-YYYYMMDD-xxxxxx`.
///
/// Same construction as order numbers: a random UUID fragment instead of
/// a daily counter, safe across concurrent terminals.
pub fn generate_transaction_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let tail = Uuid::new_v4().simple().to_string();
    format!("TRX-{}-{}", date, &tail[..6])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use baize_core::PaymentMethodEntry;

    fn pending_payment(total_minor: i64) -> Payment {
        let now = Utc::now();
        let methods =
            Payment::encode_payment_methods(&[PaymentMethodEntry::cash(
                baize_core::Money::from_minor(total_minor),
            )])
            .unwrap();
        Payment {
            id: Uuid::new_v4().to_string(),
            transaction_number: generate_transaction_number(),
            customer_name: None,
            customer_phone: None,
            table_amount_minor: 0,
            fnb_amount_minor: total_minor,
            discount_amount_minor: 0,
            tax_amount_minor: 0,
            total_amount_minor: total_minor,
            payment_methods_json: methods,
            status: PaymentStatus::Pending,
            staff_id: Some("staff-1".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    async fn insert_payment(db: &Database, p: &Payment) {
        let mut tx = db.begin().await.unwrap();
        db.payments().insert(&mut tx, p).await.unwrap();
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_status_cas_fires_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = pending_payment(50_000);
        insert_payment(&db, &p).await;

        let mut tx = db.begin().await.unwrap();
        assert!(db
            .payments()
            .set_status(&mut tx, &p.id, PaymentStatus::Pending, PaymentStatus::Success)
            .await
            .unwrap());
        tx.commit().await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(!db
            .payments()
            .set_status(&mut tx, &p.id, PaymentStatus::Pending, PaymentStatus::Success)
            .await
            .unwrap());
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_add_order_total_requires_pending() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let p = pending_payment(100_000);
        insert_payment(&db, &p).await;

        let mut tx = db.begin().await.unwrap();
        assert!(db
            .payments()
            .add_order_total(&mut tx, &p.id, 27_500)
            .await
            .unwrap());
        db.payments()
            .set_status(&mut tx, &p.id, PaymentStatus::Pending, PaymentStatus::Success)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let folded = db.payments().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(folded.fnb_amount_minor, 127_500);
        assert_eq!(folded.total_amount_minor, 127_500);

        // Confirmed payments refuse further folds
        let mut tx = db.begin().await.unwrap();
        assert!(!db
            .payments()
            .add_order_total(&mut tx, &p.id, 5_000)
            .await
            .unwrap());
        tx.commit().await.unwrap();
    }

    #[test]
    fn test_transaction_number_shape() {
        let number = generate_transaction_number();
        assert!(number.starts_with("TRX-"));
        assert_eq!(number.split('-').count(), 3);
    }
}
