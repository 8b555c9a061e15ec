//! # Payment Service
//!
//! Consolidated payments: the one money row a visit settles against.
//! Most payments are born elsewhere (ending a session, a standalone
//! order); this service covers the manual path and the lifecycle.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ createConsolidatedPayment                                               │
//! │                                                                         │
//! │   caller-itemized amounts        optional back-references               │
//! │   table + fnb − discount + tax   session → payment_id stamped           │
//! │                 │                order   → billed into this payment     │
//! │                 ▼                                                       │
//! │          ┌─────────────┐         Both links land in the same            │
//! │          │   payment   │         transaction as the insert; a draft     │
//! │          │  (pending)  │         order also commits its stock there.    │
//! │          └─────────────┘                                                │
//! │            │        │                                                   │
//! │     confirm│        │cancel / fail                                      │
//! │            ▼        ▼                                                   │
//! │        success   cancelled / failed     (forward-only, CAS-guarded)     │
//! │        orders→paid                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cancelling or failing a payment leaves its billed orders alone:
//! whether they are re-billed, cancelled, or comped is the operator's
//! call, made order by order.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use baize_core::validation::validate_customer_name;
use baize_core::{
    CoreError, FnbOrder, Money, OrderStatus, Payment, PaymentMethodEntry, PaymentStatus,
    TableSession, ValidationError,
};
use baize_db::{generate_transaction_number, Database, DbError};

use crate::error::HallResult;
use crate::orders::{decrement_lines, insufficient_stock, load_lines};

// =============================================================================
// DTOs
// =============================================================================

/// A manual consolidated payment: caller-itemized amounts plus optional
/// back-references to the session and/or order being settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationParams {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub staff_id: Option<String>,

    pub table_amount_minor: i64,
    pub fnb_amount_minor: i64,
    #[serde(default)]
    pub discount_amount_minor: i64,
    #[serde(default)]
    pub tax_amount_minor: i64,

    /// Split tender; empty means one cash entry for the whole total.
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethodEntry>,

    /// Session to stamp with this payment (it keeps running).
    #[serde(default)]
    pub session_id: Option<String>,

    /// Draft or pending order to bill into this payment.
    #[serde(default)]
    pub order_id: Option<String>,
}

/// A payment with everything that settles against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment: Payment,
    pub sessions: Vec<TableSession>,
    pub orders: Vec<FnbOrder>,
}

// =============================================================================
// Payment Service
// =============================================================================

/// Consolidated-payment operations. Amount math is the caller's here;
/// the tax engine runs upstream where sessions and orders are priced.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Creates a pending payment from caller-itemized amounts and wires
    /// up the optional session/order back-references atomically.
    ///
    /// `total = table + fnb − discount + tax`. The linked session is
    /// stamped but not completed; a linked draft order bills and commits
    /// its stock, a pending one just bills.
    ///
    /// ## Errors
    /// * `ValidationError` - Negative amount, or discount above the bill
    /// * `SessionAlreadyCompleted` - Session already carries a payment
    /// * `InvalidOrderTransition` - Order is past billing
    /// * `InsufficientStock` - Draft stock ran out
    pub async fn create_consolidated(&self, params: ConsolidationParams) -> HallResult<Payment> {
        debug!(
            table = params.table_amount_minor,
            fnb = params.fnb_amount_minor,
            session_id = ?params.session_id,
            order_id = ?params.order_id,
            "create_consolidated"
        );

        let amounts = [
            ("table_amount", params.table_amount_minor),
            ("fnb_amount", params.fnb_amount_minor),
            ("discount_amount", params.discount_amount_minor),
            ("tax_amount", params.tax_amount_minor),
        ];
        for (field, amount) in amounts {
            if amount < 0 {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 0,
                    max: i64::MAX,
                }
                .into());
            }
        }
        if let Some(name) = &params.customer_name {
            validate_customer_name(name)?;
        }

        let gross =
            params.table_amount_minor + params.fnb_amount_minor + params.tax_amount_minor;
        let total = gross - params.discount_amount_minor;
        if total < 0 {
            return Err(ValidationError::OutOfRange {
                field: "discount_amount".to_string(),
                min: 0,
                max: gross,
            }
            .into());
        }

        let methods = if params.payment_methods.is_empty() {
            vec![PaymentMethodEntry::cash(Money::from_minor(total))]
        } else {
            params.payment_methods
        };

        let session = match &params.session_id {
            Some(id) => {
                let session = self
                    .db
                    .sessions()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Session", id))?;
                if session.payment_id.is_some() {
                    return Err(CoreError::SessionAlreadyCompleted(session.id).into());
                }
                Some(session)
            }
            None => None,
        };

        let order = match &params.order_id {
            Some(id) => {
                let order = self
                    .db
                    .orders()
                    .get_by_id(id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Order", id))?;
                if order.status != OrderStatus::Draft && order.status != OrderStatus::Pending {
                    return Err(CoreError::InvalidOrderTransition {
                        order_id: order.id,
                        from: order.status,
                        to: OrderStatus::Billed,
                    }
                    .into());
                }
                Some(order)
            }
            None => None,
        };

        // A draft billing here leaves waiting, so its stock commits in
        // the same transaction
        let draft_lines = match &order {
            Some(o) if o.status == OrderStatus::Draft => load_lines(&self.db, &o.id).await?,
            _ => Vec::new(),
        };

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            transaction_number: generate_transaction_number(),
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            table_amount_minor: params.table_amount_minor,
            fnb_amount_minor: params.fnb_amount_minor,
            discount_amount_minor: params.discount_amount_minor,
            tax_amount_minor: params.tax_amount_minor,
            total_amount_minor: total,
            payment_methods_json: Payment::encode_payment_methods(&methods)?,
            status: PaymentStatus::Pending,
            staff_id: params.staff_id,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;

        self.db.payments().insert(&mut tx, &payment).await?;

        if let Some(session) = &session {
            let linked = self
                .db
                .sessions()
                .link_payment(&mut tx, &session.id, &payment.id)
                .await?;
            if !linked {
                // Raced with end-session or another consolidation
                tx.rollback().await?;
                return Err(CoreError::SessionAlreadyCompleted(session.id.clone()).into());
            }
        }

        if let Some(order) = &order {
            let billed = match order.status {
                OrderStatus::Pending => {
                    self.db
                        .orders()
                        .mark_billed(&mut tx, &order.id, &payment.id)
                        .await?
                }
                _ => {
                    self.db
                        .orders()
                        .assign_to_payment(&mut tx, &order.id, &payment.id)
                        .await?
                }
            };
            if !billed {
                tx.rollback().await?;
                let from = self
                    .db
                    .orders()
                    .get_by_id(&order.id)
                    .await?
                    .map(|o| o.status)
                    .unwrap_or(order.status);
                return Err(CoreError::InvalidOrderTransition {
                    order_id: order.id.clone(),
                    from,
                    to: OrderStatus::Billed,
                }
                .into());
            }

            if !draft_lines.is_empty() {
                if let Some((item_id, requested)) =
                    decrement_lines(&self.db.menu(), &mut tx, &draft_lines).await?
                {
                    tx.rollback().await?;
                    return Err(insufficient_stock(&self.db, &item_id, requested).await?);
                }
            }
        }

        tx.commit().await?;

        info!(
            payment_id = %payment.id,
            transaction_number = %payment.transaction_number,
            total = %payment.total_amount(),
            session_id = ?params.session_id,
            order_id = ?params.order_id,
            "Consolidated payment created"
        );

        Ok(payment)
    }

    /// Confirms a pending payment and flips its billed orders to paid.
    /// Confirming an already-successful payment is a no-op.
    ///
    /// ## Errors
    /// * `NotFound` - Unknown payment
    /// * `InvalidPaymentTransition` - Payment is cancelled or failed
    pub async fn confirm_payment(&self, payment_id: &str) -> HallResult<Payment> {
        let payment = self
            .db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", payment_id))?;

        if payment.status == PaymentStatus::Success {
            debug!(payment_id = %payment_id, "Payment already confirmed");
            return Ok(payment);
        }
        if payment.status != PaymentStatus::Pending {
            return Err(CoreError::InvalidPaymentTransition {
                payment_id: payment.id,
                from: payment.status,
                to: PaymentStatus::Success,
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        let confirmed = self
            .db
            .payments()
            .set_status(&mut tx, payment_id, PaymentStatus::Pending, PaymentStatus::Success)
            .await?;
        if !confirmed {
            tx.rollback().await?;
            let current = self
                .db
                .payments()
                .get_by_id(payment_id)
                .await?
                .ok_or_else(|| DbError::not_found("Payment", payment_id))?;
            if current.status == PaymentStatus::Success {
                // Lost the race to another confirm; same outcome
                return Ok(current);
            }
            return Err(CoreError::InvalidPaymentTransition {
                payment_id: current.id,
                from: current.status,
                to: PaymentStatus::Success,
            }
            .into());
        }

        let orders_paid = self
            .db
            .orders()
            .mark_paid_by_payment(&mut tx, payment_id)
            .await?;

        tx.commit().await?;

        let payment = self
            .db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", payment_id))?;

        info!(
            payment_id = %payment.id,
            orders_paid,
            total = %payment.total_amount(),
            "Payment confirmed"
        );

        Ok(payment)
    }

    /// Cancels a pending payment. Billed orders stay billed.
    pub async fn cancel_payment(&self, payment_id: &str) -> HallResult<Payment> {
        self.close_payment(payment_id, PaymentStatus::Cancelled).await
    }

    /// Marks a pending payment failed (tender refused, walk-out).
    pub async fn fail_payment(&self, payment_id: &str) -> HallResult<Payment> {
        self.close_payment(payment_id, PaymentStatus::Failed).await
    }

    /// Shared pending → terminal transition. Idempotent per target
    /// state; anything else is a conflict.
    async fn close_payment(&self, payment_id: &str, to: PaymentStatus) -> HallResult<Payment> {
        let payment = self
            .db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", payment_id))?;

        if payment.status == to {
            debug!(payment_id = %payment_id, ?to, "Payment already in target state");
            return Ok(payment);
        }
        if payment.status != PaymentStatus::Pending {
            return Err(CoreError::InvalidPaymentTransition {
                payment_id: payment.id,
                from: payment.status,
                to,
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        let closed = self
            .db
            .payments()
            .set_status(&mut tx, payment_id, PaymentStatus::Pending, to)
            .await?;
        if !closed {
            tx.rollback().await?;
            let current = self
                .db
                .payments()
                .get_by_id(payment_id)
                .await?
                .ok_or_else(|| DbError::not_found("Payment", payment_id))?;
            if current.status == to {
                return Ok(current);
            }
            return Err(CoreError::InvalidPaymentTransition {
                payment_id: current.id,
                from: current.status,
                to,
            }
            .into());
        }

        tx.commit().await?;

        let payment = self
            .db
            .payments()
            .get_by_id(payment_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", payment_id))?;

        info!(payment_id = %payment.id, status = ?payment.status, "Payment closed");

        Ok(payment)
    }

    /// The payment a session settled (or will settle) against, with all
    /// its back-referencing sessions and orders expanded.
    pub async fn get_payment_by_session(
        &self,
        session_id: &str,
    ) -> HallResult<Option<PaymentDetails>> {
        let payment = match self.db.payments().find_by_session(session_id).await? {
            Some(payment) => payment,
            None => return Ok(None),
        };
        Ok(Some(self.expand(payment).await?))
    }

    /// The payment an order was billed into, expanded the same way.
    pub async fn get_payment_by_order(
        &self,
        order_id: &str,
    ) -> HallResult<Option<PaymentDetails>> {
        let payment = match self.db.payments().find_by_order(order_id).await? {
            Some(payment) => payment,
            None => return Ok(None),
        };
        Ok(Some(self.expand(payment).await?))
    }

    async fn expand(&self, payment: Payment) -> HallResult<PaymentDetails> {
        let sessions = self.db.sessions().find_by_payment(&payment.id).await?;
        let orders = self.db.orders().find_by_payment(&payment.id).await?;
        Ok(PaymentDetails {
            payment,
            sessions,
            orders,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, HallError};
    use crate::orders::{CreateOrderParams, OrderItemRequest, OrderService};
    use crate::sessions::SessionService;
    use baize_core::{
        BilliardTable, BillingKind, MenuItem, OrderContext, PaymentMethod, PricingPackage,
        SessionStatus, TableStatus, TaxConfig,
    };
    use baize_db::DbConfig;
    use chrono::Duration;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn insert_table(db: &Database, id: &str) {
        let now = Utc::now();
        let table = BilliardTable {
            id: id.to_string(),
            name: format!("Table {}", id),
            status: TableStatus::Available,
            hourly_rate_minor: 0,
            per_minute_rate_minor: None,
            pricing_package_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.tables().insert(&table).await.unwrap();
    }

    async fn insert_hourly_package(db: &Database, rate_minor: i64) -> PricingPackage {
        let now = Utc::now();
        let package = PricingPackage {
            id: Uuid::new_v4().to_string(),
            name: "Regular".into(),
            category: BillingKind::Hourly,
            hourly_rate_minor: Some(rate_minor),
            per_minute_rate_minor: None,
            is_default: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.packages().insert(&package).await.unwrap();
        package
    }

    async fn insert_running_session(
        db: &Database,
        table_id: &str,
        package_id: Option<&str>,
        minutes_ago: i64,
    ) -> TableSession {
        let start = Utc::now() - Duration::minutes(minutes_ago);
        let session = TableSession {
            id: Uuid::new_v4().to_string(),
            table_id: table_id.to_string(),
            pricing_package_id: package_id.map(str::to_string),
            customer_name: "Budi".into(),
            customer_phone: None,
            start_time: start,
            end_time: None,
            planned_duration: 0,
            actual_duration: None,
            original_duration: None,
            duration_type: None,
            status: SessionStatus::Active,
            total_cost_minor: None,
            payment_id: None,
            created_at: start,
            updated_at: start,
        };

        let mut tx = db.begin().await.unwrap();
        db.tables()
            .set_status(&mut tx, table_id, TableStatus::Available, TableStatus::Occupied)
            .await
            .unwrap();
        db.sessions().insert(&mut tx, &session).await.unwrap();
        tx.commit().await.unwrap();

        session
    }

    async fn insert_menu_item(db: &Database, price_minor: i64, stock: i64) -> MenuItem {
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            sku: format!("SKU-{}", &Uuid::new_v4().to_string()[..8]),
            name: "Kopi".into(),
            category: Some("drink".into()),
            price_minor,
            stock_quantity: stock,
            track_stock: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.menu().insert(&item).await.unwrap();
        item
    }

    fn consolidation(table: i64, fnb: i64) -> ConsolidationParams {
        ConsolidationParams {
            customer_name: Some("Budi".into()),
            customer_phone: None,
            staff_id: Some("staff-1".into()),
            table_amount_minor: table,
            fnb_amount_minor: fnb,
            discount_amount_minor: 0,
            tax_amount_minor: 0,
            payment_methods: Vec::new(),
            session_id: None,
            order_id: None,
        }
    }

    #[tokio::test]
    async fn test_session_payment_round_trip() {
        let db = test_db().await;
        insert_table(&db, "t1").await;
        let package = insert_hourly_package(&db, 50_000).await;
        insert_running_session(&db, "t1", Some(&package.id), 30).await;

        let sessions = SessionService::new(db.clone(), TaxConfig::disabled());
        let payments = PaymentService::new(db.clone());

        let outcome = sessions.end_session("t1").await.unwrap();
        assert_eq!(outcome.payment.total_amount_minor, 50_000);
        assert_eq!(outcome.session.total_cost_minor, Some(50_000));

        let details = payments
            .get_payment_by_session(&outcome.session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.payment.id, outcome.payment.id);
        assert_eq!(details.sessions.len(), 1);
        assert_eq!(details.sessions[0].id, outcome.session.id);
        assert!(details.orders.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_pays_billed_orders_and_is_idempotent() {
        let db = test_db().await;
        let item = insert_menu_item(&db, 10_000, 5).await;

        let orders = OrderService::new(db.clone(), TaxConfig::disabled());
        let payments = PaymentService::new(db.clone());

        let outcome = orders
            .create_order(CreateOrderParams {
                context: OrderContext::Standalone,
                customer_name: None,
                customer_phone: None,
                staff_id: "staff-1".into(),
                table_id: None,
                pending_transaction_id: None,
                notes: None,
                items: vec![OrderItemRequest {
                    menu_item_id: item.id.clone(),
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        let payment_id = outcome.payment.unwrap().id;

        let confirmed = payments.confirm_payment(&payment_id).await.unwrap();
        assert_eq!(confirmed.status, PaymentStatus::Success);

        let order = db.orders().get_by_id(&outcome.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);

        // Second confirm is a quiet no-op
        let again = payments.confirm_payment(&payment_id).await.unwrap();
        assert_eq!(again.status, PaymentStatus::Success);
    }

    #[tokio::test]
    async fn test_cancel_requires_pending() {
        let db = test_db().await;
        let payments = PaymentService::new(db.clone());

        let pending = payments.create_consolidated(consolidation(20_000, 0)).await.unwrap();
        let cancelled = payments.cancel_payment(&pending.id).await.unwrap();
        assert_eq!(cancelled.status, PaymentStatus::Cancelled);

        // Cancelling again: already in the target state
        let again = payments.cancel_payment(&pending.id).await.unwrap();
        assert_eq!(again.status, PaymentStatus::Cancelled);

        // A confirmed payment cannot be cancelled
        let other = payments.create_consolidated(consolidation(10_000, 0)).await.unwrap();
        payments.confirm_payment(&other.id).await.unwrap();
        let err = payments.cancel_payment(&other.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            HallError::Domain(CoreError::InvalidPaymentTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_consolidation_bills_draft_order_and_commits_stock() {
        let db = test_db().await;
        let item = insert_menu_item(&db, 8_000, 3).await;

        let orders = OrderService::new(db.clone(), TaxConfig::disabled());
        let payments = PaymentService::new(db.clone());

        let draft = orders
            .create_order(CreateOrderParams {
                context: OrderContext::Waiting,
                customer_name: Some("Siti".into()),
                customer_phone: None,
                staff_id: "staff-1".into(),
                table_id: None,
                pending_transaction_id: None,
                notes: None,
                items: vec![OrderItemRequest {
                    menu_item_id: item.id.clone(),
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        let mut params = consolidation(0, 16_000);
        params.order_id = Some(draft.order.id.clone());
        let payment = payments.create_consolidated(params).await.unwrap();

        let order = db.orders().get_by_id(&draft.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Billed);
        assert_eq!(order.payment_id, Some(payment.id.clone()));

        // Billing the draft committed its stock
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 1);

        let details = payments
            .get_payment_by_order(&order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(details.payment.id, payment.id);
        assert_eq!(details.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_consolidation_links_running_session_without_ending_it() {
        let db = test_db().await;
        insert_table(&db, "t1").await;
        let package = insert_hourly_package(&db, 50_000).await;
        let session = insert_running_session(&db, "t1", Some(&package.id), 10).await;

        let payments = PaymentService::new(db.clone());

        let mut params = consolidation(50_000, 0);
        params.session_id = Some(session.id.clone());
        let payment = payments.create_consolidated(params).await.unwrap();

        // The bill exists but the table keeps playing
        let linked = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert!(linked.is_active());
        assert_eq!(linked.payment_id, Some(payment.id.clone()));

        // A second consolidation against the same session is refused
        let mut params = consolidation(60_000, 0);
        params.session_id = Some(session.id.clone());
        let err = payments.create_consolidated(params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_consolidation_rejects_already_billed_session() {
        let db = test_db().await;
        insert_table(&db, "t1").await;
        let package = insert_hourly_package(&db, 50_000).await;
        insert_running_session(&db, "t1", Some(&package.id), 30).await;

        let sessions = SessionService::new(db.clone(), TaxConfig::disabled());
        let payments = PaymentService::new(db.clone());

        let outcome = sessions.end_session("t1").await.unwrap();

        let mut params = consolidation(50_000, 0);
        params.session_id = Some(outcome.session.id.clone());
        let err = payments.create_consolidated(params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            HallError::Domain(CoreError::SessionAlreadyCompleted(_))
        ));
    }

    #[tokio::test]
    async fn test_amount_derivation_and_default_tender() {
        let db = test_db().await;
        let payments = PaymentService::new(db.clone());

        let payment = payments
            .create_consolidated(ConsolidationParams {
                customer_name: Some("Budi".into()),
                customer_phone: None,
                staff_id: None,
                table_amount_minor: 100_000,
                fnb_amount_minor: 27_500,
                discount_amount_minor: 5_000,
                tax_amount_minor: 11_000,
                payment_methods: Vec::new(),
                session_id: None,
                order_id: None,
            })
            .await
            .unwrap();

        // 100,000 + 27,500 − 5,000 + 11,000
        assert_eq!(payment.total_amount_minor, 133_500);
        assert!(payment.transaction_number.starts_with("TRX-"));

        // Empty tender list defaults to one cash entry for the total
        let methods = payment.payment_methods().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].method, PaymentMethod::Cash);
        assert_eq!(methods[0].amount_minor, 133_500);
    }

    #[tokio::test]
    async fn test_negative_amounts_are_rejected() {
        let db = test_db().await;
        let payments = PaymentService::new(db.clone());

        let mut params = consolidation(10_000, 0);
        params.fnb_amount_minor = -1;
        let err = payments.create_consolidated(params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // Discount larger than the bill is refused too
        let mut params = consolidation(10_000, 0);
        params.discount_amount_minor = 20_000;
        let err = payments.create_consolidated(params).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
