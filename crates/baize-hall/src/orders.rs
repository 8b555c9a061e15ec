//! # Order Service
//!
//! F&B orders enter the system through four doors, and the door decides
//! two things: the order's first status and when stock is committed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Context            First status   Stock committed                       │
//! │ ─────────────────  ─────────────  ────────────────────────────────────  │
//! │ standalone         pending→billed at creation (pays on the spot)        │
//! │ waiting            draft          when assigned to a table/transaction  │
//! │ tableSession       pending        at creation (session pays later)      │
//! │ pendingTransaction draft→billed   at creation (folds into the target)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is decremented exactly once per order, always inside the same
//! transaction as the status change that commits it. The catalog check
//! before the transaction is advisory; the guarded UPDATE inside it is
//! what actually refuses oversells, and the whole order rolls back on
//! the first refused line.
//!
//! Cancellation never restores stock. A cancelled order's items are
//! treated as consumed or written off; corrections go through manual
//! stock adjustments.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use baize_core::validation::{
    validate_customer_name, validate_notes, validate_order_items_count, validate_quantity,
    validate_staff_id,
};
use baize_core::{
    CoreError, FnbOrder, FnbOrderItem, MenuItem, Money, OrderContext, OrderStatus, Payment,
    PaymentMethodEntry, PaymentStatus, TaxConfig, ValidationError,
};
use baize_db::{
    generate_order_number, generate_transaction_number, Database, DbError, DbResult,
    MenuItemRepository,
};

use crate::error::{HallError, HallResult};

// =============================================================================
// DTOs
// =============================================================================

/// One requested line on a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub quantity: i64,
}

/// Everything needed to create an order in any context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderParams {
    pub context: OrderContext,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub staff_id: String,

    /// Required for `tableSession`; must carry an active session.
    #[serde(default)]
    pub table_id: Option<String>,

    /// Required for `pendingTransaction`; must still be pending.
    #[serde(default)]
    pub pending_transaction_id: Option<String>,

    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

/// The created order, plus the payment the context produced or folded
/// into (standalone and pendingTransaction only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderOutcome {
    pub order: FnbOrder,
    pub payment: Option<Payment>,
}

// =============================================================================
// Shared stock helpers
// =============================================================================
//
// PaymentService commits draft orders during manual consolidation and
// uses the same three steps, so they live here as crate-level helpers.

/// Decrements stock for every tracked line inside the caller's open
/// transaction. Untracked items pass through.
///
/// ## Returns
/// * `Ok(None)` - All lines committed
/// * `Ok(Some((item_id, requested)))` - First refused line; the caller
///   rolls back and reports it
pub(crate) async fn decrement_lines(
    menu: &MenuItemRepository,
    conn: &mut SqliteConnection,
    lines: &[(MenuItem, i64)],
) -> DbResult<Option<(String, i64)>> {
    for (item, quantity) in lines {
        if !item.track_stock {
            continue;
        }
        let decremented = menu.decrement_stock(conn, &item.id, *quantity).await?;
        if !decremented {
            return Ok(Some((item.id.clone(), *quantity)));
        }
    }
    Ok(None)
}

/// Reloads a stored order's lines as (menu item, quantity) pairs, for
/// the deferred stock commit when a draft leaves waiting.
pub(crate) async fn load_lines(
    db: &Database,
    order_id: &str,
) -> HallResult<Vec<(MenuItem, i64)>> {
    let stored = db.orders().items(order_id).await?;
    let mut lines = Vec::with_capacity(stored.len());
    for line in stored {
        let item = db
            .menu()
            .get_by_id(&line.menu_item_id)
            .await?
            .ok_or_else(|| DbError::not_found("MenuItem", &line.menu_item_id))?;
        lines.push((item, line.quantity));
    }
    Ok(lines)
}

/// Builds the stock-refusal error from a read taken after the rollback,
/// so the reported availability is current rather than the stale
/// pre-transaction number.
pub(crate) async fn insufficient_stock(
    db: &Database,
    item_id: &str,
    requested: i64,
) -> HallResult<HallError> {
    let (name, available) = match db.menu().get_by_id(item_id).await? {
        Some(item) => (item.name, item.stock_quantity),
        None => (item_id.to_string(), 0),
    };
    Ok(CoreError::InsufficientStock {
        name,
        available,
        requested,
    }
    .into())
}

// =============================================================================
// Order Service
// =============================================================================

/// F&B order operations across all four creation contexts.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    tax: TaxConfig,
}

impl OrderService {
    pub fn new(db: Database, tax: TaxConfig) -> Self {
        OrderService { db, tax }
    }

    /// Creates an order in the requested context.
    ///
    /// Line prices and names are frozen from the catalog at creation,
    /// and F&B tax is baked into the order total here; downstream
    /// consolidation sums totals without re-taxing.
    ///
    /// ## Errors
    /// * `ValidationError` - Bad staff id, empty items, missing context fields
    /// * `NotFound` - Unknown menu item, or no active session on the table
    /// * `InsufficientStock` - A tracked line cannot be fulfilled
    /// * `TransactionNotPending` - Target payment already closed
    pub async fn create_order(&self, params: CreateOrderParams) -> HallResult<CreateOrderOutcome> {
        let context = params.context;
        debug!(?context, staff_id = %params.staff_id, items = params.items.len(), "create_order");

        validate_staff_id(&params.staff_id)?;
        validate_order_items_count(params.items.len())?;
        for line in &params.items {
            validate_quantity(line.quantity)?;
        }
        if let Some(name) = &params.customer_name {
            validate_customer_name(name)?;
        }
        if let Some(notes) = &params.notes {
            validate_notes(notes)?;
        }
        if context.requires_table() && params.table_id.is_none() {
            return Err(ValidationError::Required {
                field: "table_id".to_string(),
            }
            .into());
        }

        // Advisory catalog pass: resolve items, freeze prices, reject
        // obvious oversells before opening a transaction
        let mut lines: Vec<(MenuItem, i64)> = Vec::with_capacity(params.items.len());
        for line in &params.items {
            let item = self
                .db
                .menu()
                .get_by_id(&line.menu_item_id)
                .await?
                .ok_or_else(|| DbError::not_found("MenuItem", &line.menu_item_id))?;
            if !item.can_fulfill(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: item.name,
                    available: item.stock_quantity,
                    requested: line.quantity,
                }
                .into());
            }
            lines.push((item, line.quantity));
        }

        if context.requires_table() {
            let table_id = params.table_id.as_deref().unwrap_or_default();
            self.db
                .sessions()
                .find_active_by_table(table_id)
                .await?
                .ok_or_else(|| CoreError::NoActiveSession(table_id.to_string()))?;
        }

        let target_payment = match (context, params.pending_transaction_id.as_deref()) {
            (OrderContext::PendingTransaction, Some(payment_id)) => {
                let payment = self
                    .db
                    .payments()
                    .get_by_id(payment_id)
                    .await?
                    .ok_or_else(|| DbError::not_found("Payment", payment_id))?;
                if payment.status != PaymentStatus::Pending {
                    // Clean rejection before anything is written
                    return Err(CoreError::TransactionNotPending {
                        payment_id: payment.id,
                        status: payment.status,
                    }
                    .into());
                }
                Some(payment)
            }
            (OrderContext::PendingTransaction, None) => {
                return Err(ValidationError::Required {
                    field: "pending_transaction_id".to_string(),
                }
                .into());
            }
            _ => None,
        };

        let subtotal: i64 = lines.iter().map(|(item, qty)| item.price_minor * qty).sum();
        let tax = self.tax.fnb_tax(Money::from_minor(subtotal));
        let now = Utc::now();

        let order = FnbOrder {
            id: Uuid::new_v4().to_string(),
            order_number: generate_order_number(context.number_prefix()),
            context,
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            table_id: params.table_id,
            staff_id: params.staff_id,
            subtotal_minor: subtotal,
            tax_minor: tax.minor(),
            total_minor: subtotal + tax.minor(),
            status: context.initial_status(),
            notes: params.notes,
            payment_id: None,
            created_at: now,
            updated_at: now,
        };

        let items: Vec<FnbOrderItem> = lines
            .iter()
            .map(|(item, qty)| FnbOrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order.id.clone(),
                menu_item_id: item.id.clone(),
                name_snapshot: item.name.clone(),
                unit_price_minor: item.price_minor,
                quantity: *qty,
                subtotal_minor: item.price_minor * qty,
                created_at: now,
            })
            .collect();

        let mut tx = self.db.begin().await?;

        self.db.orders().insert(&mut tx, &order, &items).await?;

        if context.commits_stock_at_creation() {
            if let Some((item_id, requested)) =
                decrement_lines(&self.db.menu(), &mut tx, &lines).await?
            {
                tx.rollback().await?;
                return Err(insufficient_stock(&self.db, &item_id, requested).await?);
            }
        }

        let mut linked_payment_id: Option<String> = None;
        match context {
            OrderContext::Standalone => {
                // Walk-in takeaway pays on the spot: one payment per order
                let methods = vec![PaymentMethodEntry::cash(order.total())];
                let payment = Payment {
                    id: Uuid::new_v4().to_string(),
                    transaction_number: generate_transaction_number(),
                    customer_name: order.customer_name.clone(),
                    customer_phone: order.customer_phone.clone(),
                    table_amount_minor: 0,
                    fnb_amount_minor: order.total_minor,
                    discount_amount_minor: 0,
                    tax_amount_minor: 0,
                    total_amount_minor: order.total_minor,
                    payment_methods_json: Payment::encode_payment_methods(&methods)?,
                    status: PaymentStatus::Pending,
                    staff_id: Some(order.staff_id.clone()),
                    created_at: now,
                    updated_at: now,
                };
                self.db.payments().insert(&mut tx, &payment).await?;

                let billed = self
                    .db
                    .orders()
                    .mark_billed(&mut tx, &order.id, &payment.id)
                    .await?;
                if !billed {
                    // Nothing else writes this row inside our transaction
                    tx.rollback().await?;
                    return Err(DbError::Internal(format!(
                        "standalone order {} did not bill",
                        order.id
                    ))
                    .into());
                }
                linked_payment_id = Some(payment.id);
            }
            OrderContext::PendingTransaction => {
                if let Some(target) = &target_payment {
                    let assigned = self
                        .db
                        .orders()
                        .assign_to_payment(&mut tx, &order.id, &target.id)
                        .await?;
                    let folded = assigned
                        && self
                            .db
                            .payments()
                            .add_order_total(&mut tx, &target.id, order.total_minor)
                            .await?;
                    if !folded {
                        // Target closed between the pre-read and now
                        tx.rollback().await?;
                        let status = self
                            .db
                            .payments()
                            .get_by_id(&target.id)
                            .await?
                            .map(|p| p.status)
                            .unwrap_or(target.status);
                        return Err(CoreError::TransactionNotPending {
                            payment_id: target.id.clone(),
                            status,
                        }
                        .into());
                    }

                    // Leaving draft commits the stock now
                    if let Some((item_id, requested)) =
                        decrement_lines(&self.db.menu(), &mut tx, &lines).await?
                    {
                        tx.rollback().await?;
                        return Err(insufficient_stock(&self.db, &item_id, requested).await?);
                    }
                    linked_payment_id = Some(target.id.clone());
                }
            }
            OrderContext::Waiting | OrderContext::TableSession => {}
        }

        tx.commit().await?;

        let order = self
            .db
            .orders()
            .get_by_id(&order.id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", &order.id))?;
        let payment = match linked_payment_id {
            Some(id) => self.db.payments().get_by_id(&id).await?,
            None => None,
        };

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            ?context,
            status = ?order.status,
            total = %order.total(),
            items = items.len(),
            "Order created"
        );

        Ok(CreateOrderOutcome { order, payment })
    }

    /// Seats a waiting draft at a table with an active session. The
    /// draft goes pending and its stock commits in the same transaction.
    ///
    /// ## Errors
    /// * `NotFound` - Unknown order/table, or no active session there
    /// * `InvalidOrderTransition` - Order is not a draft anymore
    /// * `InsufficientStock` - Stock ran out while the customer waited
    pub async fn assign_order_to_table(
        &self,
        order_id: &str,
        table_id: &str,
        staff_id: &str,
    ) -> HallResult<FnbOrder> {
        debug!(order_id = %order_id, table_id = %table_id, "assign_order_to_table");

        validate_staff_id(staff_id)?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        if order.status != OrderStatus::Draft {
            return Err(CoreError::InvalidOrderTransition {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::Pending,
            }
            .into());
        }

        self.db
            .tables()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", table_id))?;
        self.db
            .sessions()
            .find_active_by_table(table_id)
            .await?
            .ok_or_else(|| CoreError::NoActiveSession(table_id.to_string()))?;

        let lines = load_lines(&self.db, &order.id).await?;

        let mut tx = self.db.begin().await?;

        let assigned = self
            .db
            .orders()
            .assign_to_table(&mut tx, order_id, table_id)
            .await?;
        if !assigned {
            tx.rollback().await?;
            let from = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(CoreError::InvalidOrderTransition {
                order_id: order.id,
                from,
                to: OrderStatus::Pending,
            }
            .into());
        }

        if let Some((item_id, requested)) =
            decrement_lines(&self.db.menu(), &mut tx, &lines).await?
        {
            tx.rollback().await?;
            return Err(insufficient_stock(&self.db, &item_id, requested).await?);
        }

        tx.commit().await?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        info!(
            order_id = %order.id,
            table_id = %table_id,
            "Draft order assigned to table"
        );

        Ok(order)
    }

    /// Folds a waiting draft into an open consolidated payment. The
    /// draft bills against the payment, the payment's F&B and grand
    /// totals grow by the order total, and stock commits, atomically.
    ///
    /// ## Errors
    /// * `NotFound` - Unknown order or payment
    /// * `InvalidOrderTransition` - Order is not a draft anymore
    /// * `TransactionNotPending` - Payment already closed
    /// * `InsufficientStock` - Stock ran out while the customer waited
    pub async fn assign_order_to_transaction(
        &self,
        order_id: &str,
        transaction_id: &str,
        staff_id: &str,
    ) -> HallResult<FnbOrder> {
        debug!(order_id = %order_id, transaction_id = %transaction_id, "assign_order_to_transaction");

        validate_staff_id(staff_id)?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;
        if order.status != OrderStatus::Draft {
            return Err(CoreError::InvalidOrderTransition {
                order_id: order.id,
                from: order.status,
                to: OrderStatus::Billed,
            }
            .into());
        }

        let payment = self
            .db
            .payments()
            .get_by_id(transaction_id)
            .await?
            .ok_or_else(|| DbError::not_found("Payment", transaction_id))?;
        if payment.status != PaymentStatus::Pending {
            // Refused before any write: the draft stays untouched
            return Err(CoreError::TransactionNotPending {
                payment_id: payment.id,
                status: payment.status,
            }
            .into());
        }

        let lines = load_lines(&self.db, &order.id).await?;

        let mut tx = self.db.begin().await?;

        let assigned = self
            .db
            .orders()
            .assign_to_payment(&mut tx, order_id, transaction_id)
            .await?;
        if !assigned {
            tx.rollback().await?;
            let from = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(CoreError::InvalidOrderTransition {
                order_id: order.id,
                from,
                to: OrderStatus::Billed,
            }
            .into());
        }

        let folded = self
            .db
            .payments()
            .add_order_total(&mut tx, transaction_id, order.total_minor)
            .await?;
        if !folded {
            tx.rollback().await?;
            let status = self
                .db
                .payments()
                .get_by_id(transaction_id)
                .await?
                .map(|p| p.status)
                .unwrap_or(payment.status);
            return Err(CoreError::TransactionNotPending {
                payment_id: transaction_id.to_string(),
                status,
            }
            .into());
        }

        if let Some((item_id, requested)) =
            decrement_lines(&self.db.menu(), &mut tx, &lines).await?
        {
            tx.rollback().await?;
            return Err(insufficient_stock(&self.db, &item_id, requested).await?);
        }

        tx.commit().await?;

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        info!(
            order_id = %order.id,
            transaction_id = %transaction_id,
            amount = %order.total(),
            "Draft order folded into transaction"
        );

        Ok(order)
    }

    /// Cancels an order that is not paid yet. Stock is not restored.
    pub async fn cancel_order(&self, order_id: &str) -> HallResult<FnbOrder> {
        debug!(order_id = %order_id, "cancel_order");

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let cancelled = self.db.orders().cancel(order_id).await?;
        if !cancelled {
            let from = self
                .db
                .orders()
                .get_by_id(order_id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(CoreError::InvalidOrderTransition {
                order_id: order.id,
                from,
                to: OrderStatus::Cancelled,
            }
            .into());
        }

        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        info!(order_id = %order.id, "Order cancelled");

        Ok(order)
    }

    /// Waiting drafts, oldest first.
    pub async fn list_draft_orders(&self) -> HallResult<Vec<FnbOrder>> {
        Ok(self.db.orders().list_drafts().await?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use baize_core::{SessionStatus, TableSession, TableStatus, TaxRate};
    use baize_db::DbConfig;
    use chrono::Utc;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn fnb_tax(pct: f64) -> TaxConfig {
        TaxConfig {
            enabled: true,
            rate: TaxRate::from_percentage(pct),
            name: "PPN".into(),
            apply_to_tables: true,
            apply_to_fnb: true,
        }
    }

    async fn insert_menu_item(
        db: &Database,
        name: &str,
        price_minor: i64,
        stock: i64,
        track: bool,
    ) -> MenuItem {
        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            sku: format!("SKU-{}", &Uuid::new_v4().to_string()[..8]),
            name: name.to_string(),
            category: Some("food".into()),
            price_minor,
            stock_quantity: stock,
            track_stock: track,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.menu().insert(&item).await.unwrap();
        item
    }

    async fn insert_occupied_table_with_session(db: &Database, table_id: &str) -> TableSession {
        let now = Utc::now();
        let table = baize_core::BilliardTable {
            id: table_id.to_string(),
            name: format!("Table {}", table_id),
            status: TableStatus::Available,
            hourly_rate_minor: 50_000,
            per_minute_rate_minor: None,
            pricing_package_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.tables().insert(&table).await.unwrap();

        let session = TableSession {
            id: Uuid::new_v4().to_string(),
            table_id: table_id.to_string(),
            pricing_package_id: None,
            customer_name: "Budi".into(),
            customer_phone: None,
            start_time: now,
            end_time: None,
            planned_duration: 0,
            actual_duration: None,
            original_duration: None,
            duration_type: None,
            status: SessionStatus::Active,
            total_cost_minor: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
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

    async fn insert_payment(db: &Database, status: PaymentStatus, fnb_minor: i64) -> Payment {
        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            transaction_number: generate_transaction_number(),
            customer_name: None,
            customer_phone: None,
            table_amount_minor: 0,
            fnb_amount_minor: fnb_minor,
            discount_amount_minor: 0,
            tax_amount_minor: 0,
            total_amount_minor: fnb_minor,
            payment_methods_json: "[]".into(),
            status,
            staff_id: None,
            created_at: now,
            updated_at: now,
        };
        let mut tx = db.begin().await.unwrap();
        db.payments().insert(&mut tx, &payment).await.unwrap();
        tx.commit().await.unwrap();
        payment
    }

    fn params(context: OrderContext, item: &MenuItem, quantity: i64) -> CreateOrderParams {
        CreateOrderParams {
            context,
            customer_name: Some("Budi".into()),
            customer_phone: None,
            staff_id: "staff-1".into(),
            table_id: None,
            pending_transaction_id: None,
            notes: None,
            items: vec![OrderItemRequest {
                menu_item_id: item.id.clone(),
                quantity,
            }],
        }
    }

    #[tokio::test]
    async fn test_waiting_order_commits_stock_only_on_assignment() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Nasi Goreng", 20_000, 10, true).await;
        insert_occupied_table_with_session(&db, "t1").await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Waiting, &item, 2))
            .await
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Draft);
        assert!(outcome.order.order_number.starts_with("DRAFT-"));
        assert!(outcome.payment.is_none());

        // Customer still waiting: nothing reserved
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 10);
        assert_eq!(svc.list_draft_orders().await.unwrap().len(), 1);

        // Seating them commits the stock once
        let assigned = svc
            .assign_order_to_table(&outcome.order.id, "t1", "staff-1")
            .await
            .unwrap();
        assert_eq!(assigned.status, OrderStatus::Pending);
        assert_eq!(assigned.table_id, Some("t1".to_string()));

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 8);

        // Re-assigning the same order is refused and decrements nothing
        let err = svc
            .assign_order_to_table(&outcome.order.id, "t1", "staff-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 8);
    }

    #[tokio::test]
    async fn test_standalone_order_bills_itself_at_creation() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Es Teh", 5_000, 5, true).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Standalone, &item, 3))
            .await
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Billed);
        assert!(outcome.order.order_number.starts_with("FNB-"));
        assert_eq!(outcome.order.total_minor, 15_000);

        let payment = outcome.payment.unwrap();
        assert_eq!(outcome.order.payment_id, Some(payment.id.clone()));
        assert_eq!(payment.table_amount_minor, 0);
        assert_eq!(payment.fnb_amount_minor, 15_000);
        assert_eq!(payment.total_amount_minor, 15_000);
        assert_eq!(payment.status, PaymentStatus::Pending);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 2);
    }

    #[tokio::test]
    async fn test_table_session_order_requires_active_session() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Kopi", 8_000, 10, true).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());

        // No session on an unknown table
        let mut p = params(OrderContext::TableSession, &item, 1);
        p.table_id = Some("t9".into());
        let err = svc.create_order(p).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Missing table id fails validation before any lookup
        let err = svc
            .create_order(params(OrderContext::TableSession, &item, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        // With a live session the order lands pending on the table
        insert_occupied_table_with_session(&db, "t1").await;
        let mut p = params(OrderContext::TableSession, &item, 1);
        p.table_id = Some("t1".into());
        let outcome = svc.create_order(p).await.unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Pending);
        assert!(outcome.order.order_number.starts_with("TABLE-"));
        assert_eq!(outcome.order.table_id, Some("t1".to_string()));
        assert!(outcome.payment.is_none());

        // Session orders commit stock immediately
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 9);
    }

    #[tokio::test]
    async fn test_fnb_tax_is_baked_into_order_total() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Nasi Goreng", 20_000, 10, true).await;

        let svc = OrderService::new(db.clone(), fnb_tax(11.0));
        let outcome = svc
            .create_order(params(OrderContext::Standalone, &item, 1))
            .await
            .unwrap();

        assert_eq!(outcome.order.subtotal_minor, 20_000);
        assert_eq!(outcome.order.tax_minor, 2_200);
        assert_eq!(outcome.order.total_minor, 22_200);

        // The payment carries the inclusive total; its own tax field
        // stays zero so the tax is never counted twice downstream
        let payment = outcome.payment.unwrap();
        assert_eq!(payment.fnb_amount_minor, 22_200);
        assert_eq!(payment.tax_amount_minor, 0);
        assert_eq!(payment.total_amount_minor, 22_200);
    }

    #[tokio::test]
    async fn test_assign_to_closed_transaction_leaves_draft_untouched() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Kopi", 8_000, 10, true).await;
        let closed = insert_payment(&db, PaymentStatus::Success, 50_000).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Waiting, &item, 1))
            .await
            .unwrap();

        let err = svc
            .assign_order_to_transaction(&outcome.order.id, &closed.id, "staff-1")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            HallError::Domain(CoreError::TransactionNotPending { .. })
        ));

        // Order still waiting, stock still whole, payment untouched
        let order = db.orders().get_by_id(&outcome.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Draft);
        assert!(order.payment_id.is_none());

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 10);

        let payment = db.payments().get_by_id(&closed.id).await.unwrap().unwrap();
        assert_eq!(payment.fnb_amount_minor, 50_000);
    }

    #[tokio::test]
    async fn test_draft_assignment_folds_into_open_transaction() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Kopi", 8_000, 10, true).await;
        let open = insert_payment(&db, PaymentStatus::Pending, 10_000).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Waiting, &item, 2))
            .await
            .unwrap();

        let order = svc
            .assign_order_to_transaction(&outcome.order.id, &open.id, "staff-1")
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Billed);
        assert_eq!(order.payment_id, Some(open.id.clone()));

        // 10,000 existing F&B + 16,000 folded in
        let payment = db.payments().get_by_id(&open.id).await.unwrap().unwrap();
        assert_eq!(payment.fnb_amount_minor, 26_000);
        assert_eq!(payment.total_amount_minor, 26_000);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 8);
    }

    #[tokio::test]
    async fn test_inline_order_against_open_transaction() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Pisang Goreng", 12_000, 4, true).await;
        let open = insert_payment(&db, PaymentStatus::Pending, 10_000).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let mut p = params(OrderContext::PendingTransaction, &item, 1);
        p.pending_transaction_id = Some(open.id.clone());
        let outcome = svc.create_order(p).await.unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Billed);
        assert!(outcome.order.order_number.starts_with("FNB-"));
        assert_eq!(outcome.order.payment_id, Some(open.id.clone()));

        // The outcome carries the post-fold payment amounts
        let payment = outcome.payment.unwrap();
        assert_eq!(payment.id, open.id);
        assert_eq!(payment.fnb_amount_minor, 22_000);
        assert_eq!(payment.total_amount_minor, 22_000);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 3);

        // The same inline flow against a closed target is refused whole
        let closed = insert_payment(&db, PaymentStatus::Cancelled, 0).await;
        let mut p = params(OrderContext::PendingTransaction, &item, 1);
        p.pending_transaction_id = Some(closed.id.clone());
        let err = svc.create_order(p).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 3);
    }

    #[tokio::test]
    async fn test_oversell_rejected_with_current_availability() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Sate", 25_000, 1, true).await;
        insert_occupied_table_with_session(&db, "t1").await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());

        // Catalog check refuses an obvious oversell up front
        let err = svc
            .create_order(params(OrderContext::Standalone, &item, 2))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(matches!(
            err,
            HallError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 2,
                ..
            })
        ));
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 1);

        // Two drafts race for the last unit: the guarded decrement
        // refuses the second with the post-commit availability
        let first = svc
            .create_order(params(OrderContext::Waiting, &item, 1))
            .await
            .unwrap();
        let second = svc
            .create_order(params(OrderContext::Waiting, &item, 1))
            .await
            .unwrap();

        svc.assign_order_to_table(&first.order.id, "t1", "staff-1")
            .await
            .unwrap();
        let err = svc
            .assign_order_to_table(&second.order.id, "t1", "staff-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            HallError::Domain(CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            })
        ));

        // The refused draft is intact and can be cancelled instead
        let order = db.orders().get_by_id(&second.order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Draft);
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_untracked_items_ignore_stock() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Jasa Cue Repair", 30_000, 0, false).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Standalone, &item, 2))
            .await
            .unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Billed);
        assert_eq!(outcome.order.total_minor, 60_000);

        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_cancel_order_keeps_stock_committed() {
        let db = test_db().await;
        let item = insert_menu_item(&db, "Es Teh", 5_000, 5, true).await;

        let svc = OrderService::new(db.clone(), TaxConfig::disabled());
        let outcome = svc
            .create_order(params(OrderContext::Standalone, &item, 2))
            .await
            .unwrap();
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 3);

        let cancelled = svc.cancel_order(&outcome.order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // No restock on cancellation
        let fresh = db.menu().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fresh.stock_quantity, 3);

        // Cancelled is terminal
        let err = svc.cancel_order(&outcome.order.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
