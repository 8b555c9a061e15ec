//! # Session Service
//!
//! Orchestrates the table-session lifecycle: start, duration edits,
//! moves, and the end-of-session consolidation that turns elapsed time
//! and pending F&B orders into one payment.
//!
//! ## End-Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       endSession(tableId)                               │
//! │                                                                         │
//! │  POOL READS (before the transaction)                                    │
//! │  ───────────────────────────────────                                    │
//! │  1. Active session for the table        → NotFound if none              │
//! │  2. Table row (legacy rate fallback)                                    │
//! │  3. Pricing package, if referenced                                      │
//! │                                                                         │
//! │  PURE COMPUTATION                                                       │
//! │  ────────────────                                                       │
//! │  4. billedMinutes  = override ?? floor(elapsed/60)                      │
//! │  5. rate           = resolve(override → package → table columns)        │
//! │  6. tableCost      = hourly: ceil-any-remainder · per-minute: >30s up   │
//! │  7. tableTax       = tax(tableCost)        [table category only]        │
//! │                                                                         │
//! │  ONE TRANSACTION                                                        │
//! │  ───────────────                                                        │
//! │  8. Gather pending orders on the table (tax already inside totals)      │
//! │  9. INSERT payment  (table + fnb + tableTax)                            │
//! │ 10. complete session (CAS on status=active; loser rolls back fully,     │
//! │     so the loser's payment row vanishes with it)                        │
//! │ 11. pending orders → billed, linked to the payment                      │
//! │ 12. table → available                                                   │
//! │ 13. COMMIT                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The payment row is inserted before the session is completed because
//! the session's `payment_id` column references it. The CAS in step 10
//! is what serializes concurrent end-session calls: exactly one caller
//! commits, so exactly one payment ever exists per occupancy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use baize_core::billing;
use baize_core::pricing::{self, RateSource};
use baize_core::validation::{
    validate_customer_name, validate_duration_override, validate_planned_duration,
};
use baize_core::{
    BillingKind, CoreError, Money, Payment, PaymentMethodEntry, PaymentStatus, SessionStatus,
    TableSession, TableStatus, TaxConfig,
};
use baize_db::{generate_transaction_number, Database, DbError};

use crate::error::HallResult;

// =============================================================================
// DTOs
// =============================================================================

/// Everything needed to open a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionParams {
    pub table_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,

    /// Planned minutes; 0 opens an untimed session.
    #[serde(default)]
    pub planned_duration_minutes: i64,

    /// Session-level billing override; beats the package category.
    #[serde(default)]
    pub duration_type: Option<BillingKind>,

    /// Required: every session bills under a package (legacy table
    /// columns are a fallback for rates, not for starting).
    pub pricing_package_id: Option<String>,
}

/// The receipt-level cost breakdown returned by `end_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingBreakdown {
    /// Minutes actually billed (manual override or wall clock).
    pub billed_minutes: i64,
    pub billing_kind: BillingKind,
    pub rate_minor: i64,
    pub rate_source: RateSource,
    /// Rounded hours or minutes charged, per the billing kind.
    pub billable_units: i64,
    pub table_cost_minor: i64,
    pub table_tax_minor: i64,
    /// Sum of the billed orders' totals; their tax is already inside.
    pub fnb_total_minor: i64,
    /// F&B tax already included in `fnb_total_minor`, shown separately
    /// on the receipt. Never re-applied here.
    pub fnb_tax_minor: i64,
    pub orders_billed: usize,
    pub total_minor: i64,
}

/// What `end_session` hands back: the sealed session, its payment, and
/// the numbers behind the total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionOutcome {
    pub session: TableSession,
    pub payment: Payment,
    pub breakdown: BillingBreakdown,
}

// =============================================================================
// Session Service
// =============================================================================

/// Table-session lifecycle operations.
#[derive(Debug, Clone)]
pub struct SessionService {
    db: Database,
    tax: TaxConfig,
}

impl SessionService {
    pub fn new(db: Database, tax: TaxConfig) -> Self {
        SessionService { db, tax }
    }

    /// Opens a table: validates, occupies the table, inserts the session.
    ///
    /// ## Errors
    /// * `ValidationError` - Missing customer name or pricing package
    /// * `NotFound` - Unknown table or package id
    /// * `TableUnavailable` - Table is not `available`
    pub async fn start_session(&self, params: StartSessionParams) -> HallResult<TableSession> {
        debug!(table_id = %params.table_id, customer = %params.customer_name, "start_session");

        validate_customer_name(&params.customer_name)?;
        validate_planned_duration(params.planned_duration_minutes)?;

        let package_id = params
            .pricing_package_id
            .as_deref()
            .ok_or_else(|| baize_core::ValidationError::Required {
                field: "pricing_package_id".to_string(),
            })?;

        let package = self
            .db
            .packages()
            .get_by_id(package_id)
            .await?
            .ok_or_else(|| DbError::not_found("PricingPackage", package_id))?;

        let table = self
            .db
            .tables()
            .get_by_id(&params.table_id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", &params.table_id))?;

        if !table.status.is_available() {
            return Err(CoreError::TableUnavailable {
                table_id: table.id,
                status: table.status,
            }
            .into());
        }

        let now = Utc::now();
        let session = TableSession {
            id: Uuid::new_v4().to_string(),
            table_id: params.table_id.clone(),
            pricing_package_id: Some(package.id),
            customer_name: params.customer_name,
            customer_phone: params.customer_phone,
            start_time: now,
            end_time: None,
            planned_duration: params.planned_duration_minutes,
            actual_duration: None,
            original_duration: None,
            duration_type: params.duration_type,
            status: SessionStatus::Active,
            total_cost_minor: None,
            payment_id: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.db.begin().await?;

        let occupied = self
            .db
            .tables()
            .set_status(
                &mut tx,
                &params.table_id,
                TableStatus::Available,
                TableStatus::Occupied,
            )
            .await?;

        if !occupied {
            // Lost the table to a concurrent start; report its status now
            tx.rollback().await?;
            let status = self
                .db
                .tables()
                .get_by_id(&params.table_id)
                .await?
                .map(|t| t.status)
                .unwrap_or(table.status);
            return Err(CoreError::TableUnavailable {
                table_id: params.table_id,
                status,
            }
            .into());
        }

        self.db.sessions().insert(&mut tx, &session).await?;

        tx.commit().await?;

        info!(
            session_id = %session.id,
            table_id = %session.table_id,
            planned = session.planned_duration,
            "Session started"
        );

        Ok(session)
    }

    /// Ends the table's active session: bills the time, sweeps the
    /// table's pending orders into one payment, frees the table.
    ///
    /// ## Errors
    /// * `NoActiveSession` - Nobody is playing on this table
    /// * `SessionAlreadyCompleted` - A concurrent end beat this call
    pub async fn end_session(&self, table_id: &str) -> HallResult<EndSessionOutcome> {
        debug!(table_id = %table_id, "end_session");

        let session = self
            .db
            .sessions()
            .find_active_by_table(table_id)
            .await?
            .ok_or_else(|| CoreError::NoActiveSession(table_id.to_string()))?;

        let table = self
            .db
            .tables()
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", table_id))?;

        // A deleted package silently degrades to the table's legacy rates
        let package = match &session.pricing_package_id {
            Some(id) => self.db.packages().get_by_id(id).await?,
            None => None,
        };

        let now = Utc::now();
        let billed_minutes = session.billed_duration(now);
        let billable_seconds = billed_minutes * 60;

        let resolved = pricing::resolve_rate(session.duration_type, package.as_ref(), &table);
        let table_cost = billing::time_cost(billable_seconds, resolved.kind, resolved.rate);
        let table_tax = self.tax.table_tax(table_cost);

        let mut tx = self.db.begin().await?;

        // Order totals are tax-inclusive from creation; summed, never re-taxed
        let orders = self
            .db
            .orders()
            .list_pending_by_table(&mut tx, table_id)
            .await?;
        let fnb_total: i64 = orders.iter().map(|o| o.total_minor).sum();
        let fnb_tax_included: i64 = orders.iter().map(|o| o.tax_minor).sum();

        let total = table_cost + Money::from_minor(fnb_total) + table_tax;

        let methods = vec![PaymentMethodEntry::cash(total)];
        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            transaction_number: generate_transaction_number(),
            customer_name: Some(session.customer_name.clone()),
            customer_phone: session.customer_phone.clone(),
            table_amount_minor: table_cost.minor(),
            fnb_amount_minor: fnb_total,
            discount_amount_minor: 0,
            tax_amount_minor: table_tax.minor(),
            total_amount_minor: total.minor(),
            payment_methods_json: Payment::encode_payment_methods(&methods)?,
            status: PaymentStatus::Pending,
            staff_id: None,
            created_at: now,
            updated_at: now,
        };

        // Insert before completing: the session row references the payment
        self.db.payments().insert(&mut tx, &payment).await?;

        let completed = self
            .db
            .sessions()
            .complete(&mut tx, &session.id, now, total.minor(), &payment.id)
            .await?;

        if !completed {
            // Another end-session won the CAS; our payment rolls back too
            tx.rollback().await?;
            return Err(CoreError::SessionAlreadyCompleted(session.id).into());
        }

        let orders_billed = self
            .db
            .orders()
            .bill_pending_by_table(&mut tx, table_id, &payment.id)
            .await?;

        let freed = self
            .db
            .tables()
            .set_status(&mut tx, table_id, TableStatus::Occupied, TableStatus::Available)
            .await?;
        if !freed {
            warn!(table_id = %table_id, "Table was not occupied while its session ended");
        }

        tx.commit().await?;

        let session = self
            .db
            .sessions()
            .get_by_id(&session.id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", &session.id))?;

        let breakdown = BillingBreakdown {
            billed_minutes,
            billing_kind: resolved.kind,
            rate_minor: resolved.rate.minor(),
            rate_source: resolved.source,
            billable_units: billing::billable_units(billable_seconds, resolved.kind),
            table_cost_minor: table_cost.minor(),
            table_tax_minor: table_tax.minor(),
            fnb_total_minor: fnb_total,
            fnb_tax_minor: fnb_tax_included,
            orders_billed: orders_billed as usize,
            total_minor: total.minor(),
        };

        info!(
            session_id = %session.id,
            table_id = %table_id,
            billed_minutes,
            orders_billed,
            total = %total,
            "Session ended"
        );

        Ok(EndSessionOutcome {
            session,
            payment,
            breakdown,
        })
    }

    /// Edits a running session's billing inputs: the billing-kind
    /// override and/or a manual billed-minutes override. The planned
    /// value before the first edit is preserved for the receipt.
    pub async fn update_duration(
        &self,
        session_id: &str,
        duration_type: Option<BillingKind>,
        actual_minutes: Option<i64>,
    ) -> HallResult<TableSession> {
        debug!(session_id = %session_id, ?duration_type, ?actual_minutes, "update_duration");

        if let Some(minutes) = actual_minutes {
            validate_duration_override(minutes)?;
        }

        let updated = self
            .db
            .sessions()
            .update_duration(session_id, duration_type, actual_minutes)
            .await?;

        if !updated {
            // Distinguish "unknown id" from "already sealed"
            let session = self
                .db
                .sessions()
                .get_by_id(session_id)
                .await?
                .ok_or_else(|| DbError::not_found("Session", session_id))?;
            return Err(CoreError::SessionAlreadyCompleted(session.id).into());
        }

        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", session_id))?;

        info!(
            session_id = %session.id,
            actual = ?session.actual_duration,
            kind = ?session.duration_type,
            "Session duration updated"
        );

        Ok(session)
    }

    /// Moves an active session to a different table. The clock keeps
    /// running; pending orders follow; both tables flip status.
    ///
    /// ## Errors
    /// * `NotFound` - Unknown session or destination table
    /// * `SessionAlreadyCompleted` - Session is sealed
    /// * `TableUnavailable` - Destination is not `available`
    pub async fn move_session(
        &self,
        session_id: &str,
        destination_table_id: &str,
    ) -> HallResult<TableSession> {
        debug!(session_id = %session_id, destination = %destination_table_id, "move_session");

        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", session_id))?;

        if !session.is_active() {
            return Err(CoreError::SessionAlreadyCompleted(session.id).into());
        }

        let destination = self
            .db
            .tables()
            .get_by_id(destination_table_id)
            .await?
            .ok_or_else(|| DbError::not_found("Table", destination_table_id))?;

        // Moving onto the session's own table lands here too: it is
        // occupied, by this very session
        if !destination.status.is_available() {
            return Err(CoreError::TableUnavailable {
                table_id: destination.id,
                status: destination.status,
            }
            .into());
        }

        let origin_table_id = session.table_id.clone();

        let mut tx = self.db.begin().await?;

        let moved = self
            .db
            .sessions()
            .move_table(&mut tx, session_id, destination_table_id)
            .await?;
        if !moved {
            tx.rollback().await?;
            return Err(CoreError::SessionAlreadyCompleted(session.id).into());
        }

        // Pending orders ride along so end-session finds them
        let repointed = self
            .db
            .orders()
            .repoint_pending(&mut tx, &origin_table_id, destination_table_id)
            .await?;

        let claimed = self
            .db
            .tables()
            .set_status(
                &mut tx,
                destination_table_id,
                TableStatus::Available,
                TableStatus::Occupied,
            )
            .await?;
        if !claimed {
            tx.rollback().await?;
            let status = self
                .db
                .tables()
                .get_by_id(destination_table_id)
                .await?
                .map(|t| t.status)
                .unwrap_or(destination.status);
            return Err(CoreError::TableUnavailable {
                table_id: destination_table_id.to_string(),
                status,
            }
            .into());
        }

        let freed = self
            .db
            .tables()
            .set_status(
                &mut tx,
                &origin_table_id,
                TableStatus::Occupied,
                TableStatus::Available,
            )
            .await?;
        if !freed {
            warn!(table_id = %origin_table_id, "Origin table was not occupied during move");
        }

        tx.commit().await?;

        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", session_id))?;

        info!(
            session_id = %session.id,
            from = %origin_table_id,
            to = %destination_table_id,
            orders_repointed = repointed,
            "Session moved"
        );

        Ok(session)
    }

    /// Ends every active timed session whose planned duration ran out.
    ///
    /// Expiry is derived from persisted fields (`status = active` and
    /// `now >= start + planned`), so a restart never forgets which
    /// sessions are overdue. Per-session failures are logged and retried
    /// on the next sweep rather than aborting the batch.
    ///
    /// ## Returns
    /// Number of sessions ended by this sweep.
    pub async fn sweep_expired(&self) -> HallResult<usize> {
        let now = Utc::now();
        let expired: Vec<TableSession> = self
            .db
            .sessions()
            .list_active()
            .await?
            .into_iter()
            .filter(|s| s.is_expired(now))
            .collect();

        if expired.is_empty() {
            return Ok(0);
        }

        debug!(count = expired.len(), "Expired sessions found");

        let mut ended = 0;
        for session in expired {
            match self.end_session(&session.table_id).await {
                Ok(outcome) => {
                    ended += 1;
                    info!(
                        session_id = %outcome.session.id,
                        table_id = %session.table_id,
                        total = %outcome.payment.total_amount(),
                        "Timed session auto-ended"
                    );
                }
                Err(e) => {
                    error!(
                        ?e,
                        session_id = %session.id,
                        table_id = %session.table_id,
                        "Failed to auto-end expired session"
                    );
                }
            }
        }

        Ok(ended)
    }
}

// =============================================================================
// Tests
// =============================================================================
