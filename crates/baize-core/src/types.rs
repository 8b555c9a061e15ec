//! # Domain Types
//!
//! Core domain types used throughout Baize POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ BilliardTable   │   │  TableSession   │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  status         │   │  start/end time │   │  transaction_no │       │
//! │  │  legacy rates   │   │  planned_dur    │   │  table/fnb amts │       │
//! │  │  package ref    │   │  total_cost     │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    MenuItem     │   │    FnbOrder     │   │  FnbOrderItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price, stock   │   │  context        │   │  price snapshot │       │
//! │  └─────────────────┘   │  status machine │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (order_number, transaction_number, sku) - human-readable
//!
//! ## State Machines
//! Status fields are closed enums with explicit transition tables
//! (`can_transition_to`). Anything not listed there is rejected before it
//! reaches the database, and the database CAS guards reject it again.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1100 bps = 11% (Indonesian PPN)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Billing Kind
// =============================================================================

/// How table time is billed: whole hours or whole minutes.
///
/// Appears in three places with descending priority: a session-level
/// override (`duration_type`), a pricing package `category`, and the
/// legacy per-table rate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum BillingKind {
    /// Any started hour bills as a full hour.
    Hourly,
    /// Minutes bill as counted, rounding up past 30 leftover seconds.
    PerMinute,
}

impl BillingKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            BillingKind::Hourly => "hourly",
            BillingKind::PerMinute => "per_minute",
        }
    }
}

impl fmt::Display for BillingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for BillingKind {
    fn default() -> Self {
        BillingKind::Hourly
    }
}

// =============================================================================
// Table Status
// =============================================================================

/// The status of a billiard table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// Free for a new session.
    Available,
    /// An active session holds the table.
    Occupied,
    /// Out of service; cannot be occupied.
    Maintenance,
    /// Held for a booking; cannot be walk-in occupied.
    Reserved,
}

impl TableStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Maintenance => "maintenance",
            TableStatus::Reserved => "reserved",
        }
    }

    /// Only an available table can start a session or receive a move.
    #[inline]
    pub const fn is_available(&self) -> bool {
        matches!(self, TableStatus::Available)
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Available
    }
}

// =============================================================================
// Session Status
// =============================================================================

/// The status of a table session. Two states only: a session is either
/// running or sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Clock running; end_time and total_cost are unset.
    Active,
    /// Sealed; end_time and total_cost are frozen.
    Completed,
}

impl SessionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Active
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an F&B order.
///
/// ## Transition Table
/// ```text
/// draft ────► pending ────► billed ────► paid
///   │            │            │
///   └────────────┴────────────┴────────► cancelled
/// ```
/// `draft → billed` is also legal (assign-to-transaction and the
/// standalone auto-bill both skip `pending`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Not attached to any bill; stock not yet committed.
    Draft,
    /// Attached to a table's running bill.
    Pending,
    /// Rolled into a payment, awaiting settlement.
    Billed,
    /// Settled.
    Paid,
    /// Abandoned before settlement.
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Billed => "billed",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Exhaustive transition table. Anything not listed is rejected.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Draft, OrderStatus::Pending)
                | (OrderStatus::Draft, OrderStatus::Billed)
                | (OrderStatus::Draft, OrderStatus::Cancelled)
                | (OrderStatus::Pending, OrderStatus::Billed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Billed, OrderStatus::Paid)
                | (OrderStatus::Billed, OrderStatus::Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Draft
    }
}

// =============================================================================
// Order Context
// =============================================================================

/// Where an F&B order was born. Selected exactly once, at creation, and
/// never changed afterwards; every policy difference between the four
/// flows hangs off this enum instead of string comparisons scattered
/// through handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderContext {
    /// Counter sale: billed to its own fresh payment immediately.
    Standalone,
    /// Parked draft: no bill, no stock movement until assigned.
    Waiting,
    /// Ordered at an occupied table; rides that table's session bill.
    TableSession,
    /// Draft destined for an existing pending payment.
    PendingTransaction,
}

impl OrderContext {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderContext::Standalone => "standalone",
            OrderContext::Waiting => "waiting",
            OrderContext::TableSession => "table_session",
            OrderContext::PendingTransaction => "pending_transaction",
        }
    }

    /// Status the order carries the moment it is created.
    pub const fn initial_status(&self) -> OrderStatus {
        match self {
            OrderContext::Standalone => OrderStatus::Pending,
            OrderContext::Waiting => OrderStatus::Draft,
            OrderContext::TableSession => OrderStatus::Pending,
            OrderContext::PendingTransaction => OrderStatus::Draft,
        }
    }

    /// Whether stock is committed at creation. Contexts that start in
    /// draft defer the decrement to the assignment operation, so stock
    /// moves exactly once, when the order leaves draft.
    pub const fn commits_stock_at_creation(&self) -> bool {
        match self {
            OrderContext::Standalone | OrderContext::TableSession => true,
            OrderContext::Waiting | OrderContext::PendingTransaction => false,
        }
    }

    /// Order-number prefix. Counter flows share `FNB`; parked drafts and
    /// table orders are distinguishable at a glance on the floor.
    pub const fn number_prefix(&self) -> &'static str {
        match self {
            OrderContext::Standalone | OrderContext::PendingTransaction => "FNB",
            OrderContext::Waiting => "DRAFT",
            OrderContext::TableSession => "TABLE",
        }
    }

    /// Table-session orders must name the table they ride on.
    pub const fn requires_table(&self) -> bool {
        matches!(self, OrderContext::TableSession)
    }

    /// Pending-transaction orders need a target payment to ever leave
    /// draft.
    pub const fn requires_transaction(&self) -> bool {
        matches!(self, OrderContext::PendingTransaction)
    }
}

impl fmt::Display for OrderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// The status of a consolidated payment. Forward-only: once out of
/// pending, a payment never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting settlement; still accepts attached orders.
    Pending,
    /// Settled.
    Success,
    /// Settlement attempted and failed.
    Failed,
    /// Abandoned by staff.
    Cancelled,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Exhaustive transition table: pending fans out, nothing returns.
    pub const fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Success)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Pending, PaymentStatus::Cancelled)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash at the counter.
    Cash,
    /// Card on an external terminal.
    Card,
    /// QRIS scan-to-pay.
    Qris,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a payment's method breakdown (split tender). The list is
/// serialized as JSON into the payment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodEntry {
    pub method: PaymentMethod,
    pub amount_minor: i64,
}

impl PaymentMethodEntry {
    /// The default breakdown: one cash entry covering the whole total.
    pub fn cash(amount: Money) -> Self {
        PaymentMethodEntry {
            method: PaymentMethod::Cash,
            amount_minor: amount.minor(),
        }
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

// =============================================================================
// Pricing Package
// =============================================================================

/// A named rate plan. Only the rate matching `category` is meaningful;
/// the other column stays NULL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PricingPackage {
    pub id: String,
    pub name: String,
    pub category: BillingKind,
    pub hourly_rate_minor: Option<i64>,
    pub per_minute_rate_minor: Option<i64>,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PricingPackage {
    /// Returns the hourly rate as Money, if configured.
    #[inline]
    pub fn hourly_rate(&self) -> Option<Money> {
        self.hourly_rate_minor.map(Money::from_minor)
    }

    /// Returns the per-minute rate as Money, if configured.
    #[inline]
    pub fn per_minute_rate(&self) -> Option<Money> {
        self.per_minute_rate_minor.map(Money::from_minor)
    }

    /// The rate matching this package's own category.
    pub fn configured_rate(&self) -> Option<Money> {
        match self.category {
            BillingKind::Hourly => self.hourly_rate(),
            BillingKind::PerMinute => self.per_minute_rate(),
        }
    }
}

// =============================================================================
// Billiard Table
// =============================================================================

/// A rentable table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BilliardTable {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the floor map ("Table 01").
    pub name: String,

    pub status: TableStatus,

    /// Legacy per-table hourly rate, used when no package resolves.
    pub hourly_rate_minor: i64,

    /// Legacy per-table per-minute rate. Its presence flips the legacy
    /// billing default to per-minute.
    pub per_minute_rate_minor: Option<i64>,

    /// Default pricing package for sessions on this table.
    pub pricing_package_id: Option<String>,

    /// Whether the table is listed (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BilliardTable {
    /// Returns the legacy hourly rate as Money.
    #[inline]
    pub fn hourly_rate(&self) -> Money {
        Money::from_minor(self.hourly_rate_minor)
    }

    /// Returns the legacy per-minute rate as Money, if configured.
    #[inline]
    pub fn per_minute_rate(&self) -> Option<Money> {
        self.per_minute_rate_minor.map(Money::from_minor)
    }
}

// =============================================================================
// Table Session
// =============================================================================

/// One rental occupancy of a table, from first break to checkout.
///
/// While `status` is active, `end_time`, `total_cost_minor` and
/// `payment_id` are all None. Completing the session sets the three
/// together, atomically, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TableSession {
    pub id: String,
    pub table_id: String,
    pub pricing_package_id: Option<String>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,

    /// Planned minutes; 0 means open-ended (no auto-expiry).
    pub planned_duration: i64,

    /// Manual override of the billed minutes, set by staff before end.
    pub actual_duration: Option<i64>,

    /// The planned value before any manual edit, kept for the receipt.
    pub original_duration: Option<i64>,

    /// Session-level billing override; beats the package category.
    pub duration_type: Option<BillingKind>,

    pub status: SessionStatus,
    pub total_cost_minor: Option<i64>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TableSession {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Returns the frozen total cost as Money, once completed.
    #[inline]
    pub fn total_cost(&self) -> Option<Money> {
        self.total_cost_minor.map(Money::from_minor)
    }

    /// Wall-clock seconds since start, clamped so clock skew can never
    /// produce negative elapsed time.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_seconds().max(0)
    }

    /// Whole minutes since start (floor), the default billed duration.
    pub fn calculated_duration(&self, now: DateTime<Utc>) -> i64 {
        self.elapsed_seconds(now) / 60
    }

    /// Minutes actually billed: the manual override when staff set one,
    /// otherwise the wall-clock calculation.
    pub fn billed_duration(&self, now: DateTime<Utc>) -> i64 {
        self.actual_duration
            .unwrap_or_else(|| self.calculated_duration(now))
    }

    /// When a planned session runs out, or None for open-ended ones.
    pub fn planned_end(&self) -> Option<DateTime<Utc>> {
        if self.planned_duration > 0 {
            Some(self.start_time + Duration::minutes(self.planned_duration))
        } else {
            None
        }
    }

    /// The auto-end predicate: an active planned session whose clock ran
    /// out. Derived from persisted fields only, so it survives restarts
    /// and needs no in-memory bookkeeping.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.is_active()
            && self
                .planned_end()
                .map(|end| now >= end)
                .unwrap_or(false)
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// An F&B catalog row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: String,
    /// Business identifier, unique across the catalog.
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub price_minor: i64,
    pub stock_quantity: i64,
    /// When false, the item sells without stock accounting (services,
    /// open kitchen items).
    pub track_stock: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    /// Returns the current catalog price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }

    /// Checks whether the requested quantity can be fulfilled right now.
    /// Advisory only: the decrement itself re-validates inside the
    /// transaction.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        if !self.track_stock {
            return true;
        }
        self.stock_quantity >= quantity
    }
}

// =============================================================================
// F&B Order
// =============================================================================

/// A food & beverage order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FnbOrder {
    pub id: String,
    pub order_number: String,
    pub context: OrderContext,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub table_id: Option<String>,
    pub staff_id: String,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FnbOrder {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_minor(self.tax_minor)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }
}

// =============================================================================
// F&B Order Item
// =============================================================================

/// A line item in an F&B order.
/// Uses snapshot pattern to freeze catalog data at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FnbOrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    /// Item name at order time (frozen).
    pub name_snapshot: String,
    /// Unit price at order time (frozen).
    pub unit_price_minor: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub subtotal_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl FnbOrderItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_price_minor)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// The consolidated monetary record for one checkout event. Sessions and
/// orders reference it; it references nothing, so a payment can outlive
/// any particular aggregation of sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    pub transaction_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub table_amount_minor: i64,
    pub fnb_amount_minor: i64,
    pub discount_amount_minor: i64,
    pub tax_amount_minor: i64,
    /// Always table + fnb − discount + tax.
    pub total_amount_minor: i64,
    /// JSON-serialized `Vec<PaymentMethodEntry>`.
    pub payment_methods_json: String,
    pub status: PaymentStatus,
    pub staff_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn table_amount(&self) -> Money {
        Money::from_minor(self.table_amount_minor)
    }

    #[inline]
    pub fn fnb_amount(&self) -> Money {
        Money::from_minor(self.fnb_amount_minor)
    }

    #[inline]
    pub fn discount_amount(&self) -> Money {
        Money::from_minor(self.discount_amount_minor)
    }

    #[inline]
    pub fn tax_amount(&self) -> Money {
        Money::from_minor(self.tax_amount_minor)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_minor(self.total_amount_minor)
    }

    /// Decodes the method breakdown stored on the row.
    pub fn payment_methods(&self) -> Result<Vec<PaymentMethodEntry>, serde_json::Error> {
        serde_json::from_str(&self.payment_methods_json)
    }

    /// Encodes a method breakdown for storage.
    pub fn encode_payment_methods(
        entries: &[PaymentMethodEntry],
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session_at(start: DateTime<Utc>, planned: i64) -> TableSession {
        TableSession {
            id: "s1".into(),
            table_id: "t1".into(),
            pricing_package_id: None,
            customer_name: "Budi".into(),
            customer_phone: None,
            start_time: start,
            end_time: None,
            planned_duration: planned,
            actual_duration: None,
            original_duration: None,
            duration_type: None,
            status: SessionStatus::Active,
            total_cost_minor: None,
            payment_id: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1100);
        assert_eq!(rate.bps(), 1100);
        assert!((rate.percentage() - 11.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(11.0);
        assert_eq!(rate.bps(), 1100);
    }

    #[test]
    fn test_order_status_transition_table() {
        use OrderStatus::*;

        assert!(Draft.can_transition_to(Pending));
        assert!(Draft.can_transition_to(Billed));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Pending.can_transition_to(Billed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Billed.can_transition_to(Paid));
        assert!(Billed.can_transition_to(Cancelled));

        // No path backwards, nothing leaves a terminal state
        assert!(!Pending.can_transition_to(Draft));
        assert!(!Billed.can_transition_to(Pending));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Paid));
    }

    #[test]
    fn test_payment_status_forward_only() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Success));
        assert!(Pending.can_transition_to(Failed));
        assert!(Pending.can_transition_to(Cancelled));

        assert!(!Success.can_transition_to(Pending));
        assert!(!Success.can_transition_to(Cancelled));
        assert!(!Failed.can_transition_to(Success));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_order_context_policies() {
        use OrderContext::*;

        assert_eq!(Standalone.initial_status(), OrderStatus::Pending);
        assert_eq!(Waiting.initial_status(), OrderStatus::Draft);
        assert_eq!(TableSession.initial_status(), OrderStatus::Pending);
        assert_eq!(PendingTransaction.initial_status(), OrderStatus::Draft);

        assert!(Standalone.commits_stock_at_creation());
        assert!(TableSession.commits_stock_at_creation());
        assert!(!Waiting.commits_stock_at_creation());
        assert!(!PendingTransaction.commits_stock_at_creation());

        assert_eq!(Standalone.number_prefix(), "FNB");
        assert_eq!(Waiting.number_prefix(), "DRAFT");
        assert_eq!(TableSession.number_prefix(), "TABLE");
        assert_eq!(PendingTransaction.number_prefix(), "FNB");

        assert!(TableSession.requires_table());
        assert!(!Standalone.requires_table());
        assert!(PendingTransaction.requires_transaction());
        assert!(!Waiting.requires_transaction());
    }

    #[test]
    fn test_session_expiry_predicate() {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        let planned = session_at(start, 60);

        assert!(!planned.is_expired(start + Duration::minutes(59)));
        assert!(planned.is_expired(start + Duration::minutes(60)));
        assert!(planned.is_expired(start + Duration::minutes(90)));

        // Open-ended sessions never expire
        let open = session_at(start, 0);
        assert!(!open.is_expired(start + Duration::hours(12)));

        // Completed sessions never expire again
        let mut done = session_at(start, 60);
        done.status = SessionStatus::Completed;
        assert!(!done.is_expired(start + Duration::hours(2)));
    }

    #[test]
    fn test_session_durations() {
        let start = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        let session = session_at(start, 0);
        let now = start + Duration::minutes(90) + Duration::seconds(45);

        assert_eq!(session.calculated_duration(now), 90);

        // Clock skew clamps to zero, never negative
        assert_eq!(session.elapsed_seconds(start - Duration::seconds(30)), 0);

        // Manual override wins over the wall clock
        let mut edited = session_at(start, 0);
        edited.actual_duration = Some(120);
        assert_eq!(edited.billed_duration(now), 120);
    }

    #[test]
    fn test_menu_item_can_fulfill() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        let mut item = MenuItem {
            id: "m1".into(),
            sku: "ES-TEH".into(),
            name: "Es Teh".into(),
            category: Some("drinks".into()),
            price_minor: 8_000,
            stock_quantity: 5,
            track_stock: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        assert!(item.can_fulfill(5));
        assert!(!item.can_fulfill(6));

        item.track_stock = false;
        assert!(item.can_fulfill(999));
    }

    #[test]
    fn test_payment_methods_roundtrip() {
        let entries = vec![
            PaymentMethodEntry::cash(Money::from_minor(100_000)),
            PaymentMethodEntry {
                method: PaymentMethod::Qris,
                amount_minor: 38_500,
            },
        ];

        let json = Payment::encode_payment_methods(&entries).unwrap();
        let decoded: Vec<PaymentMethodEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, entries);
        assert_eq!(decoded[0].method, PaymentMethod::Cash);
        assert_eq!(decoded[0].amount(), Money::from_minor(100_000));
    }
}
