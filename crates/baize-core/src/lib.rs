//! # baize-core: Pure Business Logic for Baize POS
//!
//! This crate is the **heart** of Baize POS. It contains all billing,
//! pricing, and tax logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Baize POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  baize-hall (Service Layer)                     │   │
//! │  │   start_session, end_session, create_order, confirm_payment    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ baize-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  types  │ │  money  │ │ billing │ │ pricing │ │   tax   │ │   │
//! │  │   │ Session │ │  Money  │ │ hours/  │ │  rate   │ │ engine  │ │   │
//! │  │   │  Order  │ │ TaxRate │ │ minutes │ │ resolve │ │         │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    baize-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BilliardTable, TableSession, FnbOrder, Payment)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`billing`] - Elapsed time → billable units → cost
//! - [`pricing`] - Rate resolution (override → package → legacy table)
//! - [`tax`] - Selective tax over table-time vs. F&B revenue
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, clock access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64), no float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use baize_core::billing::{billable_hours, hourly_cost};
//! use baize_core::money::Money;
//!
//! // 90 minutes on an Rp50.000/hour table bills 2 whole hours
//! assert_eq!(billable_hours(5400), 2);
//!
//! let cost = hourly_cost(5400, Money::from_minor(50_000));
//! assert_eq!(cost, Money::from_minor(100_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod pricing;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use baize_core::Money` instead of
// `use baize_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{RateSource, ResolvedRate};
pub use tax::{RevenueCategory, TaxConfig};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single F&B order
///
/// ## Business Reason
/// Prevents runaway orders and keeps kitchen tickets printable.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single item per order line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum planned or overridden session duration, in minutes (one week)
///
/// ## Business Reason
/// A session "planned" past this is a typo, not a tournament.
pub const MAX_PLANNED_DURATION_MINUTES: i64 = 7 * 24 * 60;
