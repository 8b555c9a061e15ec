//! # Error Types
//!
//! Domain-specific error types for baize-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  baize-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  baize-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  baize-hall errors (service crate)                                     │
//! │  └── HallError        - The four caller-facing categories              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → HallError → Caller      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (table id, order id, status)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::types::{OrderStatus, PaymentStatus, TableStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// These are the user-actionable failures: the caller did something the
/// state machines forbid, or the floor state does not match the request.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No active session holds this table.
    ///
    /// ## When This Occurs
    /// - endSession called on a table nobody is playing on
    /// - endSession raced another endSession and lost
    #[error("no active session for table {0}")]
    NoActiveSession(String),

    /// Table is not available for a new session or an incoming move.
    #[error("table {table_id} is {status}, not available")]
    TableUnavailable {
        table_id: String,
        status: TableStatus,
    },

    /// Session is already sealed; its cost and end time are immutable.
    #[error("session {0} is already completed")]
    SessionAlreadyCompleted(String),

    /// Insufficient stock to commit the order.
    ///
    /// ## When This Occurs
    /// - An order leaves draft and the guarded decrement finds less
    ///   stock than the order needs (another order got there first)
    ///
    /// ## User Workflow
    /// ```text
    /// Assign draft to table (2 × Es Teh)
    ///      │
    ///      ▼
    /// Guarded decrement: stock = 1
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Es Teh", available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// UI shows: "Only 1 Es Teh left"
    /// ```
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// The order's status does not admit the requested transition.
    #[error("order {order_id} is {from}, cannot move to {to}")]
    InvalidOrderTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Target payment must be pending to accept an order.
    #[error("transaction {payment_id} is {status}, not pending")]
    TransactionNotPending {
        payment_id: String,
        status: PaymentStatus,
    },

    /// The payment's status does not admit the requested transition.
    #[error("payment {payment_id} is {from}, cannot move to {to}")]
    InvalidPaymentTransition {
        payment_id: String,
        from: PaymentStatus,
        to: PaymentStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation, always before any mutation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
