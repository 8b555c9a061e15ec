//! # Hall Error Types
//!
//! Error types for the orchestration layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Hall Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Validation    │  │    NotFound     │  │       Conflict          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Missing field  │  │  Unknown id     │  │  TableUnavailable       │ │
//! │  │  Out of range   │  │  NoActiveSession│  │  InsufficientStock      │ │
//! │  │  Rejected before│  │  No retry       │  │  TransactionNotPending  │ │
//! │  │  any mutation   │  │                 │  │  Retry after resolving  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │   Persistence   │  │     Config      │                              │
//! │  │                 │  │                 │                              │
//! │  │  Commit failure │  │  Load/save/parse│                              │
//! │  │  Fully rolled   │  │  Startup only   │                              │
//! │  │  back, caller   │  │                 │                              │
//! │  │  may retry      │  │                 │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain and database errors pass through with their original messages;
//! this type adds the classification callers route on, not another layer
//! of wording.

use thiserror::Error;

use baize_core::{CoreError, ValidationError};
use baize_db::DbError;

/// Result type alias for hall operations.
pub type HallResult<T> = Result<T, HallError>;

/// Hall error type covering every operation failure.
#[derive(Debug, Error)]
pub enum HallError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// A state machine or floor-state rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Input rejected before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// The database layer failed; any open transaction was rolled back.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Payment-method breakdown could not be encoded/decoded.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid hall configuration.
    #[error("invalid hall configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<sqlx::Error> for HallError {
    fn from(err: sqlx::Error) -> Self {
        HallError::Db(DbError::from(err))
    }
}

impl From<std::io::Error> for HallError {
    fn from(err: std::io::Error) -> Self {
        HallError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for HallError {
    fn from(err: toml::de::Error) -> Self {
        HallError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for HallError {
    fn from(err: toml::ser::Error) -> Self {
        HallError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Classification
// =============================================================================

/// The coarse category a caller routes on: reject, 404, retry-after-fix,
/// or retry-as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input was malformed; fix the request.
    Validation,

    /// The referenced entity does not exist (or is not active).
    NotFound,

    /// The floor state does not admit the operation; resolve and retry.
    Conflict,

    /// Storage failed; the transition was rolled back and can be retried.
    Persistence,

    /// Configuration problem at startup.
    Config,
}

impl HallError {
    /// Classifies this error into the category callers route on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HallError::Validation(_) => ErrorKind::Validation,

            HallError::Domain(core) => match core {
                CoreError::Validation(_) => ErrorKind::Validation,
                CoreError::NoActiveSession(_) => ErrorKind::NotFound,
                CoreError::TableUnavailable { .. }
                | CoreError::SessionAlreadyCompleted(_)
                | CoreError::InsufficientStock { .. }
                | CoreError::InvalidOrderTransition { .. }
                | CoreError::TransactionNotPending { .. }
                | CoreError::InvalidPaymentTransition { .. } => ErrorKind::Conflict,
            },

            HallError::Db(db) => match db {
                DbError::NotFound { .. } => ErrorKind::NotFound,
                DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                    ErrorKind::Conflict
                }
                _ => ErrorKind::Persistence,
            },

            HallError::Serialization(_) => ErrorKind::Persistence,

            HallError::InvalidConfig(_)
            | HallError::ConfigLoadFailed(_)
            | HallError::ConfigSaveFailed(_) => ErrorKind::Config,
        }
    }

    /// Returns true if the caller may retry unchanged (storage hiccup).
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Persistence
    }

    /// Returns true if resolving the reported conflict makes the
    /// operation valid again.
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Returns true if the referenced entity was missing.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
