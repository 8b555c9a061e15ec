//! # baize-db: Database Layer for Baize POS
//!
//! This crate provides database access for the Baize POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Baize POS Data Flow                              │
//! │                                                                         │
//! │  Hall Service (end_session)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     baize-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (session.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  order.rs...) │    │              │  │   │
//! │  │   │ SqlitePool    │    │ SessionRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │◄───│ OrderRepo     │    │ 002_idx.sql  │  │   │
//! │  │   │ Management    │    │ PaymentRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │          ~/.local/share/baize-hall/baize.db (or custom)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (session, order, payment...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use baize_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/baize.db");
//! let db = Database::new(config).await?;
//!
//! // Plain reads borrow the pool
//! let active = db.sessions().list_active().await?;
//!
//! // Lifecycle writes share one transaction
//! let mut tx = db.begin().await?;
//! db.sessions().complete(&mut tx, &id, now, total, &payment_id).await?;
//! db.payments().insert(&mut tx, &payment).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::menu::MenuItemRepository;
pub use repository::order::{generate_order_number, OrderRepository};
pub use repository::package::PricingPackageRepository;
pub use repository::payment::{generate_transaction_number, PaymentRepository};
pub use repository::session::SessionRepository;
pub use repository::table::TableRepository;
