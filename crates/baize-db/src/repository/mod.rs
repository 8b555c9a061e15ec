//! # Repository Module
//!
//! Database repository implementations for Baize POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Hall Service                                                          │
//! │       │                                                                 │
//! │       │  db.sessions().find_active_by_table(&table_id)                 │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  SessionRepository                                                     │
//! │  ├── find_active_by_table(&self, table_id)                             │
//! │  ├── insert(&self, conn, session)                                      │
//! │  ├── complete(&self, conn, id, ...)                                    │
//! │  └── move_table(&self, conn, id, ...)                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Convention:                                                            │
//! │  • Plain reads borrow the pool (`&self`)                               │
//! │  • Lifecycle writes take `conn: &mut SqliteConnection` so several      │
//! │    writes can share one transaction (`&mut *tx`)                       │
//! │  • Status changes are compare-and-swap UPDATEs returning whether       │
//! │    the row actually moved                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`table::TableRepository`] - Billiard table catalog and status
//! - [`package::PricingPackageRepository`] - Named rate plans
//! - [`menu::MenuItemRepository`] - F&B catalog and guarded stock
//! - [`session::SessionRepository`] - Table session lifecycle
//! - [`order::OrderRepository`] - F&B order state machine
//! - [`payment::PaymentRepository`] - Consolidated payments

pub mod menu;
pub mod order;
pub mod package;
pub mod payment;
pub mod session;
pub mod table;
