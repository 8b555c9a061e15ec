//! # Baize Hall
//!
//! The service layer of Baize POS: every operation the hall floor
//! performs — opening a table, taking an order, cutting the bill —
//! enters through one of the services in this crate.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             baize-hall                                  │
//! │                                                                         │
//! │  SessionService      start / end / move / edit duration, plus the      │
//! │                      end-of-session consolidation that turns time      │
//! │                      and pending orders into one payment               │
//! │                                                                         │
//! │  OrderService        F&B orders in four contexts, each with its own    │
//! │                      first status and stock-commit moment              │
//! │                                                                         │
//! │  PaymentService      manual consolidation, confirm/cancel/fail,        │
//! │                      reverse lookups from sessions and orders          │
//! │                                                                         │
//! │  ExpiryWatcher       background tick that ends timed sessions whose    │
//! │                      booked minutes ran out                            │
//! │                                                                         │
//! │  HallConfig          TOML + env configuration: hall identity, tax,     │
//! │                      sweep interval                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//!            │                                      │
//!            ▼                                      ▼
//!       baize-core                             baize-db
//!       (billing, tax, state machines)         (SQLite, transactions)
//! ```
//!
//! Services are cheap to clone: they hold the shared connection pool
//! and a tax snapshot, nothing else.
//!
//! ## Usage
//!
//! ```no_run
//! use baize_db::{Database, DbConfig};
//! use baize_hall::{ExpiryWatcher, HallConfig, SessionService, StartSessionParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HallConfig::load_or_default(None);
//!     let db = Database::new(DbConfig::new("baize.db")).await?;
//!
//!     let sessions = SessionService::new(db.clone(), config.tax_config());
//!
//!     let (watcher, handle) = ExpiryWatcher::new(sessions.clone(), config.expiry_poll_interval());
//!     tokio::spawn(watcher.run());
//!
//!     let session = sessions
//!         .start_session(StartSessionParams {
//!             table_id: "table-1".into(),
//!             customer_name: "Budi".into(),
//!             customer_phone: None,
//!             planned_duration_minutes: 60,
//!             duration_type: None,
//!             pricing_package_id: Some("package-regular".into()),
//!         })
//!         .await?;
//!     println!("{} opened {}", session.customer_name, session.table_id);
//!
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod expiry;
pub mod orders;
pub mod payments;
pub mod sessions;

pub use config::{BillingSettings, HallConfig, HallSettings, TaxSettings};
pub use error::{ErrorKind, HallError, HallResult};
pub use expiry::{ExpiryWatcher, ExpiryWatcherHandle};
pub use orders::{CreateOrderOutcome, CreateOrderParams, OrderItemRequest, OrderService};
pub use payments::{ConsolidationParams, PaymentDetails, PaymentService};
pub use sessions::{BillingBreakdown, EndSessionOutcome, SessionService, StartSessionParams};
