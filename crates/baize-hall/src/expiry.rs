//! # Expiry Watcher
//!
//! Background loop that ends timed sessions when their booked minutes
//! run out, so a 30-minute table stops billing at minute 30 whether or
//! not staff are looking at it.
//!
//! Expiry is a derived predicate over persisted fields, never a stored
//! flag or an in-process timer: a session is overdue when it is active
//! and `now >= start_time + planned_duration`. The watcher only asks
//! that question on a fixed tick, which makes it restart-safe — kill
//! the process mid-tick and the next start picks the same sessions up
//! again. Sessions that fail to end are logged and come back on the
//! following tick.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::sessions::SessionService;

/// Polls for overdue timed sessions and ends them.
pub struct ExpiryWatcher {
    sessions: SessionService,
    poll_interval: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Clonable handle for stopping the watcher.
#[derive(Clone)]
pub struct ExpiryWatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ExpiryWatcherHandle {
    /// Asks the watcher to stop after its current tick. A no-op if the
    /// watcher already stopped.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl ExpiryWatcher {
    /// Creates the watcher and its shutdown handle. Call `run()` on a
    /// spawned task to start ticking.
    pub fn new(sessions: SessionService, poll_interval: Duration) -> (Self, ExpiryWatcherHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        (
            ExpiryWatcher {
                sessions,
                poll_interval,
                shutdown_rx,
            },
            ExpiryWatcherHandle { shutdown_tx },
        )
    }

    /// Runs until shutdown, sweeping once per tick.
    pub async fn run(mut self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Expiry watcher starting"
        );

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match self.sessions.sweep_expired().await {
                        Ok(0) => {}
                        Ok(ended) => {
                            info!(ended, "Expiry sweep ended sessions");
                        }
                        Err(e) => {
                            // Sessions stay overdue; the next tick retries
                            error!(?e, "Expiry sweep failed");
                        }
                    }
                }
                _ = self.shutdown_rx.recv() => {
                    info!("Expiry watcher shutting down");
                    break;
                }
            }
        }

        info!("Expiry watcher stopped");
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use baize_core::{
        BilliardTable, BillingKind, PricingPackage, SessionStatus, TableSession, TableStatus,
        TaxConfig,
    };
    use baize_db::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_overdue_session(db: &Database, table_id: &str) -> TableSession {
        let now = Utc::now();
        let table = BilliardTable {
            id: table_id.to_string(),
            name: format!("Table {}", table_id),
            status: TableStatus::Available,
            hourly_rate_minor: 0,
            per_minute_rate_minor: None,
            pricing_package_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.tables().insert(&table).await.unwrap();

        let package = PricingPackage {
            id: Uuid::new_v4().to_string(),
            name: "Regular".into(),
            category: BillingKind::Hourly,
            hourly_rate_minor: Some(50_000),
            per_minute_rate_minor: None,
            is_default: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.packages().insert(&package).await.unwrap();

        // 45 minutes into a 30-minute booking
        let start = now - chrono::Duration::minutes(45);
        let session = TableSession {
            id: Uuid::new_v4().to_string(),
            table_id: table_id.to_string(),
            pricing_package_id: Some(package.id),
            customer_name: "Budi".into(),
            customer_phone: None,
            start_time: start,
            end_time: None,
            planned_duration: 30,
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

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let db = test_db().await;
        let sessions = SessionService::new(db, TaxConfig::disabled());

        let (watcher, handle) = ExpiryWatcher::new(sessions, Duration::from_millis(50));
        let task = tokio::spawn(watcher.run());

        handle.shutdown().await;
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();

        // A second shutdown after the loop is gone must not hang or panic
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_watcher_ends_overdue_session() {
        let db = test_db().await;
        let session = seed_overdue_session(&db, "t1").await;

        let sessions = SessionService::new(db.clone(), TaxConfig::disabled());
        let (watcher, handle) = ExpiryWatcher::new(sessions, Duration::from_millis(10));
        let task = tokio::spawn(watcher.run());

        // First tick fires immediately; give it room on a slow runner
        let mut completed = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let current = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
            if current.status == SessionStatus::Completed {
                completed = true;
                break;
            }
        }
        assert!(completed, "watcher never ended the overdue session");

        let sealed = db.sessions().get_by_id(&session.id).await.unwrap().unwrap();
        assert!(sealed.payment_id.is_some());
        let table = db.tables().get_by_id("t1").await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Available);

        handle.shutdown().await;
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
    }
}
