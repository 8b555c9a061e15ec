//! # Menu Item Repository
//!
//! Database operations for the F&B catalog, including the guarded stock
//! decrement every order commit goes through.
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Decrement Strategy                             │
//! │                                                                         │
//! │  ❌ WRONG: Read stock, check in Rust, write new value                  │
//! │     stock = SELECT stock_quantity ...        (reads 5)                 │
//! │     if stock >= 3 { UPDATE ... SET stock_quantity = 2 }                │
//! │     Two concurrent orders both read 5 → oversell                       │
//! │                                                                         │
//! │  ✅ CORRECT: Single guarded UPDATE                                     │
//! │     UPDATE menu_items                                                  │
//! │     SET stock_quantity = stock_quantity - 3                            │
//! │     WHERE id = ? AND stock_quantity >= 3                               │
//! │                                                                         │
//! │  The WHERE clause re-validates stock at write time, inside the         │
//! │  order's transaction. Zero rows affected means another order won       │
//! │  the race; the caller rolls back and reports insufficient stock.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use baize_core::MenuItem;

/// Repository for menu item database operations.
#[derive(Debug, Clone)]
pub struct MenuItemRepository {
    pool: SqlitePool,
}

impl MenuItemRepository {
    /// Creates a new MenuItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuItemRepository { pool }
    }

    /// Gets a menu item by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, sku, name, category, price_minor, stock_quantity,
                   track_stock, is_active, created_at, updated_at
            FROM menu_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists active menu items, ordered by category then name.
    pub async fn list_active(&self) -> DbResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            r#"
            SELECT id, sku, name, category, price_minor, stock_quantity,
                   track_stock, is_active, created_at, updated_at
            FROM menu_items
            WHERE is_active = 1
            ORDER BY category, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Inserts a new menu item.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(sku = %item.sku, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, sku, name, category, price_minor, stock_quantity,
                track_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.price_minor)
        .bind(item.stock_quantity)
        .bind(item.track_stock)
        .bind(item.is_active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing menu item (catalog edit).
    ///
    /// Orders are unaffected: they snapshot name and price at creation.
    pub async fn update(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating menu item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                sku = ?2,
                name = ?3,
                category = ?4,
                price_minor = ?5,
                stock_quantity = ?6,
                track_stock = ?7,
                is_active = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.price_minor)
        .bind(item.stock_quantity)
        .bind(item.track_stock)
        .bind(item.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", &item.id));
        }

        Ok(())
    }

    /// Atomically decrements stock, guarded against oversell.
    ///
    /// Only call for items with `track_stock` set; non-tracked items
    /// never decrement. Runs on the caller's transaction so the stock
    /// change commits (or rolls back) together with the order status
    /// transition that justified it.
    ///
    /// ## Returns
    /// * `Ok(true)` - Stock decremented
    /// * `Ok(false)` - Not enough stock (row untouched, caller rolls back)
    pub async fn decrement_stock(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, quantity = %quantity, "Decrementing stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                stock_quantity = stock_quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adjusts stock by a delta (restock or manual correction).
    ///
    /// ## Arguments
    /// * `delta` - Positive for restocking, negative for shrinkage
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE menu_items SET
                stock_quantity = stock_quantity + ?2,
                updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        Ok(())
    }

    /// Counts active menu items (for diagnostics and seed checks).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use baize_core::MenuItem;

    fn item(stock: i64) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: uuid::Uuid::new_v4().to_string(),
            sku: format!("TST-{}", uuid::Uuid::new_v4().simple()),
            name: "Es Teh Manis".to_string(),
            category: Some("drinks".to_string()),
            price_minor: 8_000,
            stock_quantity: stock,
            track_stock: true,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_decrement_respects_floor() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let it = item(5);
        repo.insert(&it).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        assert!(repo.decrement_stock(&mut tx, &it.id, 3).await.unwrap());
        tx.commit().await.unwrap();

        // Only 2 left; a second decrement of 3 must refuse and leave stock alone
        let mut tx = db.begin().await.unwrap();
        assert!(!repo.decrement_stock(&mut tx, &it.id, 3).await.unwrap());
        tx.commit().await.unwrap();

        let after = repo.get_by_id(&it.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 2);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let mut first = item(10);
        first.sku = "DRK-001".to_string();
        repo.insert(&first).await.unwrap();

        let mut second = item(10);
        second.sku = "DRK-001".to_string();
        let err = repo.insert(&second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_restocks() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        let it = item(1);
        repo.insert(&it).await.unwrap();
        repo.adjust_stock(&it.id, 24).await.unwrap();

        let after = repo.get_by_id(&it.id).await.unwrap().unwrap();
        assert_eq!(after.stock_quantity, 25);
    }
}
