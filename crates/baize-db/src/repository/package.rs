//! # Pricing Package Repository
//!
//! Database operations for named rate plans.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use baize_core::PricingPackage;

/// Repository for pricing package operations.
#[derive(Debug, Clone)]
pub struct PricingPackageRepository {
    pool: SqlitePool,
}

impl PricingPackageRepository {
    /// Creates a new PricingPackageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PricingPackageRepository { pool }
    }

    /// Gets a package by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PricingPackage>> {
        let package = sqlx::query_as::<_, PricingPackage>(
            r#"
            SELECT id, name, category, hourly_rate_minor, per_minute_rate_minor,
                   is_default, is_active, created_at, updated_at
            FROM pricing_packages
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(package)
    }

    /// Gets the default package, if one is configured.
    ///
    /// Used when a session starts without an explicit package choice.
    pub async fn get_default(&self) -> DbResult<Option<PricingPackage>> {
        let package = sqlx::query_as::<_, PricingPackage>(
            r#"
            SELECT id, name, category, hourly_rate_minor, per_minute_rate_minor,
                   is_default, is_active, created_at, updated_at
            FROM pricing_packages
            WHERE is_default = 1 AND is_active = 1
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(package)
    }

    /// Lists active packages, default first.
    pub async fn list_active(&self) -> DbResult<Vec<PricingPackage>> {
        let packages = sqlx::query_as::<_, PricingPackage>(
            r#"
            SELECT id, name, category, hourly_rate_minor, per_minute_rate_minor,
                   is_default, is_active, created_at, updated_at
            FROM pricing_packages
            WHERE is_active = 1
            ORDER BY is_default DESC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(packages)
    }

    /// Inserts a new package.
    pub async fn insert(&self, package: &PricingPackage) -> DbResult<()> {
        debug!(name = %package.name, "Inserting pricing package");

        sqlx::query(
            r#"
            INSERT INTO pricing_packages (
                id, name, category, hourly_rate_minor, per_minute_rate_minor,
                is_default, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&package.id)
        .bind(&package.name)
        .bind(package.category)
        .bind(package.hourly_rate_minor)
        .bind(package.per_minute_rate_minor)
        .bind(package.is_default)
        .bind(package.is_active)
        .bind(package.created_at)
        .bind(package.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a package's rates and flags. Clearing `is_active` is the
    /// soft delete; sessions that already reference the package keep
    /// billing against its stored rates.
    pub async fn update(&self, package: &PricingPackage) -> DbResult<()> {
        debug!(id = %package.id, "Updating pricing package");

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE pricing_packages SET
                name = ?2,
                category = ?3,
                hourly_rate_minor = ?4,
                per_minute_rate_minor = ?5,
                is_default = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&package.id)
        .bind(&package.name)
        .bind(package.category)
        .bind(package.hourly_rate_minor)
        .bind(package.per_minute_rate_minor)
        .bind(package.is_default)
        .bind(package.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
