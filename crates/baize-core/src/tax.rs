//! # Tax Engine
//!
//! Applies a configurable percentage selectively to table-time revenue
//! and/or F&B revenue.
//!
//! ## The Independence Rule
//! Table and F&B amounts are taxed SEPARATELY, never as a lump sum. The
//! configuration can enable tax on one category and not the other, so
//! `combined tax == table_tax + fnb_tax` by construction, and is never a
//! single percentage over `table_amount + fnb_amount`.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TaxRate;

/// Which revenue stream an amount belongs to, for tax purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueCategory {
    /// Table rental time.
    TableTime,
    /// Food & beverage.
    Fnb,
}

/// The tax configuration the hall runs under. Sourced from the config
/// layer; this type only evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxConfig {
    pub enabled: bool,
    pub rate: TaxRate,
    /// Display name on receipts ("PPN").
    pub name: String,
    pub apply_to_tables: bool,
    pub apply_to_fnb: bool,
}

impl TaxConfig {
    /// A configuration that never taxes anything.
    pub fn disabled() -> Self {
        TaxConfig {
            enabled: false,
            rate: TaxRate::zero(),
            name: "PPN".to_string(),
            apply_to_tables: false,
            apply_to_fnb: false,
        }
    }

    /// Whether tax applies to the given revenue category at all.
    pub fn applies_to(&self, category: RevenueCategory) -> bool {
        if !self.enabled {
            return false;
        }
        match category {
            RevenueCategory::TableTime => self.apply_to_tables,
            RevenueCategory::Fnb => self.apply_to_fnb,
        }
    }

    /// Tax on one amount in one category: the configured percentage when
    /// enabled and applicable, zero otherwise.
    pub fn tax_on(&self, amount: Money, category: RevenueCategory) -> Money {
        if !self.applies_to(category) {
            return Money::zero();
        }
        amount.calculate_tax(self.rate)
    }

    /// Tax on table-time revenue.
    #[inline]
    pub fn table_tax(&self, amount: Money) -> Money {
        self.tax_on(amount, RevenueCategory::TableTime)
    }

    /// Tax on F&B revenue.
    #[inline]
    pub fn fnb_tax(&self, amount: Money) -> Money {
        self.tax_on(amount, RevenueCategory::Fnb)
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig::disabled()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
