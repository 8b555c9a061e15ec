//! # Pricing Resolver
//!
//! Resolves which rate a session bills under. Three sources, descending
//! priority:
//!
//! ```text
//! 1. Session override      session.duration_type, stamped by staff
//! 2. Pricing package       package.category + its configured rate
//! 3. Legacy table columns  per_minute_rate present ⇒ per-minute,
//!                          otherwise hourly
//! ```
//!
//! The resolver always returns both the billing kind AND the numeric
//! rate, because package and table rates can differ even for the same
//! kind. A session with no rate source anywhere resolves to zero cost
//! (`RateSource::Unpriced`) rather than an error; the floor still
//! operates when someone forgot to price a table.

use crate::money::Money;
use crate::types::{BilliardTable, BillingKind, PricingPackage};
use serde::{Deserialize, Serialize};

const MINUTES_PER_HOUR: i64 = 60;

/// Where the resolved numeric rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// A pricing package carried the rate.
    Package,
    /// Legacy per-table rate columns carried it.
    Table,
    /// Per-minute was requested but only an hourly rate exists:
    /// derived as hourly / 60, never silently zero.
    DerivedFromHourly,
    /// No rate source anywhere; rate is zero by rule.
    Unpriced,
}

/// The resolver's answer: what to bill and at which rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRate {
    pub kind: BillingKind,
    pub rate: Money,
    pub source: RateSource,
}

impl ResolvedRate {
    #[inline]
    pub fn is_unpriced(&self) -> bool {
        self.source == RateSource::Unpriced
    }
}

/// Resolves the effective billing kind and rate for a session.
///
/// `duration_type` is the session-level override; `package` is the
/// pricing package the session references, if any; `table` supplies the
/// legacy fallback columns.
pub fn resolve_rate(
    duration_type: Option<BillingKind>,
    package: Option<&PricingPackage>,
    table: &BilliardTable,
) -> ResolvedRate {
    let kind = duration_type
        .or_else(|| package.map(|p| p.category))
        .unwrap_or_else(|| legacy_kind(table));

    match kind {
        BillingKind::Hourly => resolve_hourly(package, table),
        BillingKind::PerMinute => resolve_per_minute(package, table),
    }
}

/// Legacy rule: a per-table per-minute rate flips the default.
fn legacy_kind(table: &BilliardTable) -> BillingKind {
    if table.per_minute_rate_minor.is_some() {
        BillingKind::PerMinute
    } else {
        BillingKind::Hourly
    }
}

fn resolve_hourly(package: Option<&PricingPackage>, table: &BilliardTable) -> ResolvedRate {
    if let Some(rate) = package.and_then(|p| p.hourly_rate()) {
        return priced(BillingKind::Hourly, rate, RateSource::Package);
    }
    if table.hourly_rate().is_positive() {
        return priced(BillingKind::Hourly, table.hourly_rate(), RateSource::Table);
    }
    unpriced(BillingKind::Hourly)
}

fn resolve_per_minute(package: Option<&PricingPackage>, table: &BilliardTable) -> ResolvedRate {
    if let Some(rate) = package.and_then(|p| p.per_minute_rate()) {
        return priced(BillingKind::PerMinute, rate, RateSource::Package);
    }
    if let Some(rate) = table.per_minute_rate() {
        return priced(BillingKind::PerMinute, rate, RateSource::Table);
    }
    // No explicit per-minute rate anywhere: derive from an hourly one
    if let Some(hourly) = package.and_then(|p| p.hourly_rate()).filter(Money::is_positive) {
        return priced(
            BillingKind::PerMinute,
            derive_per_minute(hourly),
            RateSource::DerivedFromHourly,
        );
    }
    if table.hourly_rate().is_positive() {
        return priced(
            BillingKind::PerMinute,
            derive_per_minute(table.hourly_rate()),
            RateSource::DerivedFromHourly,
        );
    }
    unpriced(BillingKind::PerMinute)
}

/// hourly / 60, floor. The lost remainder is documented Money behavior.
fn derive_per_minute(hourly: Money) -> Money {
    Money::from_minor(hourly.minor() / MINUTES_PER_HOUR)
}

fn priced(kind: BillingKind, rate: Money, source: RateSource) -> ResolvedRate {
    ResolvedRate { kind, rate, source }
}

fn unpriced(kind: BillingKind) -> ResolvedRate {
    ResolvedRate {
        kind,
        rate: Money::zero(),
        source: RateSource::Unpriced,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use crate::types::TableStatus;

    fn table(hourly: i64, per_minute: Option<i64>) -> BilliardTable {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        BilliardTable {
            id: "t1".into(),
            name: "Table 01".into(),
            status: TableStatus::Available,
            hourly_rate_minor: hourly,
            per_minute_rate_minor: per_minute,
            pricing_package_id: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn package(category: BillingKind, hourly: Option<i64>, per_minute: Option<i64>) -> PricingPackage {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 20, 0, 0).unwrap();
        PricingPackage {
            id: "p1".into(),
            name: "Regular".into(),
            category,
            hourly_rate_minor: hourly,
            per_minute_rate_minor: per_minute,
            is_default: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_session_override_beats_package_category() {
        let pkg = package(BillingKind::Hourly, Some(50_000), None);
        let tbl = table(40_000, Some(900));

        let resolved = resolve_rate(Some(BillingKind::PerMinute), Some(&pkg), &tbl);
        assert_eq!(resolved.kind, BillingKind::PerMinute);
        // Package has no per-minute rate; the table's explicit one wins
        // over derivation
        assert_eq!(resolved.rate, Money::from_minor(900));
        assert_eq!(resolved.source, RateSource::Table);
    }

    #[test]
    fn test_package_category_beats_legacy() {
        let pkg = package(BillingKind::PerMinute, None, Some(1_000));
        let tbl = table(40_000, None); // legacy says hourly

        let resolved = resolve_rate(None, Some(&pkg), &tbl);
        assert_eq!(resolved.kind, BillingKind::PerMinute);
        assert_eq!(resolved.rate, Money::from_minor(1_000));
        assert_eq!(resolved.source, RateSource::Package);
    }

    #[test]
    fn test_legacy_per_minute_presence_flips_kind() {
        let with_per_minute = table(40_000, Some(800));
        let resolved = resolve_rate(None, None, &with_per_minute);
        assert_eq!(resolved.kind, BillingKind::PerMinute);
        assert_eq!(resolved.rate, Money::from_minor(800));
        assert_eq!(resolved.source, RateSource::Table);

        let hourly_only = table(40_000, None);
        let resolved = resolve_rate(None, None, &hourly_only);
        assert_eq!(resolved.kind, BillingKind::Hourly);
        assert_eq!(resolved.rate, Money::from_minor(40_000));
        assert_eq!(resolved.source, RateSource::Table);
    }

    #[test]
    fn test_per_minute_derived_from_hourly_never_zero() {
        let pkg = package(BillingKind::Hourly, Some(50_000), None);
        let tbl = table(0, None);

        let resolved = resolve_rate(Some(BillingKind::PerMinute), Some(&pkg), &tbl);
        assert_eq!(resolved.kind, BillingKind::PerMinute);
        assert_eq!(resolved.rate, Money::from_minor(833)); // 50_000 / 60
        assert_eq!(resolved.source, RateSource::DerivedFromHourly);
    }

    #[test]
    fn test_no_rate_source_resolves_to_zero_not_error() {
        let tbl = table(0, None);

        let resolved = resolve_rate(None, None, &tbl);
        assert_eq!(resolved.rate, Money::zero());
        assert_eq!(resolved.source, RateSource::Unpriced);
        assert!(resolved.is_unpriced());
    }
}
