//! # Billing Calculator
//!
//! Pure functions converting elapsed wall-clock time + a rate into a
//! billable quantity and a monetary cost. Time is always an argument,
//! never read from a clock, so every charge is reproducible in a test.
//!
//! ## The Two Rounding Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HOURLY                          PER-MINUTE                             │
//! │                                                                         │
//! │  Any started hour bills whole:   Whole minutes bill as counted;         │
//! │    3600s → 1 hour                leftover seconds round up only         │
//! │    3601s → 2 hours               past 30 (strictly greater):            │
//! │       1s → 1 hour                  90s → 1 minute (30s left over)       │
//! │                                    91s → 2 minutes (31s left over)      │
//! │                                                                         │
//! │  The asymmetry is a product rule, not an accident. Do not unify.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::BillingKind;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Leftover seconds beyond the last whole minute must exceed this
/// (strictly) before the minute count rounds up.
pub const MINUTE_ROUND_UP_THRESHOLD: i64 = 30;

/// Whole hours billed for an elapsed duration: any remainder, down to a
/// single second, rounds up to a full hour. Negative input (clock skew)
/// clamps to zero.
///
/// ```rust
/// use baize_core::billing::billable_hours;
///
/// assert_eq!(billable_hours(3600), 1);
/// assert_eq!(billable_hours(3601), 2);
/// assert_eq!(billable_hours(0), 0);
/// ```
pub fn billable_hours(elapsed_seconds: i64) -> i64 {
    let secs = elapsed_seconds.max(0);
    (secs + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR
}

/// Whole minutes billed for an elapsed duration: floor of the minute
/// count, plus one when the leftover seconds exceed the threshold.
/// Negative input clamps to zero.
///
/// ```rust
/// use baize_core::billing::billable_minutes;
///
/// assert_eq!(billable_minutes(90), 1); // 30s left over: not rounded
/// assert_eq!(billable_minutes(91), 2); // 31s left over: rounded up
/// ```
pub fn billable_minutes(elapsed_seconds: i64) -> i64 {
    let secs = elapsed_seconds.max(0);
    let whole = secs / SECONDS_PER_MINUTE;
    let leftover = secs % SECONDS_PER_MINUTE;
    if leftover > MINUTE_ROUND_UP_THRESHOLD {
        whole + 1
    } else {
        whole
    }
}

/// Cost of an elapsed duration billed hourly.
pub fn hourly_cost(elapsed_seconds: i64, hourly_rate: Money) -> Money {
    hourly_rate.multiply_quantity(billable_hours(elapsed_seconds))
}

/// Cost of an elapsed duration billed per minute.
pub fn per_minute_cost(elapsed_seconds: i64, per_minute_rate: Money) -> Money {
    per_minute_rate.multiply_quantity(billable_minutes(elapsed_seconds))
}

/// Cost of an elapsed duration under either billing kind. `rate` must be
/// the rate for that kind (the resolver guarantees the pairing).
pub fn time_cost(elapsed_seconds: i64, kind: BillingKind, rate: Money) -> Money {
    match kind {
        BillingKind::Hourly => hourly_cost(elapsed_seconds, rate),
        BillingKind::PerMinute => per_minute_cost(elapsed_seconds, rate),
    }
}

/// The billable unit count for either kind, for receipts and breakdowns.
pub fn billable_units(elapsed_seconds: i64, kind: BillingKind) -> i64 {
    match kind {
        BillingKind::Hourly => billable_hours(elapsed_seconds),
        BillingKind::PerMinute => billable_minutes(elapsed_seconds),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
