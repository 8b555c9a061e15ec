//! # Validation Module
//!
//! Input validation utilities for Baize POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service entry (baize-hall)                                   │
//! │  ├── THIS MODULE: field checks, always before any mutation             │
//! │  └── Business-state checks (table available, payment pending)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FK constraints                                │
//! │  └── CAS guards on status columns                                      │
//! │                                                                         │
//! │  Defense in depth: the same rule rejected twice is cheaper than a      │
//! │  corrupted bill                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use baize_core::validation::{validate_customer_name, validate_quantity};
//!
//! validate_customer_name("Budi Santoso").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MAX_PLANNED_DURATION_MINUTES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty (session start requires it)
/// - Must be at most 120 characters
///
/// ## Example
/// ```rust
/// use baize_core::validation::validate_customer_name;
///
/// assert!(validate_customer_name("Budi Santoso").is_ok());
/// assert!(validate_customer_name("").is_err());
/// ```
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer_name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "customer_name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a staff id. Staff ids come from the identity directory and
/// are carried opaquely; only presence and size are checked here.
pub fn validate_staff_id(staff_id: &str) -> ValidationResult<()> {
    let staff_id = staff_id.trim();

    if staff_id.is_empty() {
        return Err(ValidationError::Required {
            field: "staff_id".to_string(),
        });
    }

    if staff_id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "staff_id".to_string(),
            max: 64,
        });
    }

    Ok(())
}

/// Validates a display name (table, package, or menu item).
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a SKU (menu-item business identifier).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use baize_core::validation::validate_sku;
///
/// assert!(validate_sku("ES-TEH").is_ok());
/// assert!(validate_sku("").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates free-text notes. Empty is fine.
pub fn validate_notes(notes: &str) -> ValidationResult<()> {
    if notes.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price or rate in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (unpriced tables resolve to zero cost by rule)
///
/// ## Example
/// ```rust
/// use baize_core::validation::validate_price_minor;
///
/// assert!(validate_price_minor(50_000).is_ok());
/// assert!(validate_price_minor(0).is_ok());
/// assert!(validate_price_minor(-100).is_err());
/// ```
pub fn validate_price_minor(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a planned session duration in minutes.
///
/// ## Rules
/// - 0 means open-ended and is allowed
/// - Positive values are capped at MAX_PLANNED_DURATION_MINUTES
pub fn validate_planned_duration(minutes: i64) -> ValidationResult<()> {
    if !(0..=MAX_PLANNED_DURATION_MINUTES).contains(&minutes) {
        return Err(ValidationError::OutOfRange {
            field: "planned_duration".to_string(),
            min: 0,
            max: MAX_PLANNED_DURATION_MINUTES,
        });
    }

    Ok(())
}

/// Validates a manual duration override in minutes.
///
/// ## Rules
/// - Must be positive; an override of zero would bill nothing while
///   hiding the wall clock, which staff never intend
pub fn validate_duration_override(minutes: i64) -> ValidationResult<()> {
    if minutes <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "actual_duration".to_string(),
        });
    }

    if minutes > MAX_PLANNED_DURATION_MINUTES {
        return Err(ValidationError::OutOfRange {
            field: "actual_duration".to_string(),
            min: 1,
            max: MAX_PLANNED_DURATION_MINUTES,
        });
    }

    Ok(())
}

/// Validates a tax percentage.
///
/// ## Rules
/// - Must be between 0 and 100
pub fn validate_tax_percentage(pct: f64) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "tax_percentage".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates an order's item list: at least one line, bounded above.
pub fn validate_order_items_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if count > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use baize_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_customer_name() {
        assert!(validate_customer_name("Budi Santoso").is_ok());
        assert!(validate_customer_name("").is_err());
        assert!(validate_customer_name("   ").is_err());
        assert!(validate_customer_name(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_staff_id() {
        assert!(validate_staff_id("staff-7").is_ok());
        assert!(validate_staff_id("").is_err());
        assert!(validate_staff_id(&"x".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("ES-TEH").is_ok());
        assert!(validate_sku("indomie_goreng").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_minor() {
        assert!(validate_price_minor(0).is_ok());
        assert!(validate_price_minor(50_000).is_ok());
        assert!(validate_price_minor(-100).is_err());
    }

    #[test]
    fn test_validate_planned_duration() {
        assert!(validate_planned_duration(0).is_ok()); // open-ended
        assert!(validate_planned_duration(60).is_ok());
        assert!(validate_planned_duration(-1).is_err());
        assert!(validate_planned_duration(MAX_PLANNED_DURATION_MINUTES + 1).is_err());
    }

    #[test]
    fn test_validate_duration_override() {
        assert!(validate_duration_override(90).is_ok());
        assert!(validate_duration_override(0).is_err());
        assert!(validate_duration_override(-5).is_err());
    }

    #[test]
    fn test_validate_tax_percentage() {
        assert!(validate_tax_percentage(0.0).is_ok());
        assert!(validate_tax_percentage(11.0).is_ok());
        assert!(validate_tax_percentage(100.0).is_ok());
        assert!(validate_tax_percentage(-0.5).is_err());
        assert!(validate_tax_percentage(101.0).is_err());
    }

    #[test]
    fn test_validate_order_items_count() {
        assert!(validate_order_items_count(1).is_ok());
        assert!(validate_order_items_count(0).is_err());
        assert!(validate_order_items_count(MAX_ORDER_ITEMS + 1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
