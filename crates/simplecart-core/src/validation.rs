//! # Validation Module
//!
//! Input validation utilities for SimpleCart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Coerce vs. Reject                                  │
//! │                                                                         │
//! │  COERCE (permissive, never an error)                                   │
//! │  ├── quantity "abc" / "-2" / "1.5"  → 1                                │
//! │  └── limit    "abc" / "-2"          → ignored, default kept            │
//! │                                                                         │
//! │  REJECT (ValidationError)                                              │
//! │  ├── empty item id                                                     │
//! │  ├── zero quantity reaching ItemStore::add                             │
//! │  └── ',' or ';' in a field bound for the delimited wire format         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use simplecart_core::validation::{coerce_quantity, parse_count};
//!
//! assert_eq!(coerce_quantity("3"), 3);
//! assert_eq!(coerce_quantity("three"), 1);
//! assert_eq!(parse_count("10"), Some(10));
//! assert_eq!(parse_count("-1"), None);
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Quantity used when the caller's input is not a non-negative integer.
pub const DEFAULT_QUANTITY: u32 = 1;

// =============================================================================
// Numeric Coercion
// =============================================================================

/// Parses a string of ASCII digits only (`^\d+$`).
///
/// Values past `u32::MAX` saturate; they are clamped by the item limit later.
pub fn parse_count(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(raw.parse::<u32>().unwrap_or(u32::MAX))
}

/// Coerces a raw quantity input, falling back to [`DEFAULT_QUANTITY`].
///
/// `"0"` is a conforming value and is returned as 0; callers decide what
/// zero means (`update` removes, `add` bumps it to the default).
pub fn coerce_quantity(raw: &str) -> u32 {
    parse_count(raw.trim()).unwrap_or(DEFAULT_QUANTITY)
}

// =============================================================================
// Strict Checks
// =============================================================================

/// Validates an item id.
///
/// ## Rules
/// - Must not be empty or whitespace only
pub fn validate_item_id(item_id: &str) -> ValidationResult<()> {
    if item_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item id".to_string(),
        });
    }

    Ok(())
}

/// Validates a quantity that must already be positive.
pub fn validate_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a field that will be written into the delimited wire format.
///
/// ## Rules
/// - Must not contain the record separator `;`
/// - Must not contain the field separator `,`
pub fn validate_delimited_field(field: &str, value: &str) -> ValidationResult<()> {
    if value.contains(|c| c == ',' || c == ';') {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' contains ',' or ';'", value),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
