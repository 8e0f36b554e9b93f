//! # Error Types
//!
//! Domain-specific error types for simplecart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  simplecart-core errors (this file)                                    │
//! │  ├── CoreError        - Cart rule violations (limits, missing items)   │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── CodecError       - Encoding failures                              │
//! │                                                                         │
//! │  Not an error: DecodeSkip (codec module)                               │
//! │  └── A malformed persisted record, dropped and reported, never raised  │
//! │                                                                         │
//! │  simplecart-session errors (separate crate)                            │
//! │  └── CartError        - What the host sees (wraps all of the above)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::hasher::VariantHash;

// =============================================================================
// Core Error
// =============================================================================

/// Cart rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Adding a new item id would exceed the distinct-item limit.
    ///
    /// ## When This Occurs
    /// - `cart_max_item` is non-zero
    /// - The store already holds that many distinct item ids
    /// - The item being added is not one of them
    ///
    /// Increasing the quantity of an item already in the cart never
    /// triggers this error.
    #[error("Cart cannot hold more than {max} distinct items")]
    LimitExceeded { max: u32 },

    /// No item with this id is in the cart.
    #[error("Item not in cart: {item_id}")]
    ItemNotFound { item_id: String },

    /// The item is in the cart, but not with these attributes.
    #[error("Item {item_id} has no variant {hash}")]
    VariantNotFound { item_id: String, hash: VariantHash },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an ItemNotFound error.
    pub fn item_not_found(item_id: impl Into<String>) -> Self {
        CoreError::ItemNotFound {
            item_id: item_id.into(),
        }
    }

    /// Returns true for the "not found" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ItemNotFound { .. } | CoreError::VariantNotFound { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Most malformed input is coerced rather than rejected (see
/// [`crate::validation`]); these are the cases that are rejected outright.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a delimiter inside a delimited-format field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Codec Error
// =============================================================================

/// Failures while turning an [`ItemStore`](crate::ItemStore) into a payload.
///
/// Decoding never fails; see [`DecodeSkip`](crate::DecodeSkip).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The structured document could not be produced.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with CodecError.
pub type CodecResult<T> = Result<T, CodecError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LimitExceeded { max: 3 };
        assert_eq!(err.to_string(), "Cart cannot hold more than 3 distinct items");

        let err = CoreError::item_not_found("100");
        assert_eq!(err.to_string(), "Item not in cart: 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "item id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: item id is required");
    }

    #[test]
    fn test_is_not_found() {
        assert!(CoreError::item_not_found("1").is_not_found());
        assert!(!CoreError::LimitExceeded { max: 1 }.is_not_found());
    }
}
