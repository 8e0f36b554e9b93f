//! # Session Error Types
//!
//! Errors raised while loading, mutating and persisting a cart.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CartError                                      │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Core           │  │  Persistence    │  │  Config                 │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  LimitExceeded  │  │  Io             │  │  Io                     │ │
//! │  │  ItemNotFound   │  │  InvalidSlot    │  │  Parse                  │ │
//! │  │  VariantNotFound│  │  CookieTooLarge │  │  Serialize              │ │
//! │  │  Validation     │  │  Unavailable    │  │  Invalid                │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │  Codec          │  Persistence failures abort the operation; the    │
//! │  │  Serialize      │  in-memory cart is left as it was.                │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use simplecart_core::{CodecError, CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for adapter operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for engine operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Persistence Errors
// =============================================================================

/// Failure of the host storage behind a [`crate::PersistenceAdapter`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem error.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Slot name the backend cannot represent.
    #[error("Invalid slot name '{slot}': {reason}")]
    InvalidSlot { slot: String, reason: String },

    /// Encoded cookie exceeds the browser limit.
    #[error("Cookie '{name}' is {size} bytes, limit is {limit}")]
    CookieTooLarge {
        name: String,
        size: usize,
        limit: usize,
    },

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Failure to load, save or validate a [`crate::CartConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid cart configuration: {0}")]
    Invalid(String),
}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

// =============================================================================
// Cart Errors
// =============================================================================

/// Error returned by [`crate::CartEngine`] operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to encode cart: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to persist cart: {0}")]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<ValidationError> for CartError {
    fn from(err: ValidationError) -> Self {
        CartError::Core(CoreError::Validation(err))
    }
}

impl CartError {
    /// Returns true if this error means the item or variant was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CartError::Core(err) if err.is_not_found())
    }

    /// Returns true if the host storage failed.
    pub fn is_persistence(&self) -> bool {
        matches!(self, CartError::Persistence(_))
    }
}
