//! # Cart Identity
//!
//! The key a cart's state is persisted under.
//!
//! ## Resolution Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Explicit session id   "shop.example.com"  →  "shop_example_com"     │
//! │  2. Host seed             "shop.example.com"  →  "<32 hex>_cart"        │
//! │  3. Default seed          "SimpleCart"        →  "<32 hex>_cart"        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::ValidationError;
use crate::{ATTRIBUTES_SLOT_SUFFIX, DEFAULT_IDENTITY_SEED};

/// Opaque, stable identifier of one cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartIdentity(String);

impl CartIdentity {
    /// Derives an identity from a host seed (typically the request host).
    ///
    /// Blank or missing seeds fall back to [`DEFAULT_IDENTITY_SEED`].
    pub fn from_seed(seed: Option<&str>) -> Self {
        let seed = seed
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_IDENTITY_SEED);

        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let digest = hasher.finalize();
        CartIdentity(format!("{}_cart", hex::encode(&digest[..16])))
    }

    /// Uses a caller-chosen session id verbatim (dots become underscores).
    ///
    /// ## Rules
    /// - Must not be empty
    /// - Only letters, digits, `_`, `-` and `.` are accepted
    pub fn from_session_id(session_id: &str) -> Result<Self, ValidationError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(ValidationError::Required {
                field: "session id".to_string(),
            });
        }

        if !session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(ValidationError::InvalidFormat {
                field: "session id".to_string(),
                reason: "must contain only letters, digits, '_', '-' and '.'".to_string(),
            });
        }

        Ok(CartIdentity(session_id.replace('.', "_")))
    }

    /// Applies the resolution order: explicit session id, then seed.
    pub fn resolve(
        session_id: Option<&str>,
        seed: Option<&str>,
    ) -> Result<Self, ValidationError> {
        match session_id {
            Some(id) => Self::from_session_id(id),
            None => Ok(Self::from_seed(seed)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slot holding the item payload.
    pub fn slot(&self) -> &str {
        &self.0
    }

    /// Slot holding the delimited-format attribute records.
    pub fn attributes_slot(&self) -> String {
        format!("{}{}", self.0, ATTRIBUTES_SLOT_SUFFIX)
    }
}

impl Default for CartIdentity {
    fn default() -> Self {
        CartIdentity::from_seed(None)
    }
}

impl fmt::Display for CartIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
