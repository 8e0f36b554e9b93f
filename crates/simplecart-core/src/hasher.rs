//! # Variant Hasher
//!
//! Derives the stable identity of an attribute set.
//!
//! ## Canonical Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  {price: "349.00", color: "gold"}     {color: "gold", price: "349.00"} │
//! │                  │                                 │                    │
//! │                  └────────────┬────────────────────┘                    │
//! │                               ▼                                         │
//! │        keys in lexicographic order, each pair length-prefixed:         │
//! │        "5:color=4:gold;5:price=6:349.00;"                              │
//! │                               │                                         │
//! │                               ▼                                         │
//! │        SHA-256 → first 16 bytes → 32 lowercase hex chars               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Length prefixes keep `{a: "b;c"}` and `{a: "b", c: ...}` from ever sharing
//! a canonical form. The empty set canonicalizes to `""` and hashes to the
//! "no variant" hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::attributes::AttributeSet;

/// Number of digest bytes kept in a [`VariantHash`].
const HASH_BYTES: usize = 16;

/// Fixed-length identity of an attribute set (32 hex chars).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantHash(String);

impl VariantHash {
    /// The hash of the empty attribute set.
    pub fn no_variant() -> Self {
        variant_hash(&AttributeSet::new())
    }

    /// Returns the hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Serializes `attributes` into its canonical, order-independent form.
pub fn canonical_form(attributes: &AttributeSet) -> String {
    let mut canonical = String::new();
    for (key, value) in attributes.iter() {
        canonical.push_str(&format!("{}:{}={}:{};", key.len(), key, value.len(), value));
    }
    canonical
}

/// Computes the variant hash of `attributes`.
///
/// Pure and infallible. Two sets with the same key/value pairs always hash
/// identically, whatever order they were built in.
///
/// ## Example
/// ```rust
/// use simplecart_core::{variant_hash, AttributeSet};
///
/// let a: AttributeSet = [("color", "gold"), ("size", "M")].into_iter().collect();
/// let b: AttributeSet = [("size", "M"), ("color", "gold")].into_iter().collect();
/// assert_eq!(variant_hash(&a), variant_hash(&b));
/// assert_eq!(variant_hash(&a).as_str().len(), 32);
/// ```
pub fn variant_hash(attributes: &AttributeSet) -> VariantHash {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(attributes).as_bytes());
    let digest = hasher.finalize();
    VariantHash(hex::encode(&digest[..HASH_BYTES]))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeSet {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_order_independent() {
        let a = attrs(&[("color", "gold"), ("price", "349.00")]);
        let b = attrs(&[("price", "349.00"), ("color", "gold")]);
        assert_eq!(variant_hash(&a), variant_hash(&b));
    }

    #[test]
    fn test_empty_values_do_not_create_variants() {
        let plain = attrs(&[("color", "gold")]);
        let with_blank = attrs(&[("color", "gold"), ("size", "")]);
        assert_eq!(variant_hash(&plain), variant_hash(&with_blank));
    }

    #[test]
    fn test_different_sets_differ() {
        let gold = attrs(&[("color", "gold")]);
        let silver = attrs(&[("color", "silver")]);
        assert_ne!(variant_hash(&gold), variant_hash(&silver));
        assert_ne!(variant_hash(&gold), VariantHash::no_variant());
    }

    #[test]
    fn test_canonical_form_is_unambiguous() {
        let joined = attrs(&[("a", "b;1:c=1:d")]);
        let split = attrs(&[("a", "b"), ("c", "d")]);
        assert_ne!(canonical_form(&joined), canonical_form(&split));
        assert_ne!(variant_hash(&joined), variant_hash(&split));
    }

    #[test]
    fn test_no_variant_is_stable() {
        assert_eq!(canonical_form(&AttributeSet::new()), "");
        assert_eq!(VariantHash::no_variant(), variant_hash(&AttributeSet::new()));
        assert_eq!(VariantHash::no_variant().as_str().len(), 32);
        assert!(VariantHash::no_variant()
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
