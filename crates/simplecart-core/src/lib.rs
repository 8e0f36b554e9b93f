//! # simplecart-core: Pure Cart Logic for SimpleCart
//!
//! This crate is the **heart** of SimpleCart. It holds the cart state, the
//! rules that govern it, and the wire formats it is persisted in, as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SimpleCart Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Host (web handler, CLI, test harness)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartConfig + PersistenceAdapter        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          simplecart-session (CartEngine, adapters)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ simplecart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ attributes │  │  hasher   │  │   store   │  │   codec   │  │   │
//! │  │   │AttributeSet│  │VariantHash│  │ ItemStore │  │ Delimited │  │   │
//! │  │   │            │  │           │  │ItemVariant│  │Structured │  │   │
//! │  │   └────────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO SESSION • NO COOKIES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`attributes`] - `AttributeSet`, the variant-qualifying key/value map
//! - [`hasher`] - `VariantHash`, the deterministic identity of an attribute set
//! - [`store`] - `ItemStore` and `ItemVariant`, with limit enforcement
//! - [`codec`] - The two wire formats behind the `CartCodec` trait
//! - [`amount`] - Fixed-point decimal used for attribute totals
//! - [`identity`] - `CartIdentity`, the key a cart is persisted under
//! - [`validation`] - Permissive input coercion and strict checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use simplecart_core::{AttributeSet, ItemStore, StoreLimits};
//!
//! let limits = StoreLimits::new(0, 5);
//! let gold: AttributeSet = [("color", "gold"), ("price", "349.00")].into_iter().collect();
//!
//! let mut store = ItemStore::new();
//! store.add("100", 3, gold.clone(), &limits).unwrap();
//! store.add("100", 4, gold, &limits).unwrap();
//!
//! assert_eq!(store.total_quantity(), 5); // clamped
//! assert_eq!(store.attribute_sum("price").to_string(), "1745.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod amount;
pub mod attributes;
pub mod codec;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod store;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use amount::Amount;
pub use attributes::AttributeSet;
pub use codec::{CartCodec, DecodeSkip, Decoded, Payload, SkipReason, WireFormat};
pub use error::{CodecError, CoreError, CoreResult, ValidationError};
pub use hasher::{variant_hash, VariantHash};
pub use identity::CartIdentity;
pub use store::{ItemStore, ItemVariant, StoreLimits};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Seed used for the cart identity when the host supplies none.
pub const DEFAULT_IDENTITY_SEED: &str = "SimpleCart";

/// Suffix appended to the slot name holding delimited-format attributes.
pub const ATTRIBUTES_SLOT_SUFFIX: &str = "_attributes";
