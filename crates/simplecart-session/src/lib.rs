//! # simplecart-session: Cart Engine and Persistence for SimpleCart
//!
//! This crate binds the pure cart logic of `simplecart-core` to a host's
//! storage. A host picks an adapter, builds a [`CartConfig`] and opens a
//! [`CartEngine`]; every mutation is persisted before it becomes visible.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SimpleCart Data Flow                             │
//! │                                                                         │
//! │  Host request (add to cart)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                simplecart-session (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  CartEngine   │    │   Adapters    │    │  CartConfig  │  │   │
//! │  │   │  (engine.rs)  │───►│ MemorySession │    │ (config.rs)  │  │   │
//! │  │   │               │    │ CookieJar     │    │  TOML + env  │  │   │
//! │  │   │ add / update  │    │ FileSession   │    │              │  │   │
//! │  │   │ remove / clear│    └───────────────┘    └──────────────┘  │   │
//! │  │   └───────┬───────┘                                            │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   simplecart-core: ItemStore, VariantHash, CartCodec            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `CartEngine` and the `CartSummary` view
//! - [`adapter`] - `PersistenceAdapter` trait and `MemorySession`
//! - [`cookie`] - `CookieJar` adapter
//! - [`file`] - `FileSession` adapter
//! - [`archive`] - `CartArchive` hook for database-backed hosts
//! - [`config`] - `CartConfig` loading and validation
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust
//! use simplecart_session::{CartConfig, CartEngine, MemorySession};
//! use simplecart_core::AttributeSet;
//!
//! let config = CartConfig::from_options([("itemMaxQuantity", "5")]);
//! let mut cart = CartEngine::open(&config, MemorySession::new()).unwrap();
//!
//! let gold: AttributeSet = [("color", "gold"), ("price", "349.00")].into_iter().collect();
//! cart.add("100", 3, gold.clone()).unwrap();
//! cart.add("100", 4, gold).unwrap();
//!
//! assert_eq!(cart.total_quantity(), 5);
//! assert_eq!(cart.attribute_total("price").to_string(), "1745.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod archive;
pub mod config;
pub mod cookie;
pub mod engine;
pub mod error;
pub mod file;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::{MemorySession, PersistenceAdapter};
pub use archive::{CartArchive, MemoryArchive};
pub use config::{CartConfig, PersistenceMode};
pub use cookie::{Cookie, CookieJar};
pub use engine::{CartEngine, CartSummary};
pub use error::{CartError, CartResult, ConfigError, PersistenceError, PersistenceResult};
pub use file::FileSession;

// Re-export core types hosts need alongside the engine
pub use simplecart_core::{AttributeSet, CartIdentity, ItemVariant, StoreLimits, WireFormat};
