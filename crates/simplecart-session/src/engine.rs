//! # Cart Engine
//!
//! The public cart API: one cart identity, its limits, a wire format and an
//! injected storage adapter.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      CartEngine::mutate                                 │
//! │                                                                         │
//! │  add / update / remove / clear                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  clone store ──► apply change ──► encode ──► adapter.write_raw()       │
//! │                       │              │              │                   │
//! │                       ▼              ▼              ▼                   │
//! │                   CoreError      CodecError   PersistenceError          │
//! │                                                                         │
//! │  Any error: the working copy is dropped and the cart is unchanged.     │
//! │  Success:   the working copy becomes the cart.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! One engine serves one request. Two requests on the same identity each
//! load, mutate and write back; the last write wins.

use serde::Serialize;
use tracing::{debug, info, warn};

use simplecart_core::validation::{coerce_quantity, validate_item_id, DEFAULT_QUANTITY};
use simplecart_core::{
    Amount, AttributeSet, CartCodec, CartIdentity, CoreResult, Decoded, ItemStore, ItemVariant,
    StoreLimits, VariantHash, WireFormat,
};

use crate::adapter::PersistenceAdapter;
use crate::archive::CartArchive;
use crate::config::CartConfig;
use crate::error::CartResult;

// =============================================================================
// Summary View
// =============================================================================

/// Serializable snapshot of a cart, for templates and JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart_id: String,
    pub items: Vec<ItemVariant>,
    pub distinct_items: usize,
    pub total_item: usize,
    pub total_quantity: u64,
    pub is_empty: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// A loaded cart bound to its storage.
#[derive(Debug)]
pub struct CartEngine<A: PersistenceAdapter> {
    identity: CartIdentity,
    limits: StoreLimits,
    codec: Box<dyn CartCodec>,
    adapter: A,
    store: ItemStore,
}

impl<A: PersistenceAdapter> CartEngine<A> {
    /// Opens the cart described by `config`, loading it from `adapter`.
    pub fn open(config: &CartConfig, adapter: A) -> CartResult<Self> {
        let identity = config.identity()?;
        Self::open_with(identity, config.limits(), config.format(), adapter)
    }

    /// Opens a cart from explicit parts.
    ///
    /// Unreadable persisted records are dropped with a warning; only a
    /// storage failure makes this return an error.
    pub fn open_with(
        identity: CartIdentity,
        limits: StoreLimits,
        format: WireFormat,
        adapter: A,
    ) -> CartResult<Self> {
        let codec = format.codec();

        let items = adapter.read_raw(identity.slot())?;
        let attributes = adapter.read_raw(&identity.attributes_slot())?;
        let Decoded { store, skipped } = codec.decode(items.as_deref(), attributes.as_deref());

        for skip in &skipped {
            warn!(
                cart_id = %identity,
                segment = %skip.segment,
                reason = %skip.reason,
                "Dropped unreadable cart record"
            );
        }

        info!(
            cart_id = %identity,
            format = %format,
            items = store.total_item_count(),
            dropped = skipped.len(),
            "Cart opened"
        );

        Ok(CartEngine {
            identity,
            limits,
            codec,
            adapter,
            store,
        })
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Applies `op` to a working copy, persists it, then commits it.
    fn mutate<T, F>(&mut self, op: F) -> CartResult<T>
    where
        F: FnOnce(&mut ItemStore, &StoreLimits) -> CoreResult<T>,
    {
        let mut working = self.store.clone();
        let outcome = op(&mut working, &self.limits)?;
        self.persist(&working)?;
        self.store = working;
        Ok(outcome)
    }

    fn persist(&mut self, store: &ItemStore) -> CartResult<()> {
        let payload = self.codec.encode(store)?;
        let attributes_slot = self.identity.attributes_slot();

        let mut writes = vec![(self.identity.slot(), payload.items.as_str())];
        if let Some(attributes) = payload.attributes.as_deref() {
            writes.push((attributes_slot.as_str(), attributes));
        }
        self.adapter.write_many(&writes)?;
        Ok(())
    }

    fn check_input(&self, item_id: &str, attributes: &AttributeSet) -> CartResult<()> {
        validate_item_id(item_id)?;
        self.codec.check_encodable(item_id, attributes)?;
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of a variant. A quantity of 0 counts as 1.
    ///
    /// ## Returns
    /// The resulting quantity of the variant, after clamping.
    ///
    /// ## Errors
    /// - `LimitExceeded` when the item is new and the cart is full
    /// - `Validation` for an empty id, or a value the wire format cannot hold
    /// - `Persistence` when the adapter fails (cart unchanged)
    pub fn add(&mut self, item_id: &str, quantity: u32, attributes: AttributeSet) -> CartResult<u32> {
        self.check_input(item_id, &attributes)?;

        let quantity = if quantity == 0 { DEFAULT_QUANTITY } else { quantity };
        let resulting = self.mutate(|store, limits| store.add(item_id, quantity, attributes, limits))?;

        debug!(cart_id = %self.identity, item_id, quantity, resulting, "Item added");
        Ok(resulting)
    }

    /// [`CartEngine::add`] with the quantity as submitted by a form.
    ///
    /// Anything that is not a plain non-negative integer becomes 1.
    pub fn add_input(&mut self, item_id: &str, raw_quantity: &str, attributes: AttributeSet) -> CartResult<u32> {
        self.add(item_id, coerce_quantity(raw_quantity), attributes)
    }

    /// Sets the quantity of an existing variant. 0 removes it.
    pub fn update(&mut self, item_id: &str, quantity: u32, attributes: &AttributeSet) -> CartResult<u32> {
        self.check_input(item_id, attributes)?;

        let resulting = self.mutate(|store, limits| store.update(item_id, quantity, attributes, limits))?;

        debug!(cart_id = %self.identity, item_id, quantity, resulting, "Item updated");
        Ok(resulting)
    }

    /// [`CartEngine::update`] with the quantity as submitted by a form.
    pub fn update_input(&mut self, item_id: &str, raw_quantity: &str, attributes: &AttributeSet) -> CartResult<u32> {
        self.update(item_id, coerce_quantity(raw_quantity), attributes)
    }

    /// Removes every variant of `item_id`.
    pub fn remove(&mut self, item_id: &str) -> CartResult<usize> {
        let removed = self.mutate(|store, _| store.remove(item_id, None))?;
        debug!(cart_id = %self.identity, item_id, removed, "Item removed");
        Ok(removed)
    }

    /// Removes one variant of `item_id`. An empty set removes every variant.
    pub fn remove_variant(&mut self, item_id: &str, attributes: &AttributeSet) -> CartResult<usize> {
        let removed = self.mutate(|store, _| store.remove(item_id, Some(attributes)))?;
        debug!(cart_id = %self.identity, item_id, removed, "Variant removed");
        Ok(removed)
    }

    /// Empties the cart, leaving an empty cart persisted.
    pub fn clear(&mut self) -> CartResult<()> {
        self.mutate(|store, _| {
            store.clear();
            Ok(())
        })?;
        debug!(cart_id = %self.identity, "Cart cleared");
        Ok(())
    }

    /// Empties the cart and deletes every persisted slot of this identity.
    pub fn destroy(&mut self) -> CartResult<()> {
        self.adapter.delete_raw(self.identity.slot())?;
        self.adapter.delete_raw(&self.identity.attributes_slot())?;
        self.store.clear();
        info!(cart_id = %self.identity, "Cart destroyed");
        Ok(())
    }

    // =========================================================================
    // Archive
    // =========================================================================

    /// Saves the current cart into `archive`.
    pub fn archive_to<R: CartArchive + ?Sized>(&self, archive: &mut R) -> CartResult<()> {
        archive.save_cart(&self.identity, &self.store)?;
        debug!(cart_id = %self.identity, items = self.store.total_item_count(), "Cart archived");
        Ok(())
    }

    /// Replaces the cart with its archived copy, if there is one.
    ///
    /// ## Returns
    /// `true` if an archived cart was found and persisted.
    pub fn restore_from<R: CartArchive + ?Sized>(&mut self, archive: &R) -> CartResult<bool> {
        let Some(archived) = archive.load_cart(&self.identity)? else {
            debug!(cart_id = %self.identity, "No archived cart");
            return Ok(false);
        };

        self.persist(&archived)?;
        self.store = archived;
        info!(cart_id = %self.identity, items = self.store.total_item_count(), "Cart restored from archive");
        Ok(true)
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn identity(&self) -> &CartIdentity {
        &self.identity
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    pub fn format(&self) -> WireFormat {
        self.codec.format()
    }

    /// The in-memory cart.
    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Iterates `(item id, variants)` in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &[ItemVariant])> {
        self.store.items()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of variant records.
    pub fn total_item(&self) -> usize {
        self.store.total_item_count()
    }

    pub fn total_quantity(&self) -> u64 {
        self.store.total_quantity()
    }

    /// Σ quantity × `attributes[key]`, e.g. the cart price with `"price"`.
    pub fn attribute_total(&self, key: &str) -> Amount {
        self.store.attribute_sum(key)
    }

    pub fn is_item_exists(&self, item_id: &str, attributes: &AttributeSet) -> bool {
        self.store.is_item_exists(item_id, attributes)
    }

    pub fn get_item(&self, item_id: &str, hash: Option<&VariantHash>) -> Option<&ItemVariant> {
        self.store.get_item(item_id, hash)
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            cart_id: self.identity.to_string(),
            items: self.store.variants().cloned().collect(),
            distinct_items: self.store.distinct_items(),
            total_item: self.store.total_item_count(),
            total_quantity: self.store.total_quantity(),
            is_empty: self.store.is_empty(),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Releases the adapter, e.g. to read the pending `Set-Cookie` headers.
    pub fn into_adapter(self) -> A {
        self.adapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemorySession;
    use crate::error::{CartError, PersistenceError, PersistenceResult};
    use simplecart_core::CoreError;

    fn attrs(pairs: &[(&str, &str)]) -> AttributeSet {
        pairs.iter().copied().collect()
    }

    fn engine(limits: StoreLimits, format: WireFormat) -> CartEngine<MemorySession> {
        CartEngine::open_with(CartIdentity::from_seed(Some("test")), limits, format, MemorySession::new())
            .unwrap()
    }

    /// Accepts reads, refuses writes once armed.
    #[derive(Debug, Default)]
    struct FlakySession {
        inner: MemorySession,
        fail_writes: bool,
    }

    impl PersistenceAdapter for FlakySession {
        fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>> {
            self.inner.read_raw(slot)
        }

        fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()> {
            if self.fail_writes {
                return Err(PersistenceError::Unavailable("session store offline".into()));
            }
            self.inner.write_raw(slot, payload)
        }

        fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()> {
            if self.fail_writes {
                return Err(PersistenceError::Unavailable("session store offline".into()));
            }
            self.inner.delete_raw(slot)
        }
    }

    #[test]
    fn test_add_zero_counts_as_one() {
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Structured);
        assert_eq!(cart.add("100", 0, AttributeSet::new()).unwrap(), 1);
        assert_eq!(cart.add_input("100", "two", AttributeSet::new()).unwrap(), 2);
        assert_eq!(cart.add_input("100", " 3 ", AttributeSet::new()).unwrap(), 5);
    }

    #[test]
    fn test_update_input_coerces_quantity() {
        let gold = attrs(&[("color", "gold")]);
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Structured);
        cart.add("100", 4, gold.clone()).unwrap();
        cart.add("100", 2, AttributeSet::new()).unwrap();

        assert_eq!(cart.update_input("100", "abc", &gold).unwrap(), 1);
        assert_eq!(cart.update_input("100", " 3 ", &gold).unwrap(), 3);

        assert_eq!(cart.update_input("100", "0", &gold).unwrap(), 0);
        assert!(!cart.is_item_exists("100", &gold));
        assert_eq!(cart.total_item(), 1);
    }

    #[test]
    fn test_rejects_empty_id_before_mutation() {
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Structured);
        let err = cart.add("  ", 1, AttributeSet::new()).unwrap_err();
        assert!(matches!(err, CartError::Core(CoreError::Validation(_))));
        assert!(cart.adapter().is_empty());
    }

    #[test]
    fn test_delimited_rejects_separators() {
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Delimited);
        assert!(cart.add("1,0", 1, AttributeSet::new()).is_err());
        assert!(cart.add("100", 1, attrs(&[("note", "a;b")])).is_err());
        assert!(cart.is_empty());

        // The structured format can hold them
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Structured);
        assert!(cart.add("100", 1, attrs(&[("note", "a;b")])).is_ok());
    }

    #[test]
    fn test_persistence_failure_leaves_cart_unchanged() {
        let mut cart = CartEngine::open_with(
            CartIdentity::from_seed(Some("test")),
            StoreLimits::unlimited(),
            WireFormat::Structured,
            FlakySession::default(),
        )
        .unwrap();
        cart.add("100", 2, AttributeSet::new()).unwrap();
        let before = cart.store().clone();

        cart.adapter.fail_writes = true;
        let err = cart.add("100", 5, AttributeSet::new()).unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(cart.store(), &before);

        assert!(cart.clear().is_err());
        assert!(cart.destroy().is_err());
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_writes_attribute_slot_for_delimited() {
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Delimited);
        cart.add("100", 2, attrs(&[("color", "gold")])).unwrap();

        let slot = cart.identity().slot().to_string();
        let attributes_slot = cart.identity().attributes_slot();
        let session = cart.into_adapter();
        assert_eq!(session.read_raw(&slot).unwrap().as_deref(), Some("100,2"));
        assert_eq!(
            session.read_raw(&attributes_slot).unwrap().as_deref(),
            Some("100,color,gold")
        );
    }

    #[test]
    fn test_summary_is_camel_case() {
        let mut cart = engine(StoreLimits::unlimited(), WireFormat::Structured);
        cart.add("100", 2, attrs(&[("price", "1.50")])).unwrap();

        let json = serde_json::to_value(cart.summary()).unwrap();
        assert_eq!(json["totalItem"], 1);
        assert_eq!(json["totalQuantity"], 2);
        assert_eq!(json["distinctItems"], 1);
        assert_eq!(json["isEmpty"], false);
        assert_eq!(json["items"][0]["id"], "100");
        assert_eq!(cart.attribute_total("price").to_string(), "3.00");
    }
}
