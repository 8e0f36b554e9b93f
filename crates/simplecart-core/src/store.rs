//! # Item Store
//!
//! The in-memory cart: item id → ordered list of variants.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ItemStore                                                              │
//! │  ├── "100"  ─► [ {qty 3, color=gold,   hash a1f0…},                    │
//! │  │              {qty 1, color=silver, hash 9c2e…} ]                    │
//! │  └── "205"  ─► [ {qty 2, (no attributes), hash e3b0…} ]                │
//! │                                                                         │
//! │  Order across items: first insertion. Order within an item: insertion. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Within one item id, variant hashes are unique
//! - No item id maps to an empty variant list
//! - Every variant has quantity ≥ 1
//! - Distinct item ids never grow past `cart_max_item` through [`ItemStore::add`]
//!
//! ## Clamp Rule
//! Every mutation computes the new quantity first, then clamps it once to
//! `item_max_quantity` (0 = no clamp).

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::attributes::AttributeSet;
use crate::error::{CoreError, CoreResult};
use crate::hasher::{variant_hash, VariantHash};
use crate::validation::{validate_item_id, validate_quantity};

// =============================================================================
// Store Limits
// =============================================================================

/// Item-count and quantity limits. Zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLimits {
    /// Maximum number of distinct item ids.
    pub cart_max_item: u32,

    /// Maximum quantity of a single variant.
    pub item_max_quantity: u32,
}

impl StoreLimits {
    pub const fn new(cart_max_item: u32, item_max_quantity: u32) -> Self {
        StoreLimits {
            cart_max_item,
            item_max_quantity,
        }
    }

    /// No limits at all.
    pub const fn unlimited() -> Self {
        StoreLimits::new(0, 0)
    }

    /// Bounds `quantity` by `item_max_quantity` when that is non-zero.
    pub fn clamp(&self, quantity: u64) -> u32 {
        let bounded = if self.item_max_quantity > 0 {
            quantity.min(u64::from(self.item_max_quantity))
        } else {
            quantity
        };
        u32::try_from(bounded).unwrap_or(u32::MAX)
    }

    /// Returns true if a store holding `distinct_items` ids may take a new one.
    pub fn admits_new_item(&self, distinct_items: usize) -> bool {
        self.cart_max_item == 0 || distinct_items < self.cart_max_item as usize
    }
}

// =============================================================================
// Item Variant
// =============================================================================

/// One purchasable configuration of an item and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVariant {
    /// Item id (repeated here so a variant stands on its own in views).
    pub id: String,

    /// Quantity in cart, always ≥ 1.
    pub quantity: u32,

    /// Identity of `attributes`.
    pub hash: VariantHash,

    /// Variant-qualifying metadata (color, price, ...).
    pub attributes: AttributeSet,
}

impl ItemVariant {
    /// Creates a variant, deriving its hash from `attributes`.
    pub fn new(id: impl Into<String>, quantity: u32, attributes: AttributeSet) -> Self {
        let hash = variant_hash(&attributes);
        ItemVariant {
            id: id.into(),
            quantity,
            hash,
            attributes,
        }
    }

    /// `quantity × attributes[key]`, or zero if the attribute is missing or
    /// not a number.
    pub fn attribute_total(&self, key: &str) -> Amount {
        self.attributes
            .numeric(key)
            .map_or(Amount::zero(), |value| value * self.quantity)
    }
}

// =============================================================================
// Item Store
// =============================================================================

/// Ordered mapping of item id → variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<(String, Vec<ItemVariant>)>,
}

impl ItemStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        ItemStore { items: Vec::new() }
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|(id, _)| id == item_id)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds `quantity` of the variant `(item_id, attributes)`.
    ///
    /// ## Behavior
    /// - Variant already present: quantity becomes `clamp(old + quantity)`
    /// - Item present, variant new: variant appended with `clamp(quantity)`
    /// - Item new: rejected with `LimitExceeded` if the store is full,
    ///   otherwise appended
    ///
    /// ## Returns
    /// The resulting quantity of the variant.
    pub fn add(
        &mut self,
        item_id: &str,
        quantity: u32,
        attributes: AttributeSet,
        limits: &StoreLimits,
    ) -> CoreResult<u32> {
        validate_item_id(item_id)?;
        validate_quantity(quantity)?;

        let hash = variant_hash(&attributes);

        let Some(idx) = self.position(item_id) else {
            if !limits.admits_new_item(self.items.len()) {
                return Err(CoreError::LimitExceeded {
                    max: limits.cart_max_item,
                });
            }

            let variant = ItemVariant {
                id: item_id.to_string(),
                quantity: limits.clamp(u64::from(quantity)),
                hash,
                attributes,
            };
            let resulting = variant.quantity;
            self.items.push((item_id.to_string(), vec![variant]));
            return Ok(resulting);
        };

        let variants = &mut self.items[idx].1;
        if let Some(existing) = variants.iter_mut().find(|v| v.hash == hash) {
            existing.quantity = limits.clamp(u64::from(existing.quantity) + u64::from(quantity));
            return Ok(existing.quantity);
        }

        let variant = ItemVariant {
            id: item_id.to_string(),
            quantity: limits.clamp(u64::from(quantity)),
            hash,
            attributes,
        };
        let resulting = variant.quantity;
        variants.push(variant);
        Ok(resulting)
    }

    /// Sets the quantity of the variant `(item_id, attributes)`.
    ///
    /// A quantity of 0 behaves exactly like [`ItemStore::remove`] with the
    /// same attributes, and returns 0.
    pub fn update(
        &mut self,
        item_id: &str,
        quantity: u32,
        attributes: &AttributeSet,
        limits: &StoreLimits,
    ) -> CoreResult<u32> {
        if quantity == 0 {
            self.remove(item_id, Some(attributes))?;
            return Ok(0);
        }

        let idx = self
            .position(item_id)
            .ok_or_else(|| CoreError::item_not_found(item_id))?;

        let hash = variant_hash(attributes);
        let variant = self.items[idx]
            .1
            .iter_mut()
            .find(|v| v.hash == hash)
            .ok_or_else(|| CoreError::VariantNotFound {
                item_id: item_id.to_string(),
                hash: hash.clone(),
            })?;

        variant.quantity = limits.clamp(u64::from(quantity));
        Ok(variant.quantity)
    }

    /// Removes variants of `item_id`.
    ///
    /// ## Behavior
    /// - `None` or an empty set: every variant of the item goes
    /// - Otherwise: only the variant with matching hash goes; the item id
    ///   itself goes with its last variant
    ///
    /// ## Returns
    /// The number of variants removed.
    pub fn remove(&mut self, item_id: &str, attributes: Option<&AttributeSet>) -> CoreResult<usize> {
        let idx = self
            .position(item_id)
            .ok_or_else(|| CoreError::item_not_found(item_id))?;

        let Some(attributes) = attributes.filter(|a| !a.is_empty()) else {
            let (_, removed) = self.items.remove(idx);
            return Ok(removed.len());
        };

        let hash = variant_hash(attributes);
        let variants = &mut self.items[idx].1;
        let pos = variants
            .iter()
            .position(|v| v.hash == hash)
            .ok_or_else(|| CoreError::VariantNotFound {
                item_id: item_id.to_string(),
                hash: hash.clone(),
            })?;

        variants.remove(pos);
        if variants.is_empty() {
            self.items.remove(idx);
        }
        Ok(1)
    }

    /// Empties the store.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Inserts a decoded variant, bypassing limits.
    ///
    /// A variant whose hash is already present under the same id replaces
    /// it in place (last write wins). Returns true when that happened.
    pub(crate) fn restore(&mut self, variant: ItemVariant) -> bool {
        match self.position(&variant.id) {
            Some(idx) => {
                let variants = &mut self.items[idx].1;
                if let Some(existing) = variants.iter_mut().find(|v| v.hash == variant.hash) {
                    *existing = variant;
                    true
                } else {
                    variants.push(variant);
                    false
                }
            }
            None => {
                self.items.push((variant.id.clone(), vec![variant]));
                false
            }
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns true if the variant `(item_id, attributes)` is in the store.
    pub fn is_item_exists(&self, item_id: &str, attributes: &AttributeSet) -> bool {
        let hash = variant_hash(attributes);
        self.variants_of(item_id)
            .is_some_and(|variants| variants.iter().any(|v| v.hash == hash))
    }

    /// Returns one variant of `item_id`.
    ///
    /// With a hash, the matching variant; without one, the first variant.
    pub fn get_item(&self, item_id: &str, hash: Option<&VariantHash>) -> Option<&ItemVariant> {
        let variants = self.variants_of(item_id)?;
        match hash {
            Some(hash) => variants.iter().find(|v| &v.hash == hash),
            None => variants.first(),
        }
    }

    /// Returns all variants of `item_id`.
    pub fn variants_of(&self, item_id: &str) -> Option<&[ItemVariant]> {
        self.position(item_id).map(|idx| self.items[idx].1.as_slice())
    }

    /// Iterates `(item id, variants)` in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &[ItemVariant])> {
        self.items
            .iter()
            .map(|(id, variants)| (id.as_str(), variants.as_slice()))
    }

    /// Iterates every variant record.
    pub fn variants(&self) -> impl Iterator<Item = &ItemVariant> {
        self.items.iter().flat_map(|(_, variants)| variants.iter())
    }

    /// Number of distinct item ids.
    pub fn distinct_items(&self) -> usize {
        self.items.len()
    }

    /// Number of variant records (not distinct item ids).
    pub fn total_item_count(&self) -> usize {
        self.items.iter().map(|(_, variants)| variants.len()).sum()
    }

    /// Sum of all quantities.
    pub fn total_quantity(&self) -> u64 {
        self.variants().map(|v| u64::from(v.quantity)).sum()
    }

    /// Σ `quantity × attributes[key]` over every variant.
    ///
    /// Variants without the attribute, or with a non-numeric value,
    /// contribute zero.
    pub fn attribute_sum(&self, key: &str) -> Amount {
        self.variants().map(|v| v.attribute_total(key)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Serializes as `{ item id: [variant, ...] }` in insertion order.
impl Serialize for ItemStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let non_empty: Vec<_> = self.items.iter().filter(|(_, v)| !v.is_empty()).collect();
        let mut map = serializer.serialize_map(Some(non_empty.len()))?;
        for (id, variants) in non_empty {
            map.serialize_entry(id, variants)?;
        }
        map.end()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
