//! # Persistence Adapters
//!
//! Host storage for encoded cart slots.
//!
//! ## Slot Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      PersistenceAdapter                                 │
//! │                                                                         │
//! │  slot "<identity>"             → items payload                         │
//! │  slot "<identity>_attributes"  → attribute records (delimited format)  │
//! │                                                                         │
//! │  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐               │
//! │  │ MemorySession │  │  CookieJar    │  │  FileSession  │               │
//! │  │ (HashMap)     │  │ (Set-Cookie)  │  │ (one file per │               │
//! │  │               │  │               │  │  slot)        │               │
//! │  └───────────────┘  └───────────────┘  └───────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine receives its adapter by injection, so hosts and tests swap
//! storage without touching cart logic.

use std::collections::HashMap;

use crate::error::PersistenceResult;

/// Raw string storage keyed by slot name.
pub trait PersistenceAdapter {
    /// Returns the slot content, or `None` if the slot is absent.
    fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>>;

    /// Creates or replaces a slot.
    fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()>;

    /// Removes a slot. Removing an absent slot is not an error.
    fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()>;

    /// Writes several slots as one change.
    ///
    /// The default writes them in order. Adapters that can reject a write
    /// after accepting an earlier one override this to check every slot
    /// before storing any.
    fn write_many(&mut self, writes: &[(&str, &str)]) -> PersistenceResult<()> {
        for (slot, payload) in writes {
            self.write_raw(slot, payload)?;
        }
        Ok(())
    }
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for &mut A {
    fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>> {
        (**self).read_raw(slot)
    }

    fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()> {
        (**self).write_raw(slot, payload)
    }

    fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()> {
        (**self).delete_raw(slot)
    }

    fn write_many(&mut self, writes: &[(&str, &str)]) -> PersistenceResult<()> {
        (**self).write_many(writes)
    }
}

// =============================================================================
// Memory Session
// =============================================================================

/// Session-backed slots held in memory for the lifetime of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySession {
    slots: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `slot` is present (even when empty).
    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for MemorySession
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MemorySession {
            slots: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PersistenceAdapter for MemorySession {
    fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>> {
        Ok(self.slots.get(slot).cloned())
    }

    fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()> {
        self.slots.insert(slot.to_string(), payload.to_string());
        Ok(())
    }

    fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()> {
        self.slots.remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_slots() {
        let mut session = MemorySession::new();
        assert_eq!(session.read_raw("cart").unwrap(), None);

        session.write_raw("cart", "100,1").unwrap();
        assert_eq!(session.read_raw("cart").unwrap().as_deref(), Some("100,1"));

        session.write_raw("cart", "").unwrap();
        assert!(session.contains("cart"));
        assert_eq!(session.read_raw("cart").unwrap().as_deref(), Some(""));

        session.delete_raw("cart").unwrap();
        session.delete_raw("cart").unwrap();
        assert!(session.is_empty());
    }

    #[test]
    fn test_borrowed_adapter() {
        fn write_through<A: PersistenceAdapter>(mut adapter: A) {
            adapter.write_raw("slot", "value").unwrap();
        }

        let mut session = MemorySession::new();
        write_through(&mut session);
        assert_eq!(session.read_raw("slot").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_write_many_default() {
        let mut session = MemorySession::new();
        session
            .write_many(&[("cart", "100,1"), ("cart_attributes", "100,color,gold")])
            .unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(
            session.read_raw("cart_attributes").unwrap().as_deref(),
            Some("100,color,gold")
        );
    }

    #[test]
    fn test_from_iter() {
        let session: MemorySession = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(session.len(), 2);
        assert_eq!(session.read_raw("b").unwrap().as_deref(), Some("2"));
    }
}
