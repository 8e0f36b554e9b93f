//! Long-term cart storage hook.
//!
//! Hosts that keep carts in a database implement [`CartArchive`]; the engine
//! only calls it on request through [`crate::CartEngine::archive_to`] and
//! [`crate::CartEngine::restore_from`]. No database is bundled.

use std::collections::HashMap;

use simplecart_core::{CartIdentity, ItemStore};

use crate::error::PersistenceResult;

/// Stores whole carts keyed by identity.
pub trait CartArchive {
    /// Saves `store` as the archived cart of `identity`, replacing any
    /// previous one.
    fn save_cart(&mut self, identity: &CartIdentity, store: &ItemStore) -> PersistenceResult<()>;

    /// Loads the archived cart of `identity`.
    fn load_cart(&self, identity: &CartIdentity) -> PersistenceResult<Option<ItemStore>>;
}

/// In-memory archive, for tests and single-process hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    carts: HashMap<CartIdentity, ItemStore>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}

impl CartArchive for MemoryArchive {
    fn save_cart(&mut self, identity: &CartIdentity, store: &ItemStore) -> PersistenceResult<()> {
        self.carts.insert(identity.clone(), store.clone());
        Ok(())
    }

    fn load_cart(&self, identity: &CartIdentity) -> PersistenceResult<Option<ItemStore>> {
        Ok(self.carts.get(identity).cloned())
    }
}
