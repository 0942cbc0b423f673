//! In-process envelope store.

use std::sync::RwLock;

use super::{EnvelopeStore, ItemId, Ledger, OwnerId, StoredItem};
use crate::errors::{Result, VaultError};
use crate::vault::EncryptedEnvelope;

/// Keeps envelopes in memory behind a `RwLock`.  Useful for tests and for
/// embedding the vault in a longer-running process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: RwLock<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of items across all owners.
    pub fn len(&self) -> usize {
        self.ledger.read().map_or(0, |l| l.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> VaultError {
    VaultError::CommandFailed("memory store lock poisoned".into())
}

impl EnvelopeStore for MemoryStore {
    fn insert(&self, owner: &OwnerId, envelope: EncryptedEnvelope) -> Result<StoredItem> {
        self.ledger.write().map_err(poisoned)?.insert(owner, envelope)
    }

    fn get(&self, owner: &OwnerId, id: &ItemId) -> Result<StoredItem> {
        self.ledger.read().map_err(poisoned)?.get(owner, id)
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<StoredItem>> {
        Ok(self.ledger.read().map_err(poisoned)?.list(owner))
    }

    fn update(
        &self,
        owner: &OwnerId,
        id: &ItemId,
        envelope: EncryptedEnvelope,
    ) -> Result<StoredItem> {
        self.ledger
            .write()
            .map_err(poisoned)?
            .update(owner, id, envelope)
    }

    fn update_many(
        &self,
        owner: &OwnerId,
        updates: Vec<(ItemId, EncryptedEnvelope)>,
    ) -> Result<Vec<StoredItem>> {
        self.ledger
            .write()
            .map_err(poisoned)?
            .update_many(owner, updates)
    }

    fn delete(&self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        self.ledger.write().map_err(poisoned)?.delete(owner, id)
    }
}
