//! Store module: persistence of encrypted envelopes, scoped by owner.
//!
//! Stores never see plaintext, master passwords or keys: they keep
//! `EncryptedEnvelope`s verbatim next to an owner id and timestamps.
//!
//! This module provides:
//! - The `EnvelopeStore` trait and the shared item types (here)
//! - `MemoryStore`, an in-process store (`memory`)
//! - `FileStore`, a single-file store with atomic writes (`file`)

pub mod file;
pub mod memory;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::random::random_array;
use crate::errors::{Result, VaultError};
use crate::vault::EncryptedEnvelope;

pub use file::FileStore;
pub use memory::MemoryStore;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque, stable user identifier supplied by the auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(VaultError::Validation("owner id cannot be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one stored item (a random UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Draw a new random id from the OS source.
    pub fn generate() -> Result<Self> {
        let bytes: [u8; 16] = random_array()?;
        Ok(Self(uuid::Builder::from_random_bytes(bytes).into_uuid()))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ItemId {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| VaultError::ItemNotFound(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// StoredItem
// ---------------------------------------------------------------------------

/// An envelope as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: ItemId,
    pub owner: OwnerId,
    #[serde(flatten)]
    pub envelope: EncryptedEnvelope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EnvelopeStore
// ---------------------------------------------------------------------------

/// Persistence boundary.  Every call is scoped by owner: an item owned by
/// someone else is reported exactly like a missing one.
pub trait EnvelopeStore: Send + Sync {
    /// Store a new envelope and return the stored item.
    fn insert(&self, owner: &OwnerId, envelope: EncryptedEnvelope) -> Result<StoredItem>;

    /// Fetch one item.
    fn get(&self, owner: &OwnerId, id: &ItemId) -> Result<StoredItem>;

    /// All items of `owner`, newest first.
    fn list(&self, owner: &OwnerId) -> Result<Vec<StoredItem>>;

    /// Replace the envelope of an existing item.
    fn update(&self, owner: &OwnerId, id: &ItemId, envelope: EncryptedEnvelope)
        -> Result<StoredItem>;

    /// Replace several envelopes at once.  Either every update lands or,
    /// when any id is unknown to `owner`, none does.
    fn update_many(
        &self,
        owner: &OwnerId,
        updates: Vec<(ItemId, EncryptedEnvelope)>,
    ) -> Result<Vec<StoredItem>>;

    /// Remove an item.
    fn delete(&self, owner: &OwnerId, id: &ItemId) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Ledger: the owner-scoped item list both stores operate on
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Ledger {
    items: Vec<StoredItem>,
}

impl Ledger {
    pub(crate) fn insert(&mut self, owner: &OwnerId, envelope: EncryptedEnvelope) -> Result<StoredItem> {
        let now = Utc::now();
        let item = StoredItem {
            id: ItemId::generate()?,
            owner: owner.clone(),
            envelope,
            created_at: now,
            updated_at: now,
        };
        self.items.push(item.clone());
        Ok(item)
    }

    pub(crate) fn get(&self, owner: &OwnerId, id: &ItemId) -> Result<StoredItem> {
        self.items
            .iter()
            .find(|i| i.id == *id && i.owner == *owner)
            .cloned()
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))
    }

    pub(crate) fn list(&self, owner: &OwnerId) -> Vec<StoredItem> {
        // Reverse insertion order first so equal timestamps stay newest-first.
        let mut list: Vec<StoredItem> = self
            .items
            .iter()
            .rev()
            .filter(|i| i.owner == *owner)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub(crate) fn update(
        &mut self,
        owner: &OwnerId,
        id: &ItemId,
        envelope: EncryptedEnvelope,
    ) -> Result<StoredItem> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == *id && i.owner == *owner)
            .ok_or_else(|| VaultError::ItemNotFound(id.to_string()))?;
        item.envelope = envelope;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    pub(crate) fn update_many(
        &mut self,
        owner: &OwnerId,
        updates: Vec<(ItemId, EncryptedEnvelope)>,
    ) -> Result<Vec<StoredItem>> {
        // Check every id before touching anything.
        if let Some((missing, _)) = updates
            .iter()
            .find(|(id, _)| !self.items.iter().any(|i| i.id == *id && i.owner == *owner))
        {
            return Err(VaultError::ItemNotFound(missing.to_string()));
        }
        updates
            .into_iter()
            .map(|(id, envelope)| self.update(owner, &id, envelope))
            .collect()
    }

    pub(crate) fn delete(&mut self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        let before = self.items.len();
        self.items.retain(|i| !(i.id == *id && i.owner == *owner));
        if self.items.len() == before {
            return Err(VaultError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
