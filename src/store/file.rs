//! Single-file envelope store.
//!
//! A `.pwv` store file has this layout:
//!
//! ```text
//! [PWVS: 4 bytes][version: 1 byte][items JSON]
//! ```
//!
//! - **Magic** (`PWVS`): identifies the file as a pwvault store.
//! - **Version**: store format version (currently `1`).
//! - **Items JSON**: serialized `Vec<StoredItem>`.
//!
//! The file only ever holds envelopes, so it carries no integrity tag of
//! its own: every envelope is authenticated by AES-GCM when opened.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{EnvelopeStore, ItemId, Ledger, OwnerId, StoredItem};
use crate::errors::{Result, VaultError};
use crate::vault::EncryptedEnvelope;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every store file.
const MAGIC: &[u8; 4] = b"PWVS";

/// Current store format version.
pub const STORE_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version).
const PREFIX_LEN: usize = 5;

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Envelope store backed by one file on disk.
///
/// Each mutation re-reads the file, applies the change and writes it back
/// atomically.  The mutex serialises read-modify-write cycles within this
/// process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open an existing store file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::StoreNotFound(path.to_path_buf()));
        }
        // Fail early on a file that is not a store.
        read_ledger(path)?;
        Ok(Self::at(path))
    }

    /// Open the store file, creating an empty one (and its parent
    /// directory) if it does not exist yet.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::open(path);
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        write_ledger(path, &Ledger::default())?;
        tracing::info!(path = %path.display(), "created store file");
        Ok(Self::at(path))
    }

    fn at(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Ledger) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| VaultError::CommandFailed("store lock poisoned".into()))?;
        let mut ledger = read_ledger(&self.path)?;
        let out = f(&mut ledger)?;
        write_ledger(&self.path, &ledger)?;
        Ok(out)
    }
}

impl EnvelopeStore for FileStore {
    fn insert(&self, owner: &OwnerId, envelope: EncryptedEnvelope) -> Result<StoredItem> {
        let item = self.modify(|l| l.insert(owner, envelope))?;
        tracing::debug!(item = %item.id, "item inserted");
        Ok(item)
    }

    fn get(&self, owner: &OwnerId, id: &ItemId) -> Result<StoredItem> {
        read_ledger(&self.path)?.get(owner, id)
    }

    fn list(&self, owner: &OwnerId) -> Result<Vec<StoredItem>> {
        Ok(read_ledger(&self.path)?.list(owner))
    }

    fn update(
        &self,
        owner: &OwnerId,
        id: &ItemId,
        envelope: EncryptedEnvelope,
    ) -> Result<StoredItem> {
        let item = self.modify(|l| l.update(owner, id, envelope))?;
        tracing::debug!(item = %item.id, "item updated");
        Ok(item)
    }

    fn update_many(
        &self,
        owner: &OwnerId,
        updates: Vec<(ItemId, EncryptedEnvelope)>,
    ) -> Result<Vec<StoredItem>> {
        let items = self.modify(|l| l.update_many(owner, updates))?;
        tracing::debug!(count = items.len(), "items updated");
        Ok(items)
    }

    fn delete(&self, owner: &OwnerId, id: &ItemId) -> Result<()> {
        self.modify(|l| l.delete(owner, id))?;
        tracing::debug!(item = %id, "item deleted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reading and writing
// ---------------------------------------------------------------------------

/// Write the store file **atomically**.
///
/// Writes to a temp file in the same directory, then renames it over the
/// target so readers never see a half-written file.
fn write_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    let items_bytes = serde_json::to_vec(ledger)
        .map_err(|e| VaultError::SerializationError(format!("items: {e}")))?;

    let mut buf = Vec::with_capacity(PREFIX_LEN + items_bytes.len());
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(STORE_VERSION); // 1 byte
    buf.extend_from_slice(&items_bytes);

    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;

    // On Unix, restrict permissions to owner-only read/write.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and parse the store file.
fn read_ledger(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Err(VaultError::StoreNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;

    if data.len() < PREFIX_LEN {
        return Err(VaultError::InvalidStoreFormat(
            "file too small to be a valid store".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(VaultError::InvalidStoreFormat(
            "missing PWVS magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != STORE_VERSION {
        return Err(VaultError::InvalidStoreFormat(format!(
            "unsupported version {version}, expected {STORE_VERSION}"
        )));
    }

    serde_json::from_slice(&data[PREFIX_LEN..])
        .map_err(|e| VaultError::InvalidStoreFormat(format!("items JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_missing_store_fails() {
        let dir = TempDir::new().unwrap();
        let result = FileStore::open(&dir.path().join("missing.pwv"));
        assert!(matches!(result, Err(VaultError::StoreNotFound(_))));
    }

    #[test]
    fn open_or_create_writes_empty_store() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("items.pwv");

        FileStore::open_or_create(&path).unwrap();
        let data = fs::read(&path).unwrap();
        assert_eq!(&data[..4], MAGIC);
        assert_eq!(data[4], STORE_VERSION);
        assert_eq!(&data[5..], b"[]");
    }

    #[test]
    fn rejects_wrong_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.pwv");
        fs::write(&path, b"NOPE\x01[]").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(VaultError::InvalidStoreFormat(_))
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.pwv");
        fs::write(&path, b"PWVS\x07[]").unwrap();
        assert!(FileStore::open(&path).is_err());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.pwv");
        let store = FileStore::open_or_create(&path).unwrap();
        let owner = OwnerId::new("u").unwrap();
        store
            .insert(&owner, EncryptedEnvelope::new("Y3Q=", "c2FsdA=="))
            .unwrap();
        assert!(!dir.path().join(".items.pwv.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn store_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("items.pwv");
        FileStore::open_or_create(&path).unwrap();

        let perms = fs::metadata(&path).unwrap().permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
