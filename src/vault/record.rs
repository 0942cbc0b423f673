//! The plaintext secret record and the checks that run before encryption.
//!
//! A `SecretRecord` only ever exists in memory on the encrypting or
//! decrypting side.  Its canonical byte form is the `serde_json` encoding
//! of the struct: field order is fixed by declaration, and the optional
//! fields are omitted when `None` but kept when `Some("")`, so absent and
//! empty survive a round trip as different values.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Minimum master-password length, in characters.
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// One stored login: title, credentials, site and free-form notes.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretRecord {
    /// Display name (required).
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// The stored password (required).
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SecretRecord {
    /// Create a record with the two required fields set.
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Reject records missing a title or a password.
    pub fn validate(&self) -> Result<()> {
        if self.title.is_empty() {
            return Err(VaultError::Validation("title is required".into()));
        }
        if self.password.is_empty() {
            return Err(VaultError::Validation("password is required".into()));
        }
        Ok(())
    }

    /// Case-insensitive match against title, username and url.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let hit = |s: &str| s.to_lowercase().contains(&query);
        hit(&self.title)
            || self.username.as_deref().is_some_and(hit)
            || self.url.as_deref().is_some_and(hit)
    }
}

// Keep secrets out of logs and panic messages.
impl std::fmt::Debug for SecretRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRecord")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("notes", &self.notes.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Reject master passwords shorter than `MIN_MASTER_PASSWORD_LEN` characters.
pub fn validate_master_password(master_password: &str) -> Result<()> {
    if master_password.chars().count() < MIN_MASTER_PASSWORD_LEN {
        return Err(VaultError::Validation(format!(
            "master password must be at least {MIN_MASTER_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
