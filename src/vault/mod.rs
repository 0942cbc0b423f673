//! Vault module: the record encryption scheme.
//!
//! This module provides:
//! - The plaintext `SecretRecord` and input validation (`record`)
//! - The persisted `EncryptedEnvelope` and its binary layout (`envelope`)
//! - `VaultCodec`, which encrypts and decrypts records (`codec`)

pub mod codec;
pub mod envelope;
pub mod record;

// Re-export the most commonly used items.
pub use codec::VaultCodec;
pub use envelope::EncryptedEnvelope;
pub use record::{validate_master_password, SecretRecord, MIN_MASTER_PASSWORD_LEN};
