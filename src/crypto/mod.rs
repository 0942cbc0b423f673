//! Cryptographic primitives for pwvault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - PBKDF2 / Argon2id password-based key derivation (`kdf`)
//! - The zeroizing `DerivedKey` holder (`keys`)
//! - Fallible access to the OS CSPRNG (`random`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt};
pub use kdf::{derive_key, generate_salt, KdfParams};
pub use keys::DerivedKey;
