use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in pwvault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Caller-side validation ---
    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Crypto errors ---
    /// Wrong master password, corrupted envelope and tampered ciphertext all
    /// land here so callers cannot tell them apart.
    #[error("Decryption failed: wrong master password or corrupted item")]
    DecryptionFailed,

    #[error("Secure random source unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Store errors ---
    #[error("Item '{0}' not found")]
    ItemNotFound(String),

    #[error("Invalid store format: {0}")]
    InvalidStoreFormat(String),

    #[error("Store not found at {0}")]
    StoreNotFound(PathBuf),

    // --- Auth errors ---
    #[error("Unauthorized: missing, invalid or expired token")]
    Unauthorized,

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

/// Convenience type alias for pwvault results.
pub type Result<T> = std::result::Result<T, VaultError>;
