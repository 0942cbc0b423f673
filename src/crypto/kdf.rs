//! Password-based key derivation.
//!
//! Two algorithms are supported, both stretching a master password and a
//! per-item salt into a 256-bit key:
//!
//! - **PBKDF2-HMAC-SHA256** with a tunable iteration count (the default).
//! - **Argon2id**, memory-hard, for deployments that want it.
//!
//! The parameters travel inside every envelope, so raising the default only
//! affects new envelopes and old ones keep decrypting with their own cost.

use argon2::{Algorithm, Argon2, Params as Argon2Params, Version};
use sha2::Sha256;

use super::keys::DerivedKey;
use super::random::random_array;
use crate::errors::{Result, VaultError};

/// Length of the per-item salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Default PBKDF2 iteration count for new envelopes.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;

/// Upper bound on PBKDF2 iterations we are willing to run.
pub const MAX_PBKDF2_ITERATIONS: u32 = 2_000_000;

/// Minimum safe Argon2 memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Maximum Argon2 memory cost in KiB (1 GiB).
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

/// Maximum Argon2 passes.
pub const MAX_ARGON2_ITERATIONS: u32 = 10;

/// Maximum Argon2 lanes.
pub const MAX_PARALLELISM: u32 = 16;

/// Which KDF to run, and how hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    Pbkdf2Sha256 {
        iterations: u32,
    },
    Argon2id {
        /// Memory cost in KiB.
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// PBKDF2-HMAC-SHA256 with the given iteration count.
    pub const fn pbkdf2(iterations: u32) -> Self {
        Self::Pbkdf2Sha256 { iterations }
    }

    /// Argon2id at 64 MB, 3 passes, 4 lanes.
    pub const fn argon2id_default() -> Self {
        Self::Argon2id {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }

    /// Short algorithm name, safe to log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            Self::Argon2id { .. } => "argon2id",
        }
    }

    /// The time-cost component of the parameters.
    pub fn iterations(&self) -> u32 {
        match *self {
            Self::Pbkdf2Sha256 { iterations } | Self::Argon2id { iterations, .. } => iterations,
        }
    }

    /// Check the parameters against the accepted ranges.
    ///
    /// The same ranges apply when writing and when reading an envelope, so
    /// a header cannot ask for more work than a fresh envelope could.  The
    /// error message describes the offending value.
    pub fn check(&self) -> std::result::Result<(), String> {
        match *self {
            Self::Pbkdf2Sha256 { iterations } => {
                if iterations < 1 {
                    return Err("PBKDF2 iterations must be at least 1".into());
                }
                if iterations > MAX_PBKDF2_ITERATIONS {
                    return Err(format!(
                        "PBKDF2 iterations must be at most {MAX_PBKDF2_ITERATIONS} (got {iterations})"
                    ));
                }
            }
            Self::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&memory_kib) {
                    return Err(format!(
                        "Argon2 memory_kib must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} (got {memory_kib})"
                    ));
                }
                if !(1..=MAX_ARGON2_ITERATIONS).contains(&iterations) {
                    return Err(format!(
                        "Argon2 iterations must be between 1 and {MAX_ARGON2_ITERATIONS} (got {iterations})"
                    ));
                }
                if !(1..=MAX_PARALLELISM).contains(&parallelism) {
                    return Err(format!(
                        "Argon2 parallelism must be between 1 and {MAX_PARALLELISM} (got {parallelism})"
                    ));
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for KdfParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pbkdf2Sha256 { iterations } => write!(f, "pbkdf2-sha256 (i={iterations})"),
            Self::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => write!(
                f,
                "argon2id (m={memory_kib}KiB, t={iterations}, p={parallelism})"
            ),
        }
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt + params will always produce the same key.
/// Parameters outside the accepted ranges are refused.
pub fn derive_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    params.check().map_err(VaultError::KeyDerivationFailed)?;

    tracing::debug!(
        kdf = params.name(),
        iterations = params.iterations(),
        salt_len = salt.len(),
        "deriving key"
    );

    let mut key = [0u8; KEY_LEN];
    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            let argon2_params = Argon2Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
                .map_err(|e| {
                    VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}"))
                })?;
            Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
                .hash_password_into(password, salt, &mut key)
                .map_err(|e| {
                    VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
                })?;
        }
    }

    Ok(DerivedKey::new(key))
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    random_array()
}
