//! The persisted `(ciphertext, salt)` pair and its binary layout.
//!
//! Both halves are standard base64 text.  The ciphertext decodes to:
//!
//! ```text
//! [version: 1 byte][kdf id: 1 byte][kdf params][nonce: 12 bytes][ciphertext + 16-byte tag]
//! ```
//!
//! - **Version**: envelope scheme version (currently `1`).
//! - **KDF id**: `1` = PBKDF2-HMAC-SHA256, params = iterations (u32 LE).
//!   `2` = Argon2id, params = memory_kib, iterations, parallelism (u32 LE each).
//! - **Nonce + ciphertext**: output of `crypto::encrypt`.
//!
//! The header (version, kdf id, params) is passed to AES-GCM as associated
//! data, so it cannot be edited without breaking the tag.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Current envelope scheme version.
pub const CURRENT_VERSION: u8 = 1;

const KDF_PBKDF2_SHA256: u8 = 1;
const KDF_ARGON2ID: u8 = 2;

// ---------------------------------------------------------------------------
// EncryptedEnvelope
// ---------------------------------------------------------------------------

/// One encrypted record as handed to the persistence layer.
///
/// Opaque to everything except `VaultCodec`; stores must keep both fields
/// verbatim, since losing the salt makes the ciphertext undecryptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub ciphertext: String,
    pub salt: String,
}

impl EncryptedEnvelope {
    pub fn new(ciphertext: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            ciphertext: ciphertext.into(),
            salt: salt.into(),
        }
    }

    /// Build an envelope from raw bytes.
    pub(crate) fn from_bytes(blob: &[u8], salt: &[u8]) -> Self {
        Self {
            ciphertext: BASE64.encode(blob),
            salt: BASE64.encode(salt),
        }
    }

    /// Decode the salt.  Malformed text is a `DecryptionFailed`.
    pub(crate) fn salt_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.salt)
            .map_err(|_| VaultError::DecryptionFailed)
    }

    /// Decode the ciphertext blob.  Malformed text is a `DecryptionFailed`.
    pub(crate) fn blob_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(&self.ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }
}

// ---------------------------------------------------------------------------
// Header encoding
// ---------------------------------------------------------------------------

/// Serialize the envelope header for `params`.
pub(crate) fn encode_header(params: &KdfParams) -> Vec<u8> {
    let mut header = Vec::with_capacity(14);
    header.push(CURRENT_VERSION);
    match *params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            header.push(KDF_PBKDF2_SHA256);
            header.extend_from_slice(&iterations.to_le_bytes());
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            header.push(KDF_ARGON2ID);
            header.extend_from_slice(&memory_kib.to_le_bytes());
            header.extend_from_slice(&iterations.to_le_bytes());
            header.extend_from_slice(&parallelism.to_le_bytes());
        }
    }
    header
}

/// Parse the header at the front of `blob`.
///
/// Returns the stored params and the header length in bytes.  Unknown
/// versions, unknown KDF ids, truncated headers and params outside the
/// accepted ranges are `DecryptionFailed`.
pub(crate) fn decode_header(blob: &[u8]) -> Result<(KdfParams, usize)> {
    let (&version, rest) = blob.split_first().ok_or(VaultError::DecryptionFailed)?;
    if version != CURRENT_VERSION {
        tracing::debug!(version, "unsupported envelope version");
        return Err(VaultError::DecryptionFailed);
    }

    let (&kdf_id, rest) = rest.split_first().ok_or(VaultError::DecryptionFailed)?;
    let (params, header_len) = match kdf_id {
        KDF_PBKDF2_SHA256 => {
            let iterations = read_u32(rest, 0)?;
            (KdfParams::Pbkdf2Sha256 { iterations }, 2 + 4)
        }
        KDF_ARGON2ID => {
            let params = KdfParams::Argon2id {
                memory_kib: read_u32(rest, 0)?,
                iterations: read_u32(rest, 4)?,
                parallelism: read_u32(rest, 8)?,
            };
            (params, 2 + 12)
        }
        other => {
            tracing::debug!(kdf_id = other, "unknown KDF id in envelope");
            return Err(VaultError::DecryptionFailed);
        }
    };

    if let Err(reason) = params.check() {
        tracing::debug!(%reason, "envelope KDF params out of range");
        return Err(VaultError::DecryptionFailed);
    }
    Ok((params, header_len))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    bytes
        .get(offset..offset + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrips_both_kdfs() {
        for params in [KdfParams::pbkdf2(600_000), KdfParams::argon2id_default()] {
            let header = encode_header(&params);
            let (parsed, len) = decode_header(&header).unwrap();
            assert_eq!(parsed, params);
            assert_eq!(len, header.len());
        }
    }

    #[test]
    fn rejects_unknown_version() {
        let mut header = encode_header(&KdfParams::pbkdf2(10));
        header[0] = 9;
        assert!(matches!(
            decode_header(&header),
            Err(VaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn rejects_unknown_kdf() {
        let mut header = encode_header(&KdfParams::pbkdf2(10));
        header[1] = 77;
        assert!(decode_header(&header).is_err());
    }

    #[test]
    fn rejects_truncated_header() {
        let header = encode_header(&KdfParams::argon2id_default());
        assert!(decode_header(&header[..header.len() - 1]).is_err());
        assert!(decode_header(&[]).is_err());
    }

    #[test]
    fn rejects_params_outside_accepted_ranges() {
        let mut header = encode_header(&KdfParams::pbkdf2(1_000));
        header[2..6].copy_from_slice(&10_000_000u32.to_le_bytes());
        assert!(matches!(
            decode_header(&header),
            Err(VaultError::DecryptionFailed)
        ));

        let mut header = encode_header(&KdfParams::argon2id_default());
        // memory_kib = 4 GiB
        header[2..6].copy_from_slice(&(4 * 1024 * 1024u32).to_le_bytes());
        assert!(decode_header(&header).is_err());

        let zero = encode_header(&KdfParams::pbkdf2(0));
        assert!(decode_header(&zero).is_err());
    }

    #[test]
    fn envelope_serializes_as_two_strings() {
        let env = EncryptedEnvelope::new("Y2lwaGVy", "c2FsdA==");
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"ciphertext":"Y2lwaGVy","salt":"c2FsdA=="}"#);
    }

    #[test]
    fn malformed_base64_is_decryption_failure() {
        let env = EncryptedEnvelope::new("not base64!", "also not");
        assert!(matches!(env.salt_bytes(), Err(VaultError::DecryptionFailed)));
        assert!(matches!(env.blob_bytes(), Err(VaultError::DecryptionFailed)));
    }
}
