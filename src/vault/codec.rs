//! Record encryption and decryption.
//!
//! `VaultCodec` turns a `SecretRecord` plus a master password into an
//! `EncryptedEnvelope` and back.  It owns the meaning of the envelope bytes:
//! salt generation, KDF parameters, the AEAD layout and the classification
//! of every read-side failure as `DecryptionFailed`.

use zeroize::Zeroizing;

use crate::crypto::kdf::{derive_key, generate_salt, KdfParams};
use crate::crypto::{decrypt, encrypt};
use crate::errors::{Result, VaultError};

use super::envelope::{decode_header, encode_header, EncryptedEnvelope};
use super::record::{validate_master_password, SecretRecord};

/// Stateless encrypt/decrypt front end, parameterised by the KDF settings
/// used for *new* envelopes.  Existing envelopes always decrypt with the
/// params stored inside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultCodec {
    params: KdfParams,
}

impl VaultCodec {
    /// Build a codec that writes envelopes with `params`.
    pub fn new(params: KdfParams) -> Result<Self> {
        params.check().map_err(VaultError::Validation)?;
        Ok(Self { params })
    }

    /// KDF params applied to newly written envelopes.
    pub fn params(&self) -> KdfParams {
        self.params
    }

    /// Encrypt `record` under `master_password`.
    ///
    /// Generates a fresh salt and nonce on every call, so encrypting the
    /// same record twice never yields the same envelope.
    pub fn encrypt(&self, record: &SecretRecord, master_password: &str) -> Result<EncryptedEnvelope> {
        validate_master_password(master_password)?;
        record.validate()?;

        let salt = generate_salt()?;
        let key = derive_key(master_password.as_bytes(), &salt, &self.params)?;

        let plaintext = Zeroizing::new(
            serde_json::to_vec(record)
                .map_err(|e| VaultError::SerializationError(format!("record: {e}")))?,
        );

        let header = encode_header(&self.params);
        let sealed = encrypt(&key, &plaintext, &header)?;

        let mut blob = header;
        blob.extend_from_slice(&sealed);

        tracing::debug!(
            kdf = self.params.name(),
            iterations = self.params.iterations(),
            blob_len = blob.len(),
            "record encrypted"
        );

        Ok(EncryptedEnvelope::from_bytes(&blob, &salt))
    }

    /// Decrypt `envelope` with `master_password`.
    ///
    /// Wrong password, corrupted or truncated data, and envelopes from an
    /// unknown scheme version all return `DecryptionFailed`.
    pub fn decrypt(&self, envelope: &EncryptedEnvelope, master_password: &str) -> Result<SecretRecord> {
        validate_master_password(master_password)?;

        let result = Self::open(envelope, master_password);
        if result.is_err() {
            tracing::debug!("envelope rejected");
        }
        result
    }

    /// Decrypt with `old_password` and encrypt again with `new_password`,
    /// a fresh salt and this codec's params.
    pub fn reencrypt(
        &self,
        envelope: &EncryptedEnvelope,
        old_password: &str,
        new_password: &str,
    ) -> Result<EncryptedEnvelope> {
        let record = self.decrypt(envelope, old_password)?;
        self.encrypt(&record, new_password)
    }

    /// Read the KDF params stored in an envelope.  No password needed.
    pub fn inspect(envelope: &EncryptedEnvelope) -> Result<KdfParams> {
        let blob = envelope.blob_bytes()?;
        decode_header(&blob).map(|(params, _)| params)
    }

    /// Whether the envelope was written with params other than the current ones.
    pub fn needs_upgrade(&self, envelope: &EncryptedEnvelope) -> Result<bool> {
        Ok(Self::inspect(envelope)? != self.params)
    }

    fn open(envelope: &EncryptedEnvelope, master_password: &str) -> Result<SecretRecord> {
        let salt = envelope.salt_bytes()?;
        let blob = envelope.blob_bytes()?;
        let (params, header_len) = decode_header(&blob)?;

        let key = derive_key(master_password.as_bytes(), &salt, &params)
            .map_err(|_| VaultError::DecryptionFailed)?;

        let (header, sealed) = blob.split_at(header_len);
        let plaintext = Zeroizing::new(decrypt(&key, sealed, header)?);

        serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecryptionFailed)
    }
}
