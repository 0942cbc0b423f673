//! In-memory holder for derived keys.

use zeroize::Zeroize;

use super::kdf::KEY_LEN;

/// A 32-byte symmetric key produced by the KDF.
///
/// The bytes are zeroed when the value is dropped, and `Debug` never
/// prints them.  A derived key lives for exactly one encrypt or decrypt
/// call, so it is neither `Clone` nor serializable.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = DerivedKey::new([0x41; KEY_LEN]);
        let shown = format!("{key:?}");
        assert_eq!(shown, "DerivedKey([REDACTED])");
        assert!(!shown.contains("65"));
    }
}
