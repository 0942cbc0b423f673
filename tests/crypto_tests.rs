//! Integration tests for the pwvault crypto module.

use pwvault::crypto::kdf::{KEY_LEN, SALT_LEN};
use pwvault::crypto::{decrypt, derive_key, encrypt, generate_salt, DerivedKey, KdfParams};
use pwvault::errors::VaultError;

const FAST: KdfParams = KdfParams::pbkdf2(1_000);

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = DerivedKey::new([0xAB; KEY_LEN]);
    let plaintext = br#"{"title":"Gmail","password":"Sup3rS3cret!"}"#;

    let ciphertext = encrypt(&key, plaintext, b"header").expect("encrypt should succeed");

    // 12-byte nonce + 16-byte tag on top of the plaintext.
    assert_eq!(ciphertext.len(), plaintext.len() + 28);

    let recovered = decrypt(&key, &ciphertext, b"header").expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = DerivedKey::new([0xCD; KEY_LEN]);
    let ct1 = encrypt(&key, b"same", b"").expect("encrypt 1");
    let ct2 = encrypt(&key, b"same", b"").expect("encrypt 2");
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let key = DerivedKey::new([0x11; KEY_LEN]);
    let wrong_key = DerivedKey::new([0x22; KEY_LEN]);

    let ciphertext = encrypt(&key, b"TOP_SECRET", b"").expect("encrypt");
    assert!(matches!(
        decrypt(&wrong_key, &ciphertext, b""),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let key = DerivedKey::new([0xAA; KEY_LEN]);
    assert!(matches!(
        decrypt(&key, &[0u8; 5], b""),
        Err(VaultError::DecryptionFailed)
    ));
    assert!(matches!(
        decrypt(&key, &[0u8; 27], b""),
        Err(VaultError::DecryptionFailed)
    ));
}

#[test]
fn every_flipped_byte_is_detected() {
    let key = DerivedKey::new([0xBB; KEY_LEN]);
    let ciphertext = encrypt(&key, b"VALUE=abc", b"aad").expect("encrypt");

    for i in 0..ciphertext.len() {
        let mut corrupted = ciphertext.clone();
        corrupted[i] ^= 0x01;
        assert!(
            decrypt(&key, &corrupted, b"aad").is_err(),
            "flip at byte {i} went unnoticed"
        );
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_key_same_inputs_same_output() {
    let salt = [7u8; SALT_LEN];
    let a = derive_key(b"correcthorse", &salt, &FAST).unwrap();
    let b = derive_key(b"correcthorse", &salt, &FAST).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derive_key_different_salts_different_keys() {
    let a = derive_key(b"correcthorse", &[1u8; SALT_LEN], &FAST).unwrap();
    let b = derive_key(b"correcthorse", &[2u8; SALT_LEN], &FAST).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derive_key_different_passwords_different_keys() {
    let salt = [3u8; SALT_LEN];
    let a = derive_key(b"correcthorse", &salt, &FAST).unwrap();
    let b = derive_key(b"correcthorsf", &salt, &FAST).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derive_key_depends_on_params() {
    let salt = [4u8; SALT_LEN];
    let a = derive_key(b"correcthorse", &salt, &FAST).unwrap();
    let b = derive_key(b"correcthorse", &salt, &KdfParams::pbkdf2(1_001)).unwrap();
    assert_ne!(a.as_bytes(), b.as_bytes());
}

#[test]
fn salts_are_random() {
    let a = generate_salt().unwrap();
    let b = generate_salt().unwrap();
    assert_eq!(a.len(), SALT_LEN);
    assert_ne!(a, b);
}

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt().unwrap();
    let key = derive_key(b"correcthorsebatterystaple", &salt, &FAST).unwrap();

    let ciphertext = encrypt(&key, b"hunter22", b"v1").unwrap();
    let again = derive_key(b"correcthorsebatterystaple", &salt, &FAST).unwrap();
    assert_eq!(decrypt(&again, &ciphertext, b"v1").unwrap(), b"hunter22");
    assert!(decrypt(&again, &ciphertext, b"v2").is_err());
}
