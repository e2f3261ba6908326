//! Password record layout: a record assembled by hand from a known salt and
//! the matching PBKDF2 output must verify.

use data_encoding::BASE64;
use warden_crypto_core::kdf;
use warden_crypto_core::password::{PasswordHasher, HASH_LEN, SALT_LEN};

#[test]
fn hand_built_record_verifies() {
    let salt = [0x11u8; SALT_LEN];
    let hash = kdf::derive(b"hunter2", &salt, kdf::DEFAULT_ITERATIONS).unwrap();

    let mut record = Vec::with_capacity(SALT_LEN + HASH_LEN);
    record.extend_from_slice(&salt);
    record.extend_from_slice(hash.expose());
    let encoded = BASE64.encode(&record);

    let hasher = PasswordHasher::default();
    assert!(hasher.verify_password(&encoded, "hunter2"));
    assert!(!hasher.verify_password(&encoded, "hunter3"));
}

#[test]
fn record_is_64_base64_chars() {
    let record = PasswordHasher::default().hash_password("pw").unwrap();
    assert_eq!(record.len(), 64);
    assert!(record.ends_with(|c: char| c != '='));
}
