//! Entropy smoke tests for values drawn from `OsRng`.
//!
//! Thresholds are well under the expected Shannon entropy for each sample
//! size, so they only catch degenerate output (constant or repeating bytes).

use std::collections::HashSet;

use data_encoding::{BASE64, BASE64URL_NOPAD};
use warden_crypto_core::password::SALT_LEN;
use warden_crypto_core::symmetric::{Cipher, KEY_LEN, NONCE_LEN};
use warden_crypto_core::{PasswordHasher, SecretBytes, SecretKey};

#[allow(clippy::cast_precision_loss)]
fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0u64; 256];
    for &b in data {
        freq[b as usize] = freq[b as usize].saturating_add(1);
    }
    let len = data.len() as f64;
    freq.iter()
        .filter(|&&f| f > 0)
        .map(|&f| {
            let p = f as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// 1000 nonces: all distinct, ~12 KB pooled, entropy > 7.9.
#[test]
fn nonces_are_unique_and_high_entropy() {
    let cipher = Cipher::from_key(SecretBytes::new([0x01; KEY_LEN]));
    let mut seen = HashSet::new();
    let mut pool = Vec::with_capacity(1000 * NONCE_LEN);
    for _ in 0..1000 {
        let blob = cipher.encrypt_bytes(b"x").unwrap();
        assert!(seen.insert(blob.nonce), "nonce reused");
        pool.extend_from_slice(&blob.nonce);
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 7.9, "nonce entropy too low: {entropy:.4}");
}

/// Encrypting the same text twice never yields the same token.
#[test]
fn same_plaintext_gives_distinct_tokens() {
    let cipher = Cipher::from_key(SecretBytes::new([0x02; KEY_LEN]));
    let a = cipher.encrypt("same").unwrap();
    let b = cipher.encrypt("same").unwrap();
    assert_ne!(a, b);
    let a_bytes = BASE64URL_NOPAD.decode(a.as_bytes()).unwrap();
    let b_bytes = BASE64URL_NOPAD.decode(b.as_bytes()).unwrap();
    assert_ne!(a_bytes[1..=NONCE_LEN], b_bytes[1..=NONCE_LEN]);
}

/// 16 password salts: all distinct and not degenerate.
#[test]
fn password_salts_are_unique() {
    let hasher = PasswordHasher::default();
    let mut seen = HashSet::new();
    let mut pool = Vec::new();
    for _ in 0..16 {
        let record = hasher.hash_password("same password").unwrap();
        let decoded = BASE64.decode(record.as_bytes()).unwrap();
        let salt = decoded[..SALT_LEN].to_vec();
        pool.extend_from_slice(&salt);
        assert!(seen.insert(salt), "salt reused");
    }
    let entropy = shannon_entropy(&pool);
    assert!(entropy > 6.5, "salt entropy too low: {entropy:.4}");
}

/// Generated secrets are distinct and not constant.
#[test]
fn generated_secrets_are_random() {
    let a = SecretKey::generate().unwrap();
    let b = SecretKey::generate().unwrap();
    assert_eq!(a.len(), 32);
    assert_ne!(a.expose(), b.expose());
    assert!(shannon_entropy(a.expose()) > 3.5);
}
