//! Loading a manager from a config file on disk.

use std::fs;

use tempfile::TempDir;
use warden_crypto_core::{CryptoError, SecretKey, SecurityConfig, SecurityManager};

const SECRET_HEX: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

#[test]
fn configured_secret_decrypts_across_restarts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("security.json");
    fs::write(
        &path,
        format!(r#"{{"secretKeyHex":"{SECRET_HEX}","tokenTtlSecs":600}}"#),
    )
    .unwrap();

    let first = SecurityManager::from_config(&SecurityConfig::load(&path).unwrap()).unwrap();
    let blob = first.encrypt("persisted").unwrap();
    let token = first.issue_token("svc", None).unwrap();
    drop(first);

    let second = SecurityManager::from_config(&SecurityConfig::load(&path).unwrap()).unwrap();
    assert_eq!(second.decrypt(&blob).unwrap(), "persisted");
    assert_eq!(second.verify_token(&token).unwrap().subject, "svc");

    let direct = SecurityManager::new(SecretKey::from_hex(SECRET_HEX).unwrap()).unwrap();
    assert_eq!(direct.decrypt(&blob).unwrap(), "persisted");
}

#[test]
fn config_without_secret_generates_one() {
    let a = SecurityManager::from_config(&SecurityConfig::default()).unwrap();
    let b = SecurityManager::from_config(&SecurityConfig::default()).unwrap();
    let blob = a.encrypt("ephemeral").unwrap();
    assert!(matches!(b.decrypt(&blob), Err(CryptoError::Decryption)));
}

#[test]
fn corrupt_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("security.json");
    fs::write(&path, r#"{"kdfIterations": "many"}"#).unwrap();
    assert!(matches!(
        SecurityConfig::load(&path),
        Err(CryptoError::Config(_))
    ));
}
