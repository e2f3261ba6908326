//! Scenarios through the `SecurityManager` facade with real parameters.

use std::thread;
use std::time::Duration;

use data_encoding::BASE64URL_NOPAD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use warden_crypto_core::{CryptoError, SecretKey, SecurityManager};

fn manager(byte: u8) -> SecurityManager {
    SecurityManager::new(SecretKey::from_bytes(&[byte; 32]).unwrap()).unwrap()
}

#[test]
fn encrypt_hello_roundtrip() {
    let m = manager(1);
    let c = m.encrypt("hello").unwrap();
    assert_ne!(c, "hello");
    assert_eq!(m.decrypt(&c).unwrap(), "hello");
}

#[test]
fn flipping_any_byte_of_the_blob_fails() {
    let m = manager(1);
    let token = m.encrypt("integrity matters").unwrap();
    let raw = BASE64URL_NOPAD.decode(token.as_bytes()).unwrap();
    for i in 0..raw.len() {
        let mut flipped = raw.clone();
        flipped[i] ^= 0x01;
        let edited = BASE64URL_NOPAD.encode(&flipped);
        assert!(
            matches!(m.decrypt(&edited), Err(CryptoError::Decryption)),
            "byte {i} flip was accepted"
        );
    }
}

#[test]
fn fresh_token_verifies_immediately() {
    let m = manager(2);
    let token = m.issue_token("alice", None).unwrap();
    let claims = m.verify_token(&token).unwrap();
    assert_eq!(claims.subject, "alice");
}

#[test]
fn one_second_token_expires_after_two_seconds() {
    let m = manager(2);
    let token = m.issue_token("alice", Some(Duration::from_secs(1))).unwrap();
    thread::sleep(Duration::from_secs(2));
    assert!(matches!(m.verify_token(&token), Err(CryptoError::TokenExpired)));
}

#[test]
fn token_under_other_secret_is_invalid() {
    let token = manager(2).issue_token("alice", None).unwrap();
    assert!(matches!(
        manager(3).verify_token(&token),
        Err(CryptoError::TokenInvalid)
    ));
}

#[test]
fn password_records_salted_and_case_sensitive() {
    let m = manager(4);
    let r1 = m.hash_password("pw").unwrap();
    let r2 = m.hash_password("pw").unwrap();
    assert_ne!(r1, r2);
    assert!(m.verify_password(&r1, "pw"));
    assert!(m.verify_password(&r2, "pw"));
    assert!(!m.verify_password(&r1, "wrong"));

    let r = m.hash_password("Secr3t!").unwrap();
    assert!(m.verify_password(&r, "Secr3t!"));
    assert!(!m.verify_password(&r, "secr3t!"));
}

#[test]
fn signatures_are_deterministic_and_keyed() {
    let data = json!({"sensor": "door", "open": false});
    let a = manager(5);
    assert_eq!(a.sign(&data).unwrap(), a.sign(&data).unwrap());
    assert_ne!(a.sign(&data).unwrap(), manager(6).sign(&data).unwrap());
    assert_ne!(
        a.sign(&data).unwrap(),
        a.sign(&json!({"sensor": "door", "open": true})).unwrap()
    );
}

#[test]
fn sealed_signature_checks_against_plaintext_without_decrypting() {
    let m = manager(7);
    let data = json!({"action": "arm", "zone": 2});
    let mut envelope = m.seal(&data).unwrap();
    envelope.encrypted_payload = "destroyed".to_owned();
    assert!(m.verify_signature(&data, &envelope.signature));
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Command {
    device: String,
    level: u8,
}

#[test]
fn typed_envelope_roundtrip() {
    let sender = manager(8);
    let receiver = manager(8);
    let cmd = Command {
        device: "dimmer".into(),
        level: 40,
    };
    let envelope = sender.secure_communication(&cmd).unwrap();
    let wire = serde_json::to_string(&envelope).unwrap();
    let received = serde_json::from_str(&wire).unwrap();
    let opened: Command = receiver.open_envelope(&received).unwrap();
    assert_eq!(opened, cmd);
}

#[test]
fn manager_is_shareable_across_threads() {
    let m = std::sync::Arc::new(manager(9));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let m = std::sync::Arc::clone(&m);
            thread::spawn(move || {
                let text = format!("thread {i}");
                let blob = m.encrypt(&text).unwrap();
                assert_eq!(m.decrypt(&blob).unwrap(), text);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
