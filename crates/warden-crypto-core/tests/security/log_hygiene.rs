//! Failure paths log a reason but never the secret, plaintext or password.

use std::io;
use std::sync::{Arc, Mutex};

use serde_json::json;
use warden_crypto_core::{SecretKey, SecurityManager};

const SECRET_HEX: &str = "5ec2e75ec2e75ec2e75ec2e75ec2e75ec2e75ec2e75ec2e75ec2e75ec2e75ec2";

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn capture_logs(f: impl FnOnce()) -> String {
    let capture = Capture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

#[test]
fn failures_are_logged_without_sensitive_values() {
    let logs = capture_logs(|| {
        let manager = SecurityManager::new(SecretKey::from_hex(SECRET_HEX).unwrap()).unwrap();

        let blob = manager.encrypt("top secret plaintext").unwrap();
        let mut tampered = blob.into_bytes();
        let last = tampered.len() - 2;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(manager.decrypt(&tampered).is_err());

        let record = manager.hash_password("correct horse").unwrap();
        assert!(!manager.verify_password(&record, "battery staple"));
        assert!(!manager.verify_password("corrupt-record", "correct horse"));

        assert!(manager.verify_token("not.a.token").is_err());

        let sig = manager.sign(&json!({"k": 1})).unwrap();
        assert!(!manager.verify_signature(&json!({"k": 2}), &sig));
    });

    assert!(logs.contains("decryption rejected"), "{logs}");
    assert!(logs.contains("token rejected"), "{logs}");
    assert!(logs.contains("password record"), "{logs}");

    for needle in [
        SECRET_HEX,
        "top secret plaintext",
        "correct horse",
        "battery staple",
    ] {
        assert!(!logs.contains(needle), "log leaked {needle:?}");
    }
}

#[test]
fn debug_output_is_masked() {
    let secret = SecretKey::from_hex(SECRET_HEX).unwrap();
    let manager = SecurityManager::new(secret.clone()).unwrap();
    for debug in [
        format!("{secret:?}"),
        format!("{manager:?}"),
        format!("{:?}", manager.cipher()),
        format!("{:?}", manager.tokens()),
        format!("{:?}", manager.signer()),
    ] {
        assert!(!debug.contains("5ec2"), "{debug}");
        assert!(!debug.contains("94, 194"), "{debug}");
    }
}
