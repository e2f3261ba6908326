//! PBKDF2-HMAC-SHA256 test vectors (RFC 7914 §11 and the widely published
//! SHA-256 analogues of RFC 6070).
//!
//! `derive` always yields 32 bytes, which is the first PBKDF2 block, so
//! longer published outputs are compared on their first 32 bytes.

use data_encoding::HEXLOWER;
use warden_crypto_core::kdf;

fn check(password: &[u8], salt: &[u8], iterations: u32, expected_hex: &str) {
    let key = kdf::derive(password, salt, iterations).expect("derive should succeed");
    assert_eq!(HEXLOWER.encode(key.expose()), expected_hex);
    let expected = HEXLOWER.decode(expected_hex.as_bytes()).unwrap();
    assert!(kdf::verify(password, salt, iterations, &expected));
}

#[test]
fn password_salt_1_iteration() {
    check(
        b"password",
        b"salt",
        1,
        "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b",
    );
}

#[test]
fn password_salt_2_iterations() {
    check(
        b"password",
        b"salt",
        2,
        "ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43",
    );
}

#[test]
fn password_salt_4096_iterations() {
    check(
        b"password",
        b"salt",
        4096,
        "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a",
    );
}

/// RFC 7914 §11, first 32 bytes of the 64-byte output.
#[test]
fn rfc7914_passwd_salt_1_iteration() {
    check(
        b"passwd",
        b"salt",
        1,
        "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc",
    );
}
