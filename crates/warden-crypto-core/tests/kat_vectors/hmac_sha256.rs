//! RFC 4231: HMAC-SHA256 test vectors.
//!
//! Only the cases whose key is at least 32 bytes are usable, because
//! `SecretKey` rejects shorter secrets.

use data_encoding::HEXLOWER;
use warden_crypto_core::{MessageSigner, SecretKey};

fn rfc4231_signer() -> MessageSigner {
    MessageSigner::new(&SecretKey::from_bytes(&[0xAA; 131]).expect("131-byte key is valid"))
}

/// RFC 4231 Test Case 6: key larger than the block size.
#[test]
fn rfc4231_case_6() {
    let sig = rfc4231_signer()
        .sign_bytes(b"Test Using Larger Than Block-Size Key - Hash Key First");
    assert_eq!(
        sig,
        "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
    );
}

/// RFC 4231 Test Case 7: key and data larger than the block size.
#[test]
fn rfc4231_case_7() {
    let data = b"This is a test using a larger than block-size key and a larger \
than block-size data. The key needs to be hashed before being used by the HMAC algorithm.";
    let sig = rfc4231_signer().sign_bytes(data);
    assert_eq!(
        sig,
        "9b09ffa71b942fcb27635fbcd5b0e944bfdc63644f0713938a7f51535c3a35e2"
    );
}

/// The published digest verifies, in either hex case.
#[test]
fn rfc4231_case_6_verifies() {
    let signer = rfc4231_signer();
    let data = b"Test Using Larger Than Block-Size Key - Hash Key First";
    let expected = "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54";
    assert!(signer.verify_bytes(data, expected));
    assert!(signer.verify_bytes(data, &expected.to_uppercase()));
    assert_eq!(HEXLOWER.decode(expected.as_bytes()).unwrap().len(), 32);
}
