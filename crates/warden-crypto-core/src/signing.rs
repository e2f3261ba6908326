//! HMAC-SHA256 message signatures over canonical JSON.
//!
//! Data is first converted to a `serde_json::Value`, whose object keys are
//! kept in sorted order, then rendered as compact JSON. Equal data therefore
//! always signs to the same digest regardless of field declaration order.

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ring::hmac;
use serde::Serialize;

use crate::error::CryptoError;
use crate::memory::SecretKey;

/// Render `data` as canonical JSON bytes (sorted keys, no whitespace).
///
/// # Errors
///
/// Returns `CryptoError::Serialization` if `data` cannot be represented as
/// JSON (for example a map with non-string keys).
pub fn canonical_json<T: Serialize + ?Sized>(data: &T) -> Result<Vec<u8>, CryptoError> {
    let value = serde_json::to_value(data)
        .map_err(|e| CryptoError::Serialization(format!("value is not JSON-representable: {e}")))?;
    serde_json::to_vec(&value)
        .map_err(|e| CryptoError::Serialization(format!("JSON rendering failed: {e}")))
}

/// Keyed integrity signer.
#[derive(Clone)]
pub struct MessageSigner {
    key: hmac::Key,
}

impl MessageSigner {
    /// Key an HMAC-SHA256 signer directly with the process secret.
    #[must_use]
    pub fn new(secret: &SecretKey) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.expose()),
        }
    }

    /// Lowercase hex HMAC-SHA256 of raw bytes.
    #[must_use]
    pub fn sign_bytes(&self, data: &[u8]) -> String {
        HEXLOWER.encode(hmac::sign(&self.key, data).as_ref())
    }

    /// Lowercase hex HMAC-SHA256 of the canonical JSON form of `data`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if `data` is not JSON-representable.
    pub fn sign<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, CryptoError> {
        canonical_json(data).map(|bytes| self.sign_bytes(&bytes))
    }

    /// Constant-time check of a hex signature over raw bytes.
    #[must_use]
    pub fn verify_bytes(&self, data: &[u8], signature: &str) -> bool {
        let Ok(tag) = HEXLOWER_PERMISSIVE.decode(signature.as_bytes()) else {
            tracing::warn!("signature is not hex");
            return false;
        };
        hmac::verify(&self.key, data, &tag).is_ok()
    }

    /// Constant-time check of a hex signature over the canonical JSON form
    /// of `data`. Works without access to any ciphertext.
    #[must_use]
    pub fn verify<T: Serialize + ?Sized>(&self, data: &T, signature: &str) -> bool {
        match canonical_json(data) {
            Ok(bytes) => self.verify_bytes(&bytes, signature),
            Err(e) => {
                tracing::warn!(error = %e, "cannot verify signature of unserializable value");
                false
            }
        }
    }
}

impl std::fmt::Debug for MessageSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MessageSigner(***)")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
