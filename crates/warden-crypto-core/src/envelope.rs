//! Signed, encrypted transport envelopes.
//!
//! An [`Envelope`] binds three things:
//! - `timestamp`: RFC 3339 UTC instant of sealing
//! - `signature`: HMAC-SHA256 hex over the canonical JSON of the plaintext
//! - `encrypted_payload`: the same canonical JSON, encrypted with [`Cipher`]
//!
//! Because the signature covers the plaintext, a holder of the secret can
//! check it against data it already has without decrypting anything.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::signing::{canonical_json, MessageSigner};
use crate::symmetric::Cipher;

/// Timestamp + signature + ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// RFC 3339 UTC, microsecond precision.
    pub timestamp: String,
    /// Lowercase hex HMAC-SHA256 of the canonical plaintext.
    pub signature: String,
    /// Text token from [`Cipher::encrypt`].
    pub encrypted_payload: String,
}

impl Envelope {
    /// Sign and encrypt `data`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Serialization` if `data` is not JSON-representable
    /// - `CryptoError::Encryption` if sealing fails
    pub fn seal<T: Serialize + ?Sized>(
        cipher: &Cipher,
        signer: &MessageSigner,
        data: &T,
    ) -> Result<Self, CryptoError> {
        Self::seal_at(cipher, signer, data, Utc::now())
    }

    /// Same as [`Envelope::seal`] with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`Envelope::seal`].
    pub fn seal_at<T: Serialize + ?Sized>(
        cipher: &Cipher,
        signer: &MessageSigner,
        data: &T,
        at: DateTime<Utc>,
    ) -> Result<Self, CryptoError> {
        let payload = canonical_json(data).inspect_err(|e| {
            tracing::error!(error = %e, "envelope payload is not serializable");
        })?;
        let signature = signer.sign_bytes(&payload);
        let text = String::from_utf8(payload)
            .map_err(|e| CryptoError::Serialization(format!("canonical JSON is not UTF-8: {e}")))?;
        let encrypted_payload = cipher.encrypt(&text)?;

        Ok(Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Micros, true),
            signature,
            encrypted_payload,
        })
    }

    /// Decrypt the payload, check it against the signature, and deserialize.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Decryption` if the payload does not decrypt
    /// - `CryptoError::Signature` if the decrypted payload does not match
    /// - `CryptoError::Serialization` if it does not deserialize into `T`
    pub fn open<T: DeserializeOwned>(
        &self,
        cipher: &Cipher,
        signer: &MessageSigner,
    ) -> Result<T, CryptoError> {
        let plaintext = cipher.decrypt(&self.encrypted_payload)?;
        if !signer.verify_bytes(plaintext.as_bytes(), &self.signature) {
            tracing::warn!(timestamp = %self.timestamp, "envelope signature mismatch");
            return Err(CryptoError::Signature(
                "envelope signature does not match payload".into(),
            ));
        }
        serde_json::from_str(&plaintext)
            .map_err(|e| CryptoError::Serialization(format!("envelope payload: {e}")))
    }

    /// Parse the sealing timestamp.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if the timestamp is not RFC 3339.
    pub fn issued_at(&self) -> Result<DateTime<Utc>, CryptoError> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CryptoError::Serialization(format!("envelope timestamp: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
