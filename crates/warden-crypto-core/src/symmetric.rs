//! AES-256-GCM authenticated encryption on the derived cipher key.
//!
//! This module provides:
//! - [`Cipher`]: holds the 256-bit key derived from the process secret
//! - [`EncryptedBlob`]: version + nonce + ciphertext + tag, with a text form
//!
//! # Text format
//!
//! `base64url_nopad(version || nonce || ciphertext || tag)`, where `version`
//! is one byte ([`BLOB_VERSION`]) that is also bound into the tag as AAD.
//! Decoding is strict, so two different texts never decode to the same
//! bytes: any edit to the text either fails to decode or fails the tag.

use crate::error::CryptoError;
use crate::kdf;
use crate::memory::{SecretBuffer, SecretBytes, SecretKey};
use data_encoding::BASE64URL_NOPAD;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use zeroize::Zeroize;

/// Current blob format version.
pub const BLOB_VERSION: u8 = 0x01;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum valid serialized length: version + nonce + empty ciphertext + tag.
const MIN_BLOB_LEN: usize = 1 + NONCE_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext container.
///
/// Wire format: `version (1) || nonce (12) || ciphertext (variable) || tag (16)`.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBlob {
    /// Format version, authenticated as AAD.
    pub version: u8,
    /// 96-bit random nonce, unique per encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted data (same length as the plaintext).
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl EncryptedBlob {
    /// Serialize to wire format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = MIN_BLOB_LEN.saturating_add(self.ciphertext.len());
        let mut out = Vec::with_capacity(capacity);
        out.push(self.version);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Deserialize from wire format.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` if the input is shorter than 29
    /// bytes or carries an unknown version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(reject("blob too short"));
        }
        let (version, rest) = bytes.split_at(1);
        if version[0] != BLOB_VERSION {
            return Err(reject("unknown blob version"));
        }

        let (nonce_bytes, rest) = rest.split_at(NONCE_LEN);
        let ct_len = rest
            .len()
            .checked_sub(TAG_LEN)
            .ok_or_else(|| reject("blob length underflow"))?;
        let (ciphertext, tag_bytes) = rest.split_at(ct_len);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(tag_bytes);

        Ok(Self {
            version: BLOB_VERSION,
            nonce,
            ciphertext: ciphertext.to_vec(),
            tag,
        })
    }

    /// Encode as a single URL-safe text token.
    #[must_use]
    pub fn to_text(&self) -> String {
        BASE64URL_NOPAD.encode(&self.to_bytes())
    }

    /// Decode a text token produced by [`EncryptedBlob::to_text`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` if the text is not canonical
    /// base64url or the decoded bytes are not a valid blob.
    pub fn from_text(text: &str) -> Result<Self, CryptoError> {
        let bytes = BASE64URL_NOPAD
            .decode(text.as_bytes())
            .map_err(|_| reject("blob is not base64url"))?;
        Self::from_bytes(&bytes)
    }
}

/// Log a decryption rejection and return the opaque error.
fn reject(reason: &'static str) -> CryptoError {
    tracing::warn!(reason, "decryption rejected");
    CryptoError::Decryption
}

// ---------------------------------------------------------------------------
// Cipher
// ---------------------------------------------------------------------------

/// AES-256-GCM cipher keyed by PBKDF2 over the process secret.
pub struct Cipher {
    key: SecretBytes<KEY_LEN>,
}

impl Cipher {
    /// Derive the cipher key from `secret` with the fixed
    /// [`kdf::CIPHER_KEY_SALT`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` if `iterations` is zero.
    pub fn new(secret: &SecretKey, iterations: u32) -> Result<Self, CryptoError> {
        let key = kdf::derive(secret.expose(), kdf::CIPHER_KEY_SALT, iterations)?;
        Ok(Self::from_key(key))
    }

    /// Use an already-derived 256-bit key.
    #[must_use]
    pub const fn from_key(key: SecretBytes<KEY_LEN>) -> Self {
        Self { key }
    }

    fn aead_key(&self) -> Result<aead::LessSafeKey, CryptoError> {
        let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, self.key.expose())
            .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
        Ok(aead::LessSafeKey::new(unbound))
    }

    /// Encrypt raw bytes with a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the primitive fails.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<EncryptedBlob, CryptoError> {
        let key = self.aead_key().inspect_err(|e| {
            tracing::error!(error = %e, "cipher key setup failed");
        })?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.try_fill_bytes(&mut nonce_bytes).map_err(|e| {
            tracing::error!(error = %e, "nonce generation failed");
            CryptoError::Encryption(format!("CSPRNG fill failed: {e}"))
        })?;
        let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.to_vec();
        let Ok(tag) =
            key.seal_in_place_separate_tag(nonce, aead::Aad::from([BLOB_VERSION]), &mut in_out)
        else {
            in_out.zeroize();
            tracing::error!(len = plaintext.len(), "AES-256-GCM seal failed");
            return Err(CryptoError::Encryption(
                "AES-256-GCM encryption failed".into(),
            ));
        };

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(tag.as_ref());

        Ok(EncryptedBlob {
            version: BLOB_VERSION,
            nonce: nonce_bytes,
            ciphertext: in_out,
            tag: tag_bytes,
        })
    }

    /// Authenticate and decrypt a blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` if authentication fails (tampered
    /// data or wrong key).
    pub fn decrypt_bytes(&self, blob: &EncryptedBlob) -> Result<SecretBuffer, CryptoError> {
        if blob.version != BLOB_VERSION {
            return Err(reject("unknown blob version"));
        }
        let key = self.aead_key().map_err(|_| reject("cipher key setup failed"))?;
        let nonce = aead::Nonce::assume_unique_for_key(blob.nonce);

        let mut ct_tag = Vec::with_capacity(blob.ciphertext.len().saturating_add(TAG_LEN));
        ct_tag.extend_from_slice(&blob.ciphertext);
        ct_tag.extend_from_slice(&blob.tag);

        let result = key
            .open_in_place(nonce, aead::Aad::from([blob.version]), &mut ct_tag)
            .map(|plaintext| SecretBuffer::new(plaintext))
            .map_err(|_| reject("authentication tag mismatch"));
        ct_tag.zeroize();
        result
    }

    /// Encrypt text into a self-describing text token.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the primitive fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.encrypt_bytes(plaintext.as_bytes())
            .map(|blob| blob.to_text())
    }

    /// Decrypt a token produced by [`Cipher::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` if the token is malformed, was
    /// modified, was produced under another key, or does not hold UTF-8.
    pub fn decrypt(&self, token: &str) -> Result<String, CryptoError> {
        let blob = EncryptedBlob::from_text(token)?;
        let plaintext = self.decrypt_bytes(&blob)?;
        String::from_utf8(plaintext.expose().to_vec()).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            reject("plaintext is not UTF-8")
        })
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").field("key", &self.key).finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
