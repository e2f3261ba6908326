//! Cryptographic error types for `warden-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
///
/// `Decryption`, `TokenExpired` and `TokenInvalid` deliberately carry no
/// detail: the reason is written to the log, never returned to the caller.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// PBKDF2 parameter validation failed (zero iterations, empty salt).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AES-256-GCM sealing failed. Not expected for valid inputs.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Ciphertext was malformed, tampered with, or sealed under another key.
    #[error("decryption failed: ciphertext rejected")]
    Decryption,

    /// Token signature is valid but its expiry is not after the current time.
    #[error("token has expired")]
    TokenExpired,

    /// Token is empty, malformed, uses another algorithm, or is forged.
    #[error("invalid token")]
    TokenInvalid,

    /// Message signature did not match its payload.
    #[error("signature error: {0}")]
    Signature(String),

    /// Invalid secret key material (too short, not hex).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// CSPRNG failure while generating salts, nonces or secrets.
    #[error("secure memory error: {0}")]
    SecureMemory(String),

    /// A value could not be represented as canonical JSON, or a timestamp
    /// could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration file missing, unreadable, or out of bounds.
    #[error("configuration error: {0}")]
    Config(String),
}
