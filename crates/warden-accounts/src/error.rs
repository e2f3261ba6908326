//! Error types for `warden-accounts`.

use thiserror::Error;
use warden_crypto_core::CryptoError;

/// Errors produced by credential store operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// A user with this id already exists.
    #[error("user already exists: {0}")]
    UserExists(String),

    /// No user with this id.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// User ids must be non-empty and free of control characters.
    #[error("invalid user id: {0:?}")]
    InvalidUserId(String),

    /// The users file exists but cannot be interpreted.
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
