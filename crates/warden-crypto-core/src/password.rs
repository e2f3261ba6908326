//! Salted PBKDF2 password records.
//!
//! A record is `base64(salt || hash)`: a 16-byte random salt followed by the
//! 32-byte PBKDF2-HMAC-SHA256 output. Verification recomputes the hash with
//! the stored salt and compares in constant time.
//!
//! [`PasswordHasher::verify_password`] never returns an error. A corrupt
//! record and a wrong password both yield `false`, so the call cannot be
//! used as an oracle for record validity.

use data_encoding::BASE64;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::kdf;

/// Random salt length per record.
pub const SALT_LEN: usize = 16;

/// Derived hash length.
pub const HASH_LEN: usize = kdf::OUTPUT_LEN;

/// Decoded record length.
const RECORD_LEN: usize = SALT_LEN + HASH_LEN;

/// Hashes and verifies password records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordHasher {
    iterations: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            iterations: kdf::DEFAULT_ITERATIONS,
        }
    }
}

impl PasswordHasher {
    /// Create a hasher with a custom iteration count.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` if `iterations` is below
    /// [`kdf::MIN_ITERATIONS`].
    pub fn new(iterations: u32) -> Result<Self, CryptoError> {
        kdf::ensure_min_iterations(iterations)?;
        Ok(Self { iterations })
    }

    /// Iteration count applied to new and verified records.
    #[must_use]
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Hash `password` under a fresh random salt.
    ///
    /// Two calls with the same password return different records.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt).map_err(|e| {
            tracing::error!(error = %e, "salt generation failed");
            CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}"))
        })?;

        let hash = kdf::derive(password.as_bytes(), &salt, self.iterations)?;

        let mut record = [0u8; RECORD_LEN];
        record[..SALT_LEN].copy_from_slice(&salt);
        record[SALT_LEN..].copy_from_slice(hash.expose());
        let encoded = BASE64.encode(&record);
        record.zeroize();
        Ok(encoded)
    }

    /// Check `candidate` against a record from [`PasswordHasher::hash_password`].
    ///
    /// Returns `false` on mismatch and on any decoding problem; the latter
    /// is logged.
    #[must_use]
    pub fn verify_password(&self, record: &str, candidate: &str) -> bool {
        let mut decoded = match BASE64.decode(record.as_bytes()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "password record is not base64");
                return false;
            }
        };
        if decoded.len() != RECORD_LEN {
            tracing::warn!(
                len = decoded.len(),
                expected = RECORD_LEN,
                "password record has wrong length"
            );
            decoded.zeroize();
            return false;
        }

        let (salt, hash) = decoded.split_at(SALT_LEN);
        let matches = kdf::verify(candidate.as_bytes(), salt, self.iterations, hash);
        decoded.zeroize();
        matches
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
