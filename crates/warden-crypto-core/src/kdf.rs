//! PBKDF2-HMAC-SHA256 key derivation.
//!
//! This module provides:
//! - [`derive`]: stretch a secret + salt into a 256-bit key
//! - [`verify`]: constant-time check of a previously derived value
//!
//! The same function backs both the cipher key (fixed [`CIPHER_KEY_SALT`])
//! and password records (random per-record salt, see [`crate::password`]).

use std::num::NonZeroU32;

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use ring::pbkdf2;
use zeroize::Zeroize;

/// Output length of the KDF in bytes (256 bits).
pub const OUTPUT_LEN: usize = 32;

/// Lowest iteration count accepted by [`crate::SecurityManager`] and
/// [`crate::password::PasswordHasher`].
pub const MIN_ITERATIONS: u32 = 100_000;

/// Iteration count used when the configuration does not override it.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Fixed salt for the cipher key.
///
/// Fixed so that the same secret always derives the same cipher key and
/// data encrypted by one process decrypts in the next. Password records do
/// not use it; each gets a random per-record salt.
pub const CIPHER_KEY_SALT: &[u8] = b"warden.cipher-key.v1";

/// Derive a 256-bit key from `secret` and `salt`.
///
/// Accepts any non-zero iteration count so tests can run with small values;
/// the minimum of [`MIN_ITERATIONS`] is enforced by the callers that hold
/// real secrets.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if `iterations` is zero or `salt`
/// is empty.
pub fn derive(
    secret: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<SecretBytes<OUTPUT_LEN>, CryptoError> {
    let iterations = checked_iterations(iterations)?;
    if salt.is_empty() {
        return Err(CryptoError::KeyDerivation("salt must not be empty".into()));
    }

    let mut output = [0u8; OUTPUT_LEN];
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt, secret, &mut output);
    let result = SecretBytes::new(output);
    output.zeroize();
    Ok(result)
}

/// Recompute the derivation for `secret` and compare it to `expected` in
/// constant time.
///
/// Returns `false` for a zero iteration count or an empty salt instead of
/// an error; a mismatch and a bad parameter look the same to the caller.
#[must_use]
pub fn verify(secret: &[u8], salt: &[u8], iterations: u32, expected: &[u8]) -> bool {
    let Some(iterations) = NonZeroU32::new(iterations) else {
        return false;
    };
    if salt.is_empty() {
        return false;
    }
    pbkdf2::verify(pbkdf2::PBKDF2_HMAC_SHA256, iterations, salt, secret, expected).is_ok()
}

fn checked_iterations(iterations: u32) -> Result<NonZeroU32, CryptoError> {
    NonZeroU32::new(iterations)
        .ok_or_else(|| CryptoError::KeyDerivation("iteration count must be non-zero".into()))
}

/// Reject iteration counts below [`MIN_ITERATIONS`].
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` naming the offending value.
pub fn ensure_min_iterations(iterations: u32) -> Result<(), CryptoError> {
    if iterations < MIN_ITERATIONS {
        return Err(CryptoError::KeyDerivation(format!(
            "iteration count {iterations} below minimum {MIN_ITERATIONS}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
