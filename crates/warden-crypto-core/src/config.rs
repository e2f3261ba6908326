//! Construction-time settings for [`crate::SecurityManager`].
//!
//! Stored as camelCase JSON. Every field has a default, so `{}` is a valid
//! configuration that yields a random secret and the standard parameters.
//! A file that exists but fails to parse is an error; it is never replaced
//! by defaults, since that would silently swap the secret.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::kdf;
use crate::memory::SecretKey;
use crate::token;

/// Settings for the credential and integrity manager.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityConfig {
    /// Hex-encoded process secret (≥ 32 bytes). `None` → random per process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key_hex: Option<String>,

    /// Default token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// PBKDF2 iterations for the cipher key.
    #[serde(default = "default_iterations")]
    pub kdf_iterations: u32,

    /// PBKDF2 iterations for password records.
    #[serde(default = "default_iterations")]
    pub password_iterations: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key_hex: None,
            token_ttl_secs: default_token_ttl_secs(),
            kdf_iterations: default_iterations(),
            password_iterations: default_iterations(),
        }
    }
}

const fn default_token_ttl_secs() -> u64 {
    token::DEFAULT_TTL.as_secs()
}
const fn default_iterations() -> u32 {
    kdf::DEFAULT_ITERATIONS
}

impl SecurityConfig {
    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Config` if the file cannot be read, is not
    /// valid JSON, or fails [`SecurityConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, CryptoError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CryptoError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| CryptoError::Config(format!("invalid JSON in {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check bounds: iteration floors, non-zero TTL, well-formed secret.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Config` describing the first violation.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.token_ttl_secs == 0 {
            return Err(CryptoError::Config("tokenTtlSecs must be > 0".into()));
        }
        kdf::ensure_min_iterations(self.kdf_iterations)
            .map_err(|e| CryptoError::Config(format!("kdfIterations: {e}")))?;
        kdf::ensure_min_iterations(self.password_iterations)
            .map_err(|e| CryptoError::Config(format!("passwordIterations: {e}")))?;
        self.secret_key()?;
        Ok(())
    }

    /// The configured secret, or `None` when one should be generated.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Config` if `secretKeyHex` is not valid hex or
    /// is shorter than 32 bytes.
    pub fn secret_key(&self) -> Result<Option<SecretKey>, CryptoError> {
        self.secret_key_hex
            .as_deref()
            .map(SecretKey::from_hex)
            .transpose()
            .map_err(|e| CryptoError::Config(format!("secretKeyHex: {e}")))
    }

    /// Default token lifetime.
    #[must_use]
    pub const fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field(
                "secret_key_hex",
                &self.secret_key_hex.as_ref().map(|_| "***"),
            )
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("password_iterations", &self.password_iterations)
            .finish()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
