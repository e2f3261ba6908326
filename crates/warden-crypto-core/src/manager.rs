//! One-stop facade over the credential and integrity primitives.
//!
//! A [`SecurityManager`] is built once per process from a secret and owns
//! one instance of each component. Everything it holds is immutable after
//! construction, so it can be shared across threads behind an `Arc`.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::SecurityConfig;
use crate::envelope::Envelope;
use crate::error::CryptoError;
use crate::kdf;
use crate::memory::SecretKey;
use crate::password::PasswordHasher;
use crate::signing::MessageSigner;
use crate::symmetric::Cipher;
use crate::token::{TokenClaims, TokenIssuer};

/// Encryption, tokens, password records and signatures under one secret.
pub struct SecurityManager {
    cipher: Cipher,
    tokens: TokenIssuer,
    passwords: PasswordHasher,
    signer: MessageSigner,
}

impl SecurityManager {
    /// Build a manager from `secret` with the default parameters.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::KeyDerivation` if the cipher key cannot be derived.
    pub fn new(secret: SecretKey) -> Result<Self, CryptoError> {
        Self::from_parts(
            &secret,
            kdf::DEFAULT_ITERATIONS,
            PasswordHasher::default(),
            crate::token::DEFAULT_TTL,
        )
    }

    /// Build a manager around a fresh random secret.
    ///
    /// Ciphertexts and tokens from such a manager cannot be recovered once
    /// it is dropped.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        tracing::info!("no secret configured, generating a random one");
        Self::new(SecretKey::generate()?)
    }

    /// Build a manager from validated configuration.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Config` if the configuration is out of bounds
    /// - `CryptoError::SecureMemory` if a secret must be generated and the
    ///   CSPRNG fails
    pub fn from_config(config: &SecurityConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        let secret = match config.secret_key()? {
            Some(secret) => secret,
            None => {
                tracing::info!("no secret configured, generating a random one");
                SecretKey::generate()?
            }
        };
        let passwords = PasswordHasher::new(config.password_iterations)?;
        Self::from_parts(&secret, config.kdf_iterations, passwords, config.token_ttl())
    }

    fn from_parts(
        secret: &SecretKey,
        kdf_iterations: u32,
        passwords: PasswordHasher,
        token_ttl: Duration,
    ) -> Result<Self, CryptoError> {
        kdf::ensure_min_iterations(kdf_iterations)?;
        let cipher = Cipher::new(secret, kdf_iterations)?;
        let tokens = TokenIssuer::new(secret).with_default_ttl(token_ttl);
        let signer = MessageSigner::new(secret);
        tracing::debug!(
            kdf_iterations,
            password_iterations = passwords.iterations(),
            token_ttl_secs = token_ttl.as_secs(),
            "security manager ready"
        );
        Ok(Self {
            cipher,
            tokens,
            passwords,
            signer,
        })
    }

    // ── Confidentiality ────────────────────────────────────────────

    /// Encrypt `plaintext` into a text-safe blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` on primitive failure.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        self.cipher.encrypt(plaintext)
    }

    /// Decrypt a blob from [`SecurityManager::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Decryption` for any malformed, tampered or
    /// foreign blob.
    pub fn decrypt(&self, blob: &str) -> Result<String, CryptoError> {
        self.cipher.decrypt(blob)
    }

    // ── Tokens ─────────────────────────────────────────────────────

    /// Issue a bearer token for `subject`; `None` uses the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if the claims cannot be encoded.
    pub fn issue_token(&self, subject: &str, ttl: Option<Duration>) -> Result<String, CryptoError> {
        self.tokens.issue_token(subject, ttl)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - `CryptoError::TokenExpired` if the expiry has passed
    /// - `CryptoError::TokenInvalid` for anything else
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, CryptoError> {
        self.tokens.verify_token(token)
    }

    // ── Passwords ──────────────────────────────────────────────────

    /// Hash a password under a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecureMemory` if the CSPRNG fails.
    pub fn hash_password(&self, password: &str) -> Result<String, CryptoError> {
        self.passwords.hash_password(password)
    }

    /// `true` iff `candidate` matches `record`.
    #[must_use]
    pub fn verify_password(&self, record: &str, candidate: &str) -> bool {
        self.passwords.verify_password(record, candidate)
    }

    // ── Integrity ──────────────────────────────────────────────────

    /// Hex HMAC-SHA256 of the canonical JSON form of `data`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if `data` is not JSON-representable.
    pub fn sign<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, CryptoError> {
        self.signer.sign(data)
    }

    /// Constant-time check of a signature from [`SecurityManager::sign`].
    #[must_use]
    pub fn verify_signature<T: Serialize + ?Sized>(&self, data: &T, signature: &str) -> bool {
        self.signer.verify(data, signature)
    }

    /// Sign and encrypt `data` into a timestamped envelope.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Serialization` if `data` is not JSON-representable
    /// - `CryptoError::Encryption` on primitive failure
    pub fn secure_communication<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<Envelope, CryptoError> {
        Envelope::seal(&self.cipher, &self.signer, data)
    }

    /// Alias of [`SecurityManager::secure_communication`].
    ///
    /// # Errors
    ///
    /// Same as [`SecurityManager::secure_communication`].
    pub fn seal<T: Serialize + ?Sized>(&self, data: &T) -> Result<Envelope, CryptoError> {
        self.secure_communication(data)
    }

    /// Decrypt, verify and deserialize an envelope.
    ///
    /// # Errors
    ///
    /// `CryptoError::Decryption`, `CryptoError::Signature` or
    /// `CryptoError::Serialization`; see [`Envelope::open`].
    pub fn open_envelope<T: DeserializeOwned>(&self, envelope: &Envelope) -> Result<T, CryptoError> {
        envelope.open(&self.cipher, &self.signer)
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Underlying cipher.
    #[must_use]
    pub const fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    /// Underlying token issuer.
    #[must_use]
    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Underlying password hasher.
    #[must_use]
    pub const fn passwords(&self) -> &PasswordHasher {
        &self.passwords
    }

    /// Underlying message signer.
    #[must_use]
    pub const fn signer(&self) -> &MessageSigner {
        &self.signer
    }
}

impl std::fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityManager")
            .field("password_iterations", &self.passwords.iterations())
            .field("token_ttl", &self.tokens.default_ttl())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
