//! Expiring HS256 bearer tokens.
//!
//! Tokens use the compact JWS layout
//! `base64url(header) "." base64url(claims) "." base64url(hmac)` with header
//! `{"alg":"HS256","typ":"JWT"}` and exactly two claims, `sub` and `exp`
//! (Unix seconds). Validity depends only on the signature and the expiry;
//! there is no revocation list.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use data_encoding::BASE64URL_NOPAD;
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::memory::SecretKey;

/// Lifetime applied when the caller does not pass one.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// The only accepted `alg` header value.
pub const ALGORITHM: &str = "HS256";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Verified token contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenClaims {
    /// Subject identifier the token was issued to.
    #[serde(rename = "sub")]
    pub subject: String,
    /// Absolute expiry, Unix seconds.
    #[serde(rename = "exp")]
    pub expiry: u64,
}

impl TokenClaims {
    /// Expiry as a [`SystemTime`].
    #[must_use]
    pub fn expires_at(&self) -> SystemTime {
        UNIX_EPOCH
            .checked_add(Duration::from_secs(self.expiry))
            .unwrap_or(UNIX_EPOCH)
    }

    /// `true` once `now` has reached the expiry instant.
    #[must_use]
    pub const fn is_expired_at(&self, now: u64) -> bool {
        self.expiry <= now
    }
}

/// Current time as Unix seconds. A clock before 1970 reads as zero.
#[must_use]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Whole seconds of `ttl`, rounded up, never less than one.
fn ttl_secs(ttl: Duration) -> u64 {
    let extra = u64::from(ttl.subsec_nanos() > 0);
    ttl.as_secs().saturating_add(extra).max(1)
}

/// Log a token rejection and return the opaque error.
fn invalid(reason: &'static str) -> CryptoError {
    tracing::warn!(reason, "token rejected");
    CryptoError::TokenInvalid
}

// ---------------------------------------------------------------------------
// TokenIssuer
// ---------------------------------------------------------------------------

/// Issues and verifies tokens signed with the process secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: hmac::Key,
    default_ttl: Duration,
}

impl TokenIssuer {
    /// Key an issuer with the process secret and [`DEFAULT_TTL`].
    #[must_use]
    pub fn new(secret: &SecretKey) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.expose()),
            default_ttl: DEFAULT_TTL,
        }
    }

    /// Override the lifetime used when `issue_token` gets `None`.
    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Lifetime used when `issue_token` gets `None`.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` valid for `ttl` (or the default) from now.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if the claims cannot be encoded.
    pub fn issue_token(&self, subject: &str, ttl: Option<Duration>) -> Result<String, CryptoError> {
        self.issue_token_at(subject, ttl, unix_now())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Serialization` if the claims cannot be encoded.
    pub fn issue_token_at(
        &self,
        subject: &str,
        ttl: Option<Duration>,
        now: u64,
    ) -> Result<String, CryptoError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let claims = TokenClaims {
            subject: subject.to_owned(),
            expiry: now.saturating_add(ttl_secs(ttl)),
        };
        let header = TokenHeader {
            alg: ALGORITHM.to_owned(),
            typ: Some("JWT".to_owned()),
        };

        let header_json = serde_json::to_vec(&header)
            .map_err(|e| CryptoError::Serialization(format!("token header: {e}")))?;
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| CryptoError::Serialization(format!("token claims: {e}")))?;

        let mut token = BASE64URL_NOPAD.encode(&header_json);
        token.push('.');
        token.push_str(&BASE64URL_NOPAD.encode(&claims_json));
        let signature = hmac::sign(&self.key, token.as_bytes());
        token.push('.');
        token.push_str(&BASE64URL_NOPAD.encode(signature.as_ref()));

        tracing::debug!(subject, expiry = claims.expiry, "token issued");
        Ok(token)
    }

    /// Verify `token` against the current time.
    ///
    /// # Errors
    ///
    /// - `CryptoError::TokenInvalid`: empty, malformed, wrong algorithm, or
    ///   signature mismatch
    /// - `CryptoError::TokenExpired`: authentic but `exp <= now`
    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, CryptoError> {
        self.verify_token_at(token, unix_now())
    }

    /// Verify `token` as if the current time were `now` (Unix seconds).
    ///
    /// The signature is checked before the claims are parsed, so a forged
    /// token is reported as invalid even when its expiry is in the past.
    ///
    /// # Errors
    ///
    /// Same as [`TokenIssuer::verify_token`].
    pub fn verify_token_at(&self, token: &str, now: u64) -> Result<TokenClaims, CryptoError> {
        if token.is_empty() {
            return Err(invalid("empty token"));
        }
        let Some((signing_input, signature_b64)) = token.rsplit_once('.') else {
            return Err(invalid("token has no signature segment"));
        };
        let Some((header_b64, claims_b64)) = signing_input.split_once('.') else {
            return Err(invalid("token has no claims segment"));
        };
        if claims_b64.contains('.') {
            return Err(invalid("token has too many segments"));
        }

        let header_json = BASE64URL_NOPAD
            .decode(header_b64.as_bytes())
            .map_err(|_| invalid("header is not base64url"))?;
        let header: TokenHeader =
            serde_json::from_slice(&header_json).map_err(|_| invalid("header is not JSON"))?;
        if header.alg != ALGORITHM {
            return Err(invalid("unsupported algorithm"));
        }

        let signature = BASE64URL_NOPAD
            .decode(signature_b64.as_bytes())
            .map_err(|_| invalid("signature is not base64url"))?;
        hmac::verify(&self.key, signing_input.as_bytes(), &signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let claims_json = BASE64URL_NOPAD
            .decode(claims_b64.as_bytes())
            .map_err(|_| invalid("claims are not base64url"))?;
        let claims: TokenClaims = serde_json::from_slice(&claims_json)
            .map_err(|_| invalid("claims do not match {sub, exp}"))?;

        if claims.is_expired_at(now) {
            tracing::warn!(
                subject = %claims.subject,
                expiry = claims.expiry,
                now,
                "token expired"
            );
            return Err(CryptoError::TokenExpired);
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("key", &"***")
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
