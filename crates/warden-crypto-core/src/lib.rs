//! `warden-crypto-core`: credential and integrity primitives for WARDEN.
//!
//! Symmetric encryption, bearer tokens, password records and HMAC message
//! signatures, all keyed from a single process secret. No network, no async,
//! no storage; the only I/O is [`SecurityConfig::load`].

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod config;
pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub mod password;

pub mod signing;
pub mod token;

pub mod envelope;

pub mod manager;

pub use config::SecurityConfig;
pub use envelope::Envelope;
pub use error::CryptoError;
pub use manager::SecurityManager;
pub use memory::{SecretBuffer, SecretBytes, SecretKey};
pub use password::PasswordHasher;
pub use signing::{canonical_json, MessageSigner};
pub use symmetric::{Cipher, EncryptedBlob};
pub use token::{TokenClaims, TokenIssuer, DEFAULT_TTL};
