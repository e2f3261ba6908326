//! `warden-accounts`: credential store for WARDEN.
//!
//! User records with salted password records, encrypted at rest by
//! [`warden_crypto_core::SecurityManager`], password login that issues
//! bearer tokens, and an append-only access log.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod access_log;
pub mod error;
pub mod store;

pub use access_log::{AccessEntry, AccessLog, ACCESS_LOG_FILE};
pub use error::AccountError;
pub use store::{CredentialStore, UserProfile, USERS_FILE};
