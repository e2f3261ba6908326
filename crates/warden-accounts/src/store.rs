//! Encrypted user store with password login.
//!
//! Users live in `{data_dir}/users.json` as
//! `{"encrypted": true, "data": "<blob>"}`, where the blob is the
//! [`SecurityManager`] encryption of the JSON user map. Only salted password
//! records are stored, never passwords.
//!
//! The store takes `&mut self` for mutations. Callers that share it across
//! threads wrap it in their own lock.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use warden_crypto_core::SecurityManager;
use zeroize::Zeroize;

use crate::access_log::AccessLog;
use crate::error::AccountError;

/// File name of the user store inside the data directory.
pub const USERS_FILE: &str = "users.json";

const USERS_TMP_FILE: &str = ".users.json.tmp";

/// Access-log detail for any failed login.
const INVALID_CREDENTIALS: &str = "invalid credentials";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Public view of a user. Never carries the password record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login identifier, fixed at creation.
    pub id: String,
    /// Display name.
    pub name: String,
    /// RFC 3339 UTC.
    pub created_at: String,
    /// RFC 3339 UTC of the last successful login.
    pub last_login: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
struct UserRecord {
    name: String,
    password_hash: String,
    created_at: String,
    #[serde(default)]
    last_login: Option<String>,
}

impl UserRecord {
    fn profile(&self, id: &str) -> UserProfile {
        UserProfile {
            id: id.to_owned(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
            last_login: self.last_login.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct UsersFile {
    encrypted: bool,
    data: String,
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn validate_id(id: &str) -> Result<(), AccountError> {
    if id.trim().is_empty() || id.chars().any(char::is_control) {
        return Err(AccountError::InvalidUserId(id.to_owned()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Users, password records and the access log under one data directory.
pub struct CredentialStore {
    data_dir: PathBuf,
    manager: Arc<SecurityManager>,
    users: BTreeMap<String, UserRecord>,
    access_log: AccessLog,
    /// Verified against for unknown ids so both failure paths cost the same.
    dummy_record: String,
}

impl CredentialStore {
    /// Open (or start) the store in `data_dir`.
    ///
    /// A missing users file is an empty store; no default user is created.
    ///
    /// # Errors
    ///
    /// - `AccountError::Io` if the directory cannot be created or read
    /// - `AccountError::Storage` if the users file is not in the expected shape
    /// - `AccountError::Crypto` (`Decryption`) if it was written under another secret
    pub fn open(data_dir: &Path, manager: Arc<SecurityManager>) -> Result<Self, AccountError> {
        fs::create_dir_all(data_dir)?;
        let users = load_users(&data_dir.join(USERS_FILE), &manager)?;
        let dummy_record = manager.hash_password("")?;
        tracing::info!(users = users.len(), dir = %data_dir.display(), "credential store opened");
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            access_log: AccessLog::new(data_dir),
            manager,
            users,
            dummy_record,
        })
    }

    /// The access log for this store.
    #[must_use]
    pub const fn access_log(&self) -> &AccessLog {
        &self.access_log
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// `true` if no users exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Create a user with a fresh password record.
    ///
    /// # Errors
    ///
    /// - `AccountError::InvalidUserId` for an empty id or control characters
    /// - `AccountError::UserExists` if the id is taken
    /// - `AccountError::Io` / `AccountError::Crypto` if persisting fails
    pub fn add_user(
        &mut self,
        id: &str,
        name: &str,
        password: &str,
    ) -> Result<UserProfile, AccountError> {
        validate_id(id)?;
        if self.users.contains_key(id) {
            return Err(AccountError::UserExists(id.to_owned()));
        }
        let record = UserRecord {
            name: name.to_owned(),
            password_hash: self.manager.hash_password(password)?,
            created_at: now_rfc3339(),
            last_login: None,
        };
        let profile = record.profile(id);
        self.users.insert(id.to_owned(), record);
        if let Err(e) = self.save() {
            self.users.remove(id);
            return Err(e);
        }
        self.access_log.record(id, "add_user", true, "");
        Ok(profile)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// - `AccountError::UserNotFound` if the id is unknown
    /// - `AccountError::Io` / `AccountError::Crypto` if persisting fails
    pub fn remove_user(&mut self, id: &str) -> Result<(), AccountError> {
        let Some(record) = self.users.remove(id) else {
            return Err(AccountError::UserNotFound(id.to_owned()));
        };
        if let Err(e) = self.save() {
            self.users.insert(id.to_owned(), record);
            return Err(e);
        }
        self.access_log.record(id, "remove_user", true, "");
        Ok(())
    }

    /// Replace a user's password record.
    ///
    /// # Errors
    ///
    /// - `AccountError::UserNotFound` if the id is unknown
    /// - `AccountError::Io` / `AccountError::Crypto` if persisting fails
    pub fn set_password(&mut self, id: &str, password: &str) -> Result<(), AccountError> {
        if !self.users.contains_key(id) {
            return Err(AccountError::UserNotFound(id.to_owned()));
        }
        let new_hash = self.manager.hash_password(password)?;
        let old_hash = self
            .users
            .get_mut(id)
            .map(|record| std::mem::replace(&mut record.password_hash, new_hash));
        if let Err(e) = self.save() {
            if let (Some(record), Some(old)) = (self.users.get_mut(id), old_hash) {
                record.password_hash = old;
            }
            return Err(e);
        }
        self.access_log.record(id, "set_password", true, "");
        Ok(())
    }

    /// Change a user's display name. The id is immutable.
    ///
    /// # Errors
    ///
    /// - `AccountError::UserNotFound` if the id is unknown
    /// - `AccountError::Io` / `AccountError::Crypto` if persisting fails
    pub fn update_user(&mut self, id: &str, name: &str) -> Result<UserProfile, AccountError> {
        let Some(record) = self.users.get_mut(id) else {
            return Err(AccountError::UserNotFound(id.to_owned()));
        };
        let old_name = std::mem::replace(&mut record.name, name.to_owned());
        let profile = record.profile(id);
        if let Err(e) = self.save() {
            if let Some(record) = self.users.get_mut(id) {
                record.name = old_name;
            }
            return Err(e);
        }
        self.access_log.record(id, "update_user", true, "name");
        Ok(profile)
    }

    /// Look up one user.
    #[must_use]
    pub fn get_user(&self, id: &str) -> Option<UserProfile> {
        self.users.get(id).map(|record| record.profile(id))
    }

    /// All users, ordered by id.
    #[must_use]
    pub fn list_users(&self) -> Vec<UserProfile> {
        self.users
            .iter()
            .map(|(id, record)| record.profile(id))
            .collect()
    }

    /// Check a password and, on success, issue a bearer token for `id`.
    ///
    /// Unknown ids and wrong passwords both return `Ok(None)` after the
    /// same amount of hashing work.
    ///
    /// # Errors
    ///
    /// `AccountError::Io` / `AccountError::Crypto` if recording the login
    /// or issuing the token fails. A wrong password is not an error.
    pub fn authenticate(&mut self, id: &str, password: &str) -> Result<Option<String>, AccountError> {
        let verified = match self.users.get(id) {
            Some(record) => self.manager.verify_password(&record.password_hash, password),
            None => {
                let _ = self.manager.verify_password(&self.dummy_record, password);
                false
            }
        };

        if !verified {
            self.access_log
                .record(id, "authenticate", false, INVALID_CREDENTIALS);
            return Ok(None);
        }

        let token = self.manager.issue_token(id, None)?;
        let previous = self
            .users
            .get_mut(id)
            .and_then(|record| record.last_login.replace(now_rfc3339()));
        if let Err(e) = self.save() {
            if let Some(record) = self.users.get_mut(id) {
                record.last_login = previous;
            }
            return Err(e);
        }
        self.access_log.record(id, "authenticate", true, "");
        Ok(Some(token))
    }

    /// Resolve a bearer token to the user it was issued for.
    ///
    /// # Errors
    ///
    /// - `AccountError::Crypto` (`TokenExpired` / `TokenInvalid`) for a bad token
    /// - `AccountError::UserNotFound` if the user was removed after issuance
    pub fn resolve_session(&self, token: &str) -> Result<UserProfile, AccountError> {
        let claims = self.manager.verify_token(token)?;
        self.get_user(&claims.subject)
            .ok_or(AccountError::UserNotFound(claims.subject))
    }

    /// Encrypt and atomically write the user map.
    fn save(&self) -> Result<(), AccountError> {
        let mut json = serde_json::to_string(&self.users)
            .map_err(|e| AccountError::Storage(format!("cannot encode users: {e}")))?;
        let encrypted = self.manager.encrypt(&json);
        json.zeroize();
        let file = UsersFile {
            encrypted: true,
            data: encrypted?,
        };
        let contents = serde_json::to_string_pretty(&file)
            .map_err(|e| AccountError::Storage(format!("cannot encode users file: {e}")))?;

        let path = self.data_dir.join(USERS_FILE);
        let tmp = self.data_dir.join(USERS_TMP_FILE);
        fs::write(&tmp, &contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, &path)?;
        tracing::debug!(users = self.users.len(), "users file written");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("data_dir", &self.data_dir)
            .field("users", &self.users.len())
            .finish_non_exhaustive()
    }
}

fn load_users(
    path: &Path,
    manager: &SecurityManager,
) -> Result<BTreeMap<String, UserRecord>, AccountError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no users file, starting empty");
            return Ok(BTreeMap::new());
        }
        Err(e) => return Err(e.into()),
    };

    let file: UsersFile = serde_json::from_str(&contents)
        .map_err(|e| AccountError::Storage(format!("users file is not valid: {e}")))?;
    if !file.encrypted {
        return Err(AccountError::Storage(
            "users file is not encrypted".into(),
        ));
    }

    let mut json = manager.decrypt(&file.data).inspect_err(|_| {
        tracing::error!(path = %path.display(), "users file does not decrypt under this secret");
    })?;
    let users = serde_json::from_str(&json)
        .map_err(|e| AccountError::Storage(format!("user map is not valid: {e}")));
    json.zeroize();
    users
}

// ── Tests ──────────────────────────────────────────────────────────
