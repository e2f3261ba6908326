//! Append-only access log.
//!
//! Each entry is one JSON object per line in `{data_dir}/access.log` and is
//! mirrored as a `tracing` event under the `warden::access` target. A failed
//! append is logged and swallowed: an unwritable audit file must not turn a
//! successful login into a failed one.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AccountError;

/// File name of the access log inside the data directory.
pub const ACCESS_LOG_FILE: &str = "access.log";

/// One line of the access log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    /// RFC 3339 UTC.
    pub timestamp: String,
    /// Id the attempt was made for; may name an unknown user.
    pub user_id: String,
    /// Operation name, e.g. `authenticate` or `add_user`.
    pub action: String,
    /// Whether the operation was allowed and completed.
    pub success: bool,
    /// Free-form context; never a secret.
    #[serde(default)]
    pub details: String,
}

/// Writer for `access.log`.
#[derive(Clone, Debug)]
pub struct AccessLog {
    path: PathBuf,
}

impl AccessLog {
    /// Log into `{data_dir}/access.log`. The file is created on first write.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(ACCESS_LOG_FILE),
        }
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry and emit the matching `tracing` event.
    pub fn record(&self, user_id: &str, action: &str, success: bool, details: &str) {
        let entry = AccessEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            user_id: user_id.to_owned(),
            action: action.to_owned(),
            success,
            details: details.to_owned(),
        };

        if success {
            tracing::info!(target: "warden::access", user_id, action, details, "access granted");
        } else {
            tracing::warn!(target: "warden::access", user_id, action, details, "access denied");
        }

        if let Err(e) = self.append(&entry) {
            tracing::error!(error = %e, path = %self.path.display(), "failed to write access log");
        }
    }

    fn append(&self, entry: &AccessEntry) -> std::io::Result<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push('\n');

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    /// Read back every well-formed entry, oldest first.
    ///
    /// A missing file reads as empty. Lines that do not parse are skipped
    /// with a warning.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Io` if the file exists but cannot be read.
    pub fn entries(&self) -> Result<Vec<AccessEntry>, AccountError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                serde_json::from_str(line)
                    .inspect_err(|e| tracing::warn!(error = %e, "skipping malformed access log line"))
                    .ok()
            })
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
