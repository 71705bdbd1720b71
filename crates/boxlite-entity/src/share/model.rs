//! Share entity model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use boxlite_core::error::AppError;
use boxlite_core::types::id::{FileId, UserId};

/// Permission granted to the bearer of a share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// The bearer may download the file.
    Read,
    /// The bearer may download and replace the file.
    Write,
    /// The link resolves but grants nothing.
    #[serde(rename = "none")]
    NoAccess,
}

impl SharePermission {
    /// Whether the bearer may read the file content.
    pub fn allows_read(self) -> bool {
        matches!(self, Self::Read | Self::Write)
    }

    /// Whether the bearer may modify the file content.
    pub fn allows_write(self) -> bool {
        matches!(self, Self::Write)
    }
}

impl fmt::Display for SharePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::NoAccess => write!(f, "none"),
        }
    }
}

impl FromStr for SharePermission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "none" => Ok(Self::NoAccess),
            other => Err(AppError::invalid_argument(format!(
                "Unknown permission level '{other}'. Expected read, write, or none"
            ))),
        }
    }
}

/// A bearer link granting access to one file until expiry or revocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Unguessable link token; primary key.
    pub token: String,
    /// The shared file. Not checked until the link is used.
    pub file_id: FileId,
    /// The user who created the share.
    pub owner_id: UserId,
    /// Permission level granted.
    pub permission_level: SharePermission,
    /// Cleared on revocation or once expiry is observed.
    pub is_valid: bool,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// When the share stops validating.
    pub expires_at: DateTime<Utc>,
    /// Number of successful validations.
    pub access_count: u64,
    /// Set when the share was explicitly revoked rather than expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ShareRecord {
    /// Whether the share is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the share would currently validate.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid && !self.is_expired_at(now)
    }

    /// Whether the share was invalidated by revocation.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// A short, log-safe prefix of the token.
    pub fn token_hint(&self) -> &str {
        token_hint(&self.token)
    }
}

/// A short, log-safe prefix of a share token.
pub fn token_hint(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(6)
        .map(|(idx, _)| idx)
        .unwrap_or(token.len());
    &token[..end]
}
