//! Transient version descriptors exchanged during sync.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use boxlite_core::types::id::FileId;

/// A version identifier: a counter or a content hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionTag {
    /// Monotonic version counter.
    Number(i64),
    /// Content hash or other opaque revision string.
    Hash(String),
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Hash(h) => f.write_str(h),
        }
    }
}

impl From<i64> for VersionTag {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for VersionTag {
    fn from(value: &str) -> Self {
        Self::Hash(value.to_string())
    }
}

/// One side of a sync comparison. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionDescriptor {
    /// The logical file being compared.
    pub file_id: FileId,
    /// Version identifier; required by the resolver.
    #[serde(default)]
    pub version: Option<VersionTag>,
    /// Last modification time. Absent sorts before every timestamp.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    /// Optional marker describing the content (checksum, etag).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_marker: Option<String>,
}

/// How an automatic conflict resolution went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    /// The local descriptor was newer and survived.
    ResolvedKeepLocal,
    /// The remote descriptor was newer (or tied) and survived.
    ResolvedKeepRemote,
}

impl ConflictStatus {
    /// Wire name, e.g. `"resolved_keep_remote"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResolvedKeepLocal => "resolved_keep_local",
            Self::ResolvedKeepRemote => "resolved_keep_remote",
        }
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The surviving descriptor, annotated when a conflict was auto-resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    /// The winning descriptor.
    #[serde(flatten)]
    pub descriptor: VersionDescriptor,
    /// Set when the two sides disagreed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_status: Option<ConflictStatus>,
    /// Version of the losing side, set together with `conflict_status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_version: Option<VersionTag>,
}

impl ResolvedVersion {
    /// A result that needed no decision.
    pub fn unchanged(descriptor: VersionDescriptor) -> Self {
        Self {
            descriptor,
            conflict_status: None,
            conflicting_version: None,
        }
    }

    /// Whether a conflict was detected and resolved.
    pub fn had_conflict(&self) -> bool {
        self.conflict_status.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_accepts_number_or_hash() {
        let numeric: VersionDescriptor =
            serde_json::from_str(r#"{"file_id":"f1","version":4}"#).unwrap();
        assert_eq!(numeric.version, Some(VersionTag::Number(4)));
        assert_eq!(numeric.modified_at, None);

        let hashed: VersionDescriptor =
            serde_json::from_str(r#"{"file_id":"f1","version":"9f86d08"}"#).unwrap();
        assert_eq!(hashed.version, Some(VersionTag::Hash("9f86d08".into())));

        let missing: VersionDescriptor = serde_json::from_str(r#"{"file_id":"f1"}"#).unwrap();
        assert_eq!(missing.version, None);
    }

    #[test]
    fn test_resolved_serializes_flat() {
        let resolved = ResolvedVersion {
            descriptor: VersionDescriptor {
                file_id: FileId::from("f1"),
                version: Some(VersionTag::Number(3)),
                modified_at: None,
                content_marker: None,
            },
            conflict_status: Some(ConflictStatus::ResolvedKeepRemote),
            conflicting_version: Some(VersionTag::Number(2)),
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["conflict_status"], "resolved_keep_remote");
        assert_eq!(json["conflicting_version"], 2);
    }
}
