//! Wire types for the repository contents API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque version token (blob sha) assigned by the store.
///
/// Must accompany every overwrite; a stale token is rejected with a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata returned by GET on a file path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentMetadata {
    /// Blob sha, used as the version token.
    pub sha: String,

    /// File name.
    #[serde(default)]
    pub name: Option<String>,

    /// Full path inside the repository.
    #[serde(default)]
    pub path: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Commit author shown in the repository history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committer {
    pub name: String,
    pub email: String,
}

/// Body of a PUT on a file path.
#[derive(Debug, Clone, Serialize)]
pub struct PutContentsRequest<'a> {
    /// Commit message.
    pub message: &'a str,

    /// Base64-encoded file content.
    pub content: String,

    /// Target branch.
    pub branch: &'a str,

    /// Committer identity.
    pub committer: &'a Committer,

    /// Version token of the content being replaced; omitted on first write.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// Response to a successful PUT.
#[derive(Debug, Clone, Deserialize)]
pub struct PutContentsResponse {
    /// Metadata of the written file.
    pub content: Option<ContentMetadata>,
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (no directory part).
    pub name: String,

    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_request_omits_sha_on_first_write() {
        let committer = Committer {
            name: "App Bot".into(),
            email: "bot@example.org".into(),
        };
        let body = PutContentsRequest {
            message: "Save CSV: g_a.csv",
            content: "YQ==".into(),
            branch: "main",
            committer: &committer,
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["committer"]["email"], "bot@example.org");
        assert_eq!(json["branch"], "main");
    }

    #[test]
    fn test_dir_entry_unknown_kind() {
        let entries: Vec<DirEntry> = serde_json::from_str(
            r#"[{"name":"a.csv","type":"file","sha":"x"},{"name":"weird","type":"portal"}]"#,
        )
        .unwrap();
        assert_eq!(entries[0], DirEntry::file("a.csv"));
        assert_eq!(entries[1].kind, EntryKind::Other);
    }
}
