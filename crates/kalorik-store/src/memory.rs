//! In-memory [`ContentStore`] with the same version semantics as the remote store.
//!
//! Used as a test double. Conflicts, interleaved writers and transient listing
//! failures can be injected to drive the retry paths.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{StoreError, StoreResult};
use crate::retry::{ConflictRetry, TransientRetry};
use crate::store::ContentStore;
use crate::types::{DirEntry, VersionToken};

#[derive(Debug, Default)]
struct State {
    objects: BTreeMap<String, Stored>,
    forced_conflicts: u32,
    list_failures: u32,
    list_failure_status: u16,
    interleaved: Vec<(String, Vec<u8>)>,
    rejected: BTreeMap<String, u16>,
    puts: u32,
}

#[derive(Debug, Clone)]
struct Stored {
    bytes: Vec<u8>,
    version: VersionToken,
}

/// Versioned blobs held in a map.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
    conflict: ConflictRetry,
    listing: TransientRetry,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store whose retry policies do not sleep.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            conflict: ConflictRetry::new(Duration::ZERO),
            listing: TransientRetry::new(3, Duration::ZERO),
        }
    }

    pub fn with_policies(mut self, conflict: ConflictRetry, listing: TransientRetry) -> Self {
        self.conflict = conflict;
        self.listing = listing;
        self
    }

    /// Store `bytes` at `path` unconditionally.
    pub fn insert(&self, path: &str, bytes: impl Into<Vec<u8>>) -> VersionToken {
        let mut state = self.lock();
        commit(&mut state, normalize(path), bytes.into())
    }

    /// Current bytes at `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&normalize(path))
            .map(|s| s.bytes.clone())
    }

    pub fn version_of(&self, path: &str) -> Option<VersionToken> {
        self.lock()
            .objects
            .get(&normalize(path))
            .map(|s| s.version.clone())
    }

    /// Number of put attempts seen, successful or not.
    pub fn put_count(&self) -> u32 {
        self.lock().puts
    }

    /// Reject the next `n` puts with a version conflict.
    pub fn force_conflicts(&self, n: u32) {
        self.lock().forced_conflicts = n;
    }

    /// Commit `bytes` at `path` on behalf of another writer, just before the
    /// next put is checked.
    pub fn interleave_write(&self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.lock()
            .interleaved
            .push((normalize(path), bytes.into()));
    }

    /// Answer every put to `path` with `status`.
    pub fn reject_writes(&self, path: &str, status: u16) {
        self.lock().rejected.insert(normalize(path), status);
    }

    /// Fail the next `n` directory listings with `status`.
    pub fn fail_listings(&self, n: u32, status: u16) {
        let mut state = self.lock();
        state.list_failures = n;
        state.list_failure_status = status;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_version(&self, path: &str) -> StoreResult<Option<VersionToken>> {
        Ok(self.version_of(path))
    }

    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        _message: &str,
        version: Option<&VersionToken>,
    ) -> StoreResult<VersionToken> {
        let path = normalize(path);
        let mut state = self.lock();
        state.puts += 1;

        for (other_path, other_bytes) in std::mem::take(&mut state.interleaved) {
            commit(&mut state, other_path, other_bytes);
        }

        if let Some(status) = state.rejected.get(&path) {
            return Err(StoreError::Remote {
                status: *status,
                message: "injected write failure".to_string(),
            });
        }

        if state.forced_conflicts > 0 {
            state.forced_conflicts -= 1;
            return Err(StoreError::VersionConflict { path });
        }

        let current = state.objects.get(&path).map(|s| &s.version);
        if current != version {
            return Err(StoreError::VersionConflict { path });
        }

        Ok(commit(&mut state, path, bytes.to_vec()))
    }

    async fn read(&self, path: &str) -> StoreResult<Vec<u8>> {
        self.contents(path).ok_or_else(|| StoreError::NotFound {
            path: normalize(path),
        })
    }

    async fn list_entries(&self, directory: &str) -> StoreResult<Vec<DirEntry>> {
        let dir = normalize(directory);
        let mut state = self.lock();

        if state.list_failures > 0 {
            state.list_failures -= 1;
            return Err(StoreError::Remote {
                status: state.list_failure_status,
                message: "injected listing failure".to_string(),
            });
        }

        if state.objects.contains_key(&dir) {
            return Ok(Vec::new());
        }

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();
        for key in state.objects.keys() {
            let Some(rest) = key.strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => dirs.insert(child.to_string()),
                None => files.insert(rest.to_string()),
            };
        }

        Ok(dirs
            .into_iter()
            .map(DirEntry::dir)
            .chain(files.into_iter().map(DirEntry::file))
            .collect())
    }

    fn conflict_policy(&self) -> ConflictRetry {
        self.conflict
    }

    fn listing_policy(&self) -> TransientRetry {
        self.listing
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

fn commit(state: &mut State, path: String, bytes: Vec<u8>) -> VersionToken {
    let version = blob_version(&bytes);
    state.objects.insert(
        path,
        Stored {
            bytes,
            version: version.clone(),
        },
    );
    version
}

/// Content hash in the style of a git blob id.
fn blob_version(bytes: &[u8]) -> VersionToken {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
    hasher.update(bytes);
    VersionToken::new(hex::encode(hasher.finalize()))
}
