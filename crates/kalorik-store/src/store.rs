//! The storage seam: versioned byte blobs addressed by path.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::listing::ListingFilter;
use crate::retry::{ConflictRetry, TransientRetry};
use crate::types::{DirEntry, VersionToken};

/// A remote store of versioned byte blobs.
///
/// Implementors supply the single-request primitives; [`ContentStore::write`]
/// and [`ContentStore::list`] layer the retry policies on top.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Current version token of `path`; `None` if the object does not exist.
    async fn get_version(&self, path: &str) -> StoreResult<Option<VersionToken>>;

    /// One put guarded by `version` (`None` creates the object).
    ///
    /// A stale or missing token yields `StoreError::VersionConflict`.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        version: Option<&VersionToken>,
    ) -> StoreResult<VersionToken>;

    /// Raw bytes of `path`; `StoreError::NotFound` if absent.
    async fn read(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Entries directly below `directory`.
    ///
    /// An absent directory, or a path naming a file, yields no entries.
    async fn list_entries(&self, directory: &str) -> StoreResult<Vec<DirEntry>>;

    fn conflict_policy(&self) -> ConflictRetry {
        ConflictRetry::default()
    }

    fn listing_policy(&self) -> TransientRetry {
        TransientRetry::default()
    }

    /// Create or overwrite `path`, retrying once on a version conflict.
    async fn write(&self, path: &str, bytes: &[u8], message: &str) -> StoreResult<VersionToken> {
        self.conflict_policy()
            .write(self, path, bytes, message)
            .await
    }

    /// Sorted names below `directory` accepted by `filter`.
    async fn list(&self, directory: &str, filter: &ListingFilter) -> StoreResult<Vec<String>> {
        let entries = self
            .listing_policy()
            .run("list", || self.list_entries(directory))
            .await?;
        Ok(filter.apply(entries))
    }
}
