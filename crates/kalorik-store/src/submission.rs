//! Saving and loading submissions.
//!
//! A submission is stored as two independent objects: the table
//! (`<key>.csv`) and the annotation (`<key>_auswertung.txt`). The two writes
//! are not atomic; if the second fails after the first succeeded the error is
//! [`StoreError::PartialSave`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{
    decode_annotation, decode_table, encode_annotation, encode_table, Submission, Table,
};
use crate::error::{StoreError, StoreResult};
use crate::listing::ListingFilter;
use crate::naming::{
    annotation_name_for, is_sanitized, sanitize, strip_table_extension, SubmissionKey,
};
use crate::stations::Station;
use crate::store::ContentStore;
use crate::summary::{split_table_name, SubmissionSummary};
use crate::types::VersionToken;

/// Result of a complete save.
#[derive(Debug, Clone, Serialize)]
pub struct SaveReceipt {
    pub table_name: String,
    pub annotation_name: String,
    pub table_version: VersionToken,
    pub annotation_version: VersionToken,
    pub saved_at: DateTime<Utc>,
}

/// Submission operations over any [`ContentStore`].
#[derive(Debug, Clone)]
pub struct SubmissionService<S> {
    store: S,
}

impl<S: ContentStore> SubmissionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write table then annotation. Success only when both writes succeed.
    pub async fn save(
        &self,
        key: &SubmissionKey,
        submission: &Submission,
    ) -> StoreResult<SaveReceipt> {
        let table_name = key.table_name();
        let annotation_name = key.annotation_name();

        let table_bytes = encode_table(&submission.table)?;
        let table_version = self
            .store
            .write(&table_name, &table_bytes, &format!("Save CSV: {}", table_name))
            .await?;
        debug!(file = %table_name, version = %table_version, "table saved");

        let annotation_bytes = encode_annotation(&submission.annotation);
        let annotation_version = match self
            .store
            .write(
                &annotation_name,
                &annotation_bytes,
                &format!("Save TXT: {}", annotation_name),
            )
            .await
        {
            Ok(version) => version,
            Err(e) => {
                warn!(
                    table = %table_name,
                    annotation = %annotation_name,
                    error = %e,
                    "table saved but annotation failed"
                );
                return Err(StoreError::PartialSave {
                    saved: table_name,
                    failed: annotation_name,
                    source: Box::new(e),
                });
            }
        };

        info!(key = %key, file = %table_name, "submission saved");

        Ok(SaveReceipt {
            table_name,
            annotation_name,
            table_version,
            annotation_version,
            saved_at: Utc::now(),
        })
    }

    /// Stored submission; missing objects yield empty parts.
    pub async fn load(&self, key: &SubmissionKey) -> StoreResult<Submission> {
        self.load_names(&key.table_name(), &key.annotation_name())
            .await
    }

    /// Like [`load`](Self::load), but an empty table is replaced by the
    /// station's template when the station is in the catalog.
    pub async fn load_or_template(&self, key: &SubmissionKey) -> StoreResult<Submission> {
        let mut submission = self.load(key).await?;
        if submission.table.is_empty() {
            if let Some(station) = Station::from_label(key.station()) {
                if station.collects_table() {
                    submission.table = station.template();
                }
            }
        }
        Ok(submission)
    }

    /// Load by table object name, as returned by [`list`](Self::list).
    pub async fn load_file(&self, table_name: &str) -> StoreResult<Submission> {
        if !is_sanitized(table_name) || strip_table_extension(table_name).is_none() {
            return Err(StoreError::InvalidKey {
                reason: format!("not a submission file name: {}", table_name),
            });
        }
        self.load_names(table_name, &annotation_name_for(table_name))
            .await
    }

    /// Table file names, optionally restricted to a name prefix.
    pub async fn list(&self, prefix: Option<&str>) -> StoreResult<Vec<String>> {
        let mut filter = ListingFilter::tables();
        if let Some(prefix) = prefix {
            filter = filter.with_prefix(prefix);
        }
        self.store.list("", &filter).await
    }

    /// Table file names of one group.
    pub async fn list_group(&self, group: &str) -> StoreResult<Vec<String>> {
        let prefix = format!("{}_", sanitize(group));
        self.list(Some(&prefix)).await
    }

    /// Overview of every stored submission, sorted by file name.
    pub async fn summary(&self) -> StoreResult<Vec<SubmissionSummary>> {
        let files = self.list(None).await?;
        let mut summaries = Vec::with_capacity(files.len());

        for file in files {
            let submission = self
                .load_names(&file, &annotation_name_for(&file))
                .await?;
            let (group, station, known_station) = split_table_name(&file);
            summaries.push(SubmissionSummary {
                rows: submission.table.row_count(),
                annotation: submission.annotation,
                file,
                group,
                station,
                known_station,
            });
        }

        Ok(summaries)
    }

    async fn load_names(&self, table_name: &str, annotation_name: &str) -> StoreResult<Submission> {
        let table = match self.store.read(table_name).await {
            Ok(bytes) => decode_table(&bytes),
            Err(StoreError::NotFound { .. }) => {
                debug!(file = %table_name, "no stored table");
                Table::default()
            }
            Err(e) => return Err(e),
        };

        let annotation = match self.store.read(annotation_name).await {
            Ok(bytes) => decode_annotation(&bytes),
            Err(StoreError::NotFound { .. }) => {
                debug!(file = %annotation_name, "no stored annotation");
                String::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Submission { table, annotation })
    }
}
