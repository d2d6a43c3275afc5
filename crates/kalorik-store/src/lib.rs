//! Submission storage for the Kalorik classroom tool.
//!
//! Students' measurement tables and written analyses are persisted as files in
//! a Git repository through its contents API. This crate provides:
//!
//! - HTTP client for the contents API with token auth
//! - Version-checked writes with a single retry on conflict
//! - CSV/text codec for submissions
//! - Filtered, sorted listing with bounded retry
//! - Station catalog and reviewer overview
//!
//! # Quick Start
//!
//! ```no_run
//! use kalorik_store::{ContentsClient, Submission, SubmissionKey, SubmissionService};
//!
//! # async fn example() -> Result<(), kalorik_store::StoreError> {
//! let service = SubmissionService::new(ContentsClient::from_env()?);
//! let key = SubmissionKey::new("Gruppe 1", "A – Wärmeleitung")?;
//!
//! let mut submission = service.load_or_template(&key).await?;
//! submission.annotation = "Kupfer leitet am besten.".to_string();
//! let receipt = service.save(&key, &submission).await?;
//! println!("saved {}", receipt.table_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! The store's version token is the only coordination. It is read right
//! before each put; a conflicting put is retried once after re-reading it.
//! Table and annotation are separate objects and are not written atomically.
//!
//! # Configuration
//!
//! See [`config`] for the file layout and environment variables.

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod naming;
pub mod retry;
pub mod stations;
pub mod store;
pub mod submission;
pub mod summary;
pub mod types;

// Re-export main types
pub use auth::TokenProvider;
pub use client::{ContentsClient, STORE_USER_AGENT};
pub use codec::{
    decode_annotation, decode_table, encode_annotation, encode_table, try_decode_table, CellValue,
    Submission, Table, UTF8_BOM,
};
pub use config::{AppConfig, ReviewConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use listing::ListingFilter;
pub use memory::MemoryStore;
pub use naming::{
    sanitize, strip_table_extension, SubmissionKey, ANNOTATION_SUFFIX, TABLE_EXTENSION,
};
pub use retry::{ConflictRetry, TransientRetry, MAX_WRITE_ATTEMPTS};
pub use stations::{Station, StationKind};
pub use store::ContentStore;
pub use submission::{SaveReceipt, SubmissionService};
pub use summary::{split_table_name, SubmissionSummary};
pub use types::{Committer, DirEntry, EntryKind, VersionToken};
