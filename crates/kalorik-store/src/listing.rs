//! Listing filters for submission discovery.

use std::collections::BTreeSet;

use crate::naming::TABLE_EXTENSION;
use crate::types::DirEntry;

/// Which directory entries a listing returns.
///
/// Only file entries ever match. Extensions compare case-insensitively,
/// prefixes exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    extension: Option<String>,
    prefix: Option<String>,
}

impl ListingFilter {
    /// Match every file.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match result tables.
    pub fn tables() -> Self {
        Self::all().with_extension(TABLE_EXTENSION)
    }

    /// Accepts `csv` as well as `.csv`.
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        let ext = extension.as_ref().trim_start_matches('.').to_ascii_lowercase();
        self.extension = (!ext.is_empty()).then(|| format!(".{}", ext));
        self
    }

    /// Empty prefixes are ignored.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn matches(&self, entry: &DirEntry) -> bool {
        if !entry.is_file() {
            return false;
        }
        if let Some(ext) = &self.extension {
            if !entry.name.to_lowercase().ends_with(ext.as_str()) {
                return false;
            }
        }
        if let Some(prefix) = &self.prefix {
            if !entry.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        true
    }

    /// Matching names, sorted lexicographically without duplicates.
    pub fn apply<I>(&self, entries: I) -> Vec<String>
    where
        I: IntoIterator<Item = DirEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .map(|entry| entry.name)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
