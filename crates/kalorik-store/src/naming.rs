//! Submission keys and the object names derived from them.
//!
//! A key `(group, station)` maps to `<sanitize(group)>_<sanitize(station)>.csv`
//! plus the `_auswertung.txt` sibling holding the annotation.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// Extension of result tables.
pub const TABLE_EXTENSION: &str = ".csv";

/// Suffix replacing [`TABLE_EXTENSION`] for the annotation object.
pub const ANNOTATION_SUFFIX: &str = "_auswertung.txt";

/// Map arbitrary text onto `[A-Za-z0-9_.-]`.
///
/// Surrounding whitespace is trimmed, inner whitespace becomes `_`, en and em
/// dashes become `-`, anything else outside the allowed set becomes `_`.
/// Case is preserved. The function is total and idempotent.
pub fn sanitize(input: &str) -> String {
    input
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' => '-',
            c if c.is_whitespace() => '_',
            c if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') => c,
            _ => '_',
        })
        .collect()
}

/// Whether `name` only uses characters [`sanitize`] can produce.
pub fn is_sanitized(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// `name` without its [`TABLE_EXTENSION`], compared case-insensitively as in
/// listings. `None` if the extension is missing.
pub fn strip_table_extension(name: &str) -> Option<&str> {
    let split = name.len().checked_sub(TABLE_EXTENSION.len())?;
    let (stem, extension) = (name.get(..split)?, name.get(split..)?);
    extension
        .eq_ignore_ascii_case(TABLE_EXTENSION)
        .then_some(stem)
}

/// Annotation object name belonging to a table object name.
pub fn annotation_name_for(table_name: &str) -> String {
    let stem = strip_table_extension(table_name).unwrap_or(table_name);
    format!("{}{}", stem, ANNOTATION_SUFFIX)
}

/// Identity of one submission: a student group at one station.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmissionKey {
    group: String,
    station: String,
}

impl SubmissionKey {
    /// Both parts must contain something besides whitespace.
    pub fn new(group: impl Into<String>, station: impl Into<String>) -> StoreResult<Self> {
        let group = group.into();
        let station = station.into();

        if group.trim().is_empty() {
            return Err(StoreError::InvalidKey {
                reason: "group id is empty".to_string(),
            });
        }
        if station.trim().is_empty() {
            return Err(StoreError::InvalidKey {
                reason: "station is empty".to_string(),
            });
        }

        Ok(Self { group, station })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn station(&self) -> &str {
        &self.station
    }

    /// Shared stem of both object names.
    pub fn stem(&self) -> String {
        format!("{}_{}", sanitize(&self.group), sanitize(&self.station))
    }

    /// Name of the CSV object holding the table.
    pub fn table_name(&self) -> String {
        format!("{}{}", self.stem(), TABLE_EXTENSION)
    }

    /// Name of the text object holding the annotation.
    pub fn annotation_name(&self) -> String {
        format!("{}{}", self.stem(), ANNOTATION_SUFFIX)
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.group, self.station)
    }
}
