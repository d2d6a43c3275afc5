//! Reviewer overview of all stored submissions.

use serde::{Deserialize, Serialize};

use crate::naming::strip_table_extension;
use crate::stations::Station;

/// One row of the reviewer overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    /// Table object name.
    pub file: String,

    /// Group part of the name (sanitized form).
    pub group: String,

    /// Station part of the name (sanitized form).
    pub station: String,

    /// Catalog station, when the name ends in a known station label.
    #[serde(default)]
    pub known_station: Option<Station>,

    /// Number of table rows.
    pub rows: usize,

    /// Annotation text; empty when none was saved.
    pub annotation: String,
}

/// Split a table object name into (group, station, catalog station).
///
/// Known station labels are matched as suffix so group ids containing `_`
/// survive; otherwise the name is split at its first `_`.
pub fn split_table_name(name: &str) -> (String, String, Option<Station>) {
    let stem = strip_table_extension(name).unwrap_or(name);

    for station in Station::all() {
        let label = station.sanitized_label();
        if let Some(group) = stem
            .strip_suffix(label.as_str())
            .and_then(|rest| rest.strip_suffix('_'))
        {
            if !group.is_empty() {
                return (group.to_string(), label, Some(station));
            }
        }
    }

    match stem.split_once('_') {
        Some((group, station)) => (group.to_string(), station.to_string(), None),
        None => (stem.to_string(), String::new(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_station_with_underscored_group() {
        let (group, station, known) = split_table_name("Gruppe_1_A_-_W_rmeleitung.csv");
        assert_eq!(group, "Gruppe_1");
        assert_eq!(station, "A_-_W_rmeleitung");
        assert_eq!(known, Some(Station::Conduction));
    }

    #[test]
    fn test_unknown_station_splits_at_first_underscore() {
        let (group, station, known) = split_table_name("7b_Zusatzversuch.csv");
        assert_eq!(group, "7b");
        assert_eq!(station, "Zusatzversuch");
        assert_eq!(known, None);
    }

    #[test]
    fn test_no_underscore() {
        let (group, station, _) = split_table_name("einzeln.csv");
        assert_eq!(group, "einzeln");
        assert!(station.is_empty());
    }
}
