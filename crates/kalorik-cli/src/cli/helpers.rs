use std::path::Path;

use anyhow::{Context, Result};
use kalorik_store::{
    encode_table, AppConfig, ContentsClient, ReviewConfig, Station, Submission, SubmissionKey,
    SubmissionService, UTF8_BOM,
};
use tracing::{debug, warn};

use super::args::{KeyArgs, OutputFormat};

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = AppConfig::load(path)?;
    debug!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        branch = %config.github.branch,
        base_path = %config.github.base_path,
        "configuration loaded"
    );
    Ok(config)
}

pub fn open_service(config: &AppConfig) -> Result<SubmissionService<ContentsClient>> {
    let client = ContentsClient::new(config.github.clone())?;
    if !client.is_authenticated() {
        warn!("no GITHUB_TOKEN configured; writes will be rejected by the store");
    }
    Ok(SubmissionService::new(client))
}

/// Submission key with the station normalized to its catalog label.
pub fn submission_key(args: &KeyArgs) -> Result<SubmissionKey> {
    let station = match Station::from_label(&args.station) {
        Some(station) => station.label().to_string(),
        None => {
            warn!(station = %args.station, "station is not in the catalog");
            args.station.clone()
        }
    };
    Ok(SubmissionKey::new(args.group.as_str(), station)?)
}

/// Reviewer commands only run with the configured passphrase.
pub fn check_passphrase(review: &ReviewConfig, supplied: &str) -> bool {
    if !review.is_configured() {
        warn!("no reviewer passphrase configured (KALORIK_REVIEW_PASSPHRASE)");
        return false;
    }
    review.verify(supplied)
}

pub fn render_submission(submission: &Submission, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => {
            let bytes = encode_table(&submission.table)?;
            let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
            let mut out = String::from_utf8(body.to_vec()).context("table is not UTF-8")?;
            if !submission.annotation.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&submission.annotation);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(submission)?;
            out.push('\n');
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalorik_store::{CellValue, Table};

    fn key(group: &str, station: &str) -> KeyArgs {
        KeyArgs {
            group: group.to_string(),
            station: station.to_string(),
        }
    }

    #[test]
    fn test_station_letter_is_expanded() {
        let key = submission_key(&key("Gruppe 1", "a")).unwrap();
        assert_eq!(key.table_name(), "Gruppe_1_A_-_W_rmeleitung.csv");
    }

    #[test]
    fn test_unknown_station_kept_verbatim() {
        let key = submission_key(&key("g", "Extra")).unwrap();
        assert_eq!(key.table_name(), "g_Extra.csv");
    }

    #[test]
    fn test_blank_group_rejected() {
        assert!(submission_key(&key("  ", "A")).is_err());
    }

    #[test]
    fn test_passphrase_gate() {
        let unset = ReviewConfig::default();
        assert!(!check_passphrase(&unset, ""));
        assert!(!check_passphrase(&unset, "x"));

        let set = ReviewConfig {
            passphrase: Some("geheim".to_string()),
        };
        assert!(check_passphrase(&set, "geheim"));
        assert!(!check_passphrase(&set, "Geheim"));
    }

    #[test]
    fn test_render_csv_without_bom() {
        let table = Table::new(["x", "y"])
            .with_row(vec![CellValue::Number(1.0), CellValue::Text("a".into())])
            .unwrap();
        let out = render_submission(&Submission::new(table, "Text"), OutputFormat::Csv).unwrap();
        assert_eq!(out, "x,y\n1,a\n\nText\n");
    }

    #[test]
    fn test_render_json() {
        let out = render_submission(&Submission::default(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["annotation"], "");
        assert!(value["table"]["columns"].as_array().unwrap().is_empty());
    }
}
