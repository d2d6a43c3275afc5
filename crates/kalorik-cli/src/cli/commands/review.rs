//! Reviewer commands. All of them require the shared passphrase.

use std::path::Path;

use anyhow::{Context, Result};
use kalorik_store::{AppConfig, SubmissionSummary};

use super::super::args::{ListArgs, ReviewerArgs, ShowArgs, SummaryArgs, SummaryFormat};
use super::super::helpers::{check_passphrase, load_config, open_service, render_submission};
use crate::exit_codes::{ACCESS_DENIED, SUCCESS};

const ANNOTATION_PREVIEW_CHARS: usize = 60;

fn unlocked(config: &AppConfig, reviewer: &ReviewerArgs) -> bool {
    if check_passphrase(&config.review, &reviewer.passphrase) {
        return true;
    }
    eprintln!("access denied: wrong reviewer passphrase");
    false
}

pub async fn list(args: ListArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = load_config(config_path)?;
    if !unlocked(&config, &args.reviewer) {
        return Ok(ACCESS_DENIED);
    }

    let service = open_service(&config)?;
    let files = match &args.group {
        Some(group) => service.list_group(group).await,
        None => service.list(args.prefix.as_deref()).await,
    }
    .context("listing submissions")?;

    for file in files {
        println!("{}", file);
    }
    Ok(SUCCESS)
}

pub async fn summary(args: SummaryArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = load_config(config_path)?;
    if !unlocked(&config, &args.reviewer) {
        return Ok(ACCESS_DENIED);
    }

    let service = open_service(&config)?;
    let summaries = service.summary().await.context("building summary")?;

    match args.format {
        SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        SummaryFormat::Text => {
            for line in summaries.iter().map(summary_line) {
                println!("{}", line);
            }
        }
    }
    Ok(SUCCESS)
}

pub async fn show(args: ShowArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = load_config(config_path)?;
    if !unlocked(&config, &args.reviewer) {
        return Ok(ACCESS_DENIED);
    }

    let service = open_service(&config)?;
    let submission = service
        .load_file(&args.file)
        .await
        .with_context(|| format!("loading {}", args.file))?;

    print!("{}", render_submission(&submission, args.format)?);
    Ok(SUCCESS)
}

fn summary_line(summary: &SubmissionSummary) -> String {
    let station = match summary.known_station {
        Some(station) => station.label().to_string(),
        None => summary.station.clone(),
    };
    let first_line = summary.annotation.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(ANNOTATION_PREVIEW_CHARS).collect();
    let truncated = first_line.chars().count() > ANNOTATION_PREVIEW_CHARS
        || summary.annotation.lines().nth(1).is_some();
    if truncated {
        preview.push('…');
    }

    format!("{}\t{}\t{} rows\t{}", summary.group, station, summary.rows, preview)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kalorik_store::Station;

    fn summary(annotation: &str, known: Option<Station>) -> SubmissionSummary {
        SubmissionSummary {
            file: "Gruppe_1_A_-_W_rmeleitung.csv".into(),
            group: "Gruppe_1".into(),
            station: "A_-_W_rmeleitung".into(),
            known_station: known,
            rows: 2,
            annotation: annotation.into(),
        }
    }

    #[test]
    fn test_summary_line_uses_catalog_label() {
        let line = summary_line(&summary("Kupfer", Some(Station::Conduction)));
        assert_eq!(line, "Gruppe_1\tA – Wärmeleitung\t2 rows\tKupfer");
    }

    #[test]
    fn test_summary_line_truncates_annotation() {
        let line = summary_line(&summary("erste Zeile\nzweite", None));
        assert!(line.starts_with("Gruppe_1\tA_-_W_rmeleitung\t"));
        assert!(line.ends_with("erste Zeile…"));
    }
}
