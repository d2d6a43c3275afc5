use std::path::Path;

use anyhow::{Context, Result};
use kalorik_store::{try_decode_table, Submission, Table};
use tracing::info;

use super::super::args::SaveArgs;
use super::super::helpers::{load_config, open_service, submission_key};
use crate::exit_codes::SUCCESS;

pub async fn run(args: SaveArgs, config_path: Option<&Path>) -> Result<i32> {
    let key = submission_key(&args.key)?;
    let submission = read_submission(&args)?;

    let config = load_config(config_path)?;
    let service = open_service(&config)?;

    let receipt = service
        .save(&key, &submission)
        .await
        .with_context(|| format!("saving {}", key))?;

    info!(
        table = %receipt.table_name,
        annotation = %receipt.annotation_name,
        "submission saved"
    );
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(SUCCESS)
}

fn read_submission(args: &SaveArgs) -> Result<Submission> {
    let table = match &args.table {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            try_decode_table(&bytes).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Table::default(),
    };

    let annotation = match (&args.annotation, &args.text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, Some(text)) => text.clone(),
        (None, None) => String::new(),
    };

    Ok(Submission::new(table, annotation))
}
