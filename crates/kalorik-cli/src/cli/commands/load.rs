use std::path::Path;

use anyhow::{Context, Result};

use super::super::args::LoadArgs;
use super::super::helpers::{load_config, open_service, render_submission, submission_key};
use crate::exit_codes::SUCCESS;

pub async fn run(args: LoadArgs, config_path: Option<&Path>) -> Result<i32> {
    let key = submission_key(&args.key)?;
    let config = load_config(config_path)?;
    let service = open_service(&config)?;

    let submission = service
        .load_or_template(&key)
        .await
        .with_context(|| format!("loading {}", key))?;

    print!("{}", render_submission(&submission, args.format)?);
    Ok(SUCCESS)
}
