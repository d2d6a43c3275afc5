use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kalorik",
    version,
    about = "Save and review Kalorik station submissions stored in a Git repository"
)]
pub struct Cli {
    /// YAML config file; fields it leaves out come from the environment
    #[arg(long, global = true, env = "KALORIK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a group's table and written analysis for one station
    Save(SaveArgs),
    /// Print a group's submission (or the station template if none is stored)
    Load(LoadArgs),
    /// Reviewer: list stored submission files
    List(ListArgs),
    /// Reviewer: overview of every submission
    Summary(SummaryArgs),
    /// Reviewer: print one submission by file name
    Show(ShowArgs),
    /// List the stations and the table each one collects
    Stations,
}

#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// Group id, e.g. "Gruppe 1"
    #[arg(long, short = 'g')]
    pub group: String,

    /// Station label, letter or file-name form, e.g. "A"
    #[arg(long, short = 's')]
    pub station: String,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Measurement table as CSV
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Text file with the written analysis
    #[arg(long, conflicts_with = "text")]
    pub annotation: Option<PathBuf>,

    /// Written analysis given inline
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoadArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ReviewerArgs {
    /// Shared reviewer passphrase
    #[arg(long, env = "KALORIK_PASSPHRASE", hide_env_values = true)]
    pub passphrase: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub reviewer: ReviewerArgs,

    /// Only files whose name starts with this prefix
    #[arg(long, conflicts_with = "group")]
    pub prefix: Option<String>,

    /// Only files of this group
    #[arg(long)]
    pub group: Option<String>,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub reviewer: ReviewerArgs,

    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    pub format: SummaryFormat,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Table file name as printed by `list`
    pub file: String,

    #[command(flatten)]
    pub reviewer: ReviewerArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_save() {
        let cli = Cli::try_parse_from([
            "kalorik", "save", "-g", "Gruppe 1", "-s", "A", "--table", "a.csv", "--text", "warm",
        ])
        .unwrap();
        match cli.cmd {
            Command::Save(args) => {
                assert_eq!(args.key.group, "Gruppe 1");
                assert_eq!(args.key.station, "A");
                assert_eq!(args.text.as_deref(), Some("warm"));
                assert!(args.annotation.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_annotation_and_text_conflict() {
        let result = Cli::try_parse_from([
            "kalorik", "save", "-g", "g", "-s", "A", "--annotation", "a.txt", "--text", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kalorik", "stations", "-v", "--config", "k.yaml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("k.yaml")));
    }
}
