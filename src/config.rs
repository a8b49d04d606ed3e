use clap::Parser;
use std::path::PathBuf;

use crate::columns::MatchMode;

pub const DEFAULT_INPUT_DIR: &str = "dados_cidades";
pub const DEFAULT_OUTPUT_FILE: &str = "output/dados_processados/merged_cidades.csv";

#[derive(Parser, Debug)]
#[command(
    name = "merge-cidades",
    about = "Merge per-city weather CSV files into one normalized table",
    version
)]
pub struct Cli {
    /// Folder holding the per-city `*.csv` files
    #[arg(default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Merged CSV to write; parent folders are created
    #[arg(default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Only exact, `base_` prefix or `_base` suffix names resolve a target
    #[arg(long)]
    pub strict_match: bool,

    /// Also save the run summary as JSON
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// Everything a merge run needs; built from CLI args or directly in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub match_mode: MatchMode,
    /// Where to write the JSON run summary, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            match_mode: MatchMode::Permissive,
            report: None,
        }
    }
}

impl From<Cli> for MergeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input_dir: cli.input_dir,
            output_file: cli.output_file,
            match_mode: if cli.strict_match {
                MatchMode::Strict
            } else {
                MatchMode::Permissive
            },
            report: cli.report,
        }
    }
}

impl MergeConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_file: output_file.into(),
            ..Self::default()
        }
    }

    /// Parse `[INPUT_DIR] [OUTPUT_FILE] [--strict-match] [--report PATH]`,
    /// program name already stripped.
    pub fn from_args<I>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = String>,
    {
        let argv = std::iter::once("merge-cidades".to_string()).chain(args);
        Cli::try_parse_from(argv).map(Self::from)
    }
}
