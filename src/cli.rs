use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliOptions {
    /// Text file to search
    pub input: PathBuf,

    /// Word to count (case-sensitive, whole words only)
    pub word: String,

    /// Number of worker threads (0-255); anything else means sequential
    #[arg(allow_hyphen_values = true, allow_negative_numbers = true)]
    pub threads: String,

    /// Optional path to config file (YAML)
    #[arg(long)]
    pub config_path: Option<PathBuf>,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl CliOptions {
    pub fn worker_count(&self) -> u8 {
        parse_worker_count(&self.threads)
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}

/// Malformed or out-of-range values become 0, i.e. no parallelism.
pub fn parse_worker_count(value: &str) -> u8 {
    value.parse::<u8>().unwrap_or(0)
}
