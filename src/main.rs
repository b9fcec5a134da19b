use anyhow::{Context, Result};
use tracing::{info, warn};

use tsearch::pipeline::{SearchOptions, Searcher};
use tsearch::source::FileSource;
use tsearch::{cli, config, logging};

fn main() -> Result<()> {
    let cli_opts = cli::parse();
    logging::init_logging(cli_opts.log_json);

    let cfg = config::load_config(cli_opts.config_path.as_deref())?;
    let workers = cli_opts.worker_count();

    info!(
        "Searching for word '{}' in '{}' using {} threads",
        cli_opts.word,
        cli_opts.input.display(),
        workers
    );

    let source = FileSource::new(&cli_opts.input)
        .with_context(|| format!("Failed to open file '{}'", cli_opts.input.display()))?;
    let searcher = Searcher::new(SearchOptions::from(&cfg));
    let result = searcher
        .search(&source, &cli_opts.word, workers)
        .context("Failed to return a result")?;

    for report in &result.workers {
        if let Some(failure) = &report.failure {
            warn!(
                "worker {} ({}..{}) incomplete, kept {} occurrences: {failure}",
                report.id, report.start, report.end, report.occurrences
            );
        }
    }

    if cli_opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        info!(
            "Found {} occurrences in {} ms",
            result.occurrences,
            result.elapsed_ms()
        );
    }

    Ok(())
}
