//! # Pipeline Module
//!
//! Orchestrates a search: validates the inputs, picks the sequential or
//! parallel strategy, fork-joins the chunk workers and folds their partial
//! counts into a [`SearchResult`].

pub mod workers;

use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};
use tracing::Level;

use crate::chunk::{ReadWindow, plan_chunks};
use crate::config::Config;
use crate::error::{SearchError, WorkerFailure};
use crate::logging::{SearchLogger, TracingLogger};
use crate::matcher::SearchWord;
use crate::source::{FileSource, TextSource};

use workers::{ChunkTask, WorkerContext, run_worker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Sequential,
    Parallel,
}

/// Tunables for a [`Searcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub block_size: usize,
    pub sequential_threshold: u64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SearchOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            block_size: cfg.block_size.max(1),
            sequential_threshold: cfg.sequential_threshold,
        }
    }
}

/// Outcome of one parallel worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub id: u64,
    pub start: u64,
    pub end: u64,
    pub occurrences: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<WorkerFailure>,
}

impl From<&ChunkTask> for WorkerReport {
    fn from(task: &ChunkTask) -> Self {
        Self {
            id: task.chunk.id,
            start: task.chunk.start,
            end: task.chunk.end,
            occurrences: task.local_count,
            failure: task.failure.clone(),
        }
    }
}

/// Final answer of a search, owned by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub word: String,
    pub occurrences: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub strategy: Strategy,
    pub file_size: u64,
    pub workers_requested: u8,
    pub workers_launched: usize,
    /// One entry per planned chunk. A sequential scan only reports an entry
    /// when it was cut short.
    pub workers: Vec<WorkerReport>,
}

impl SearchResult {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    pub fn failed_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.failure.is_some()).count()
    }

    /// True when every planned worker contributed its count.
    pub fn is_complete(&self) -> bool {
        self.failed_workers() == 0
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Sequential for small sources or when no parallelism was requested.
pub fn select_strategy(total_len: u64, workers: u8, options: &SearchOptions) -> Strategy {
    if total_len < options.sequential_threshold || workers <= 1 {
        Strategy::Sequential
    } else {
        Strategy::Parallel
    }
}

struct ParallelOutcome {
    occurrences: u64,
    launched: usize,
    reports: Vec<WorkerReport>,
}

pub struct Searcher {
    options: SearchOptions,
    logger: Arc<dyn SearchLogger>,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            options,
            logger: Arc::new(TracingLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn SearchLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Count whole-word occurrences of `word` in `source`.
    ///
    /// Errors only when the search cannot start: an empty word, or a source
    /// that cannot be opened or sized. Later failures lower the count and
    /// show up in [`SearchResult::workers`] instead.
    pub fn search(
        &self,
        source: &dyn TextSource,
        word: &str,
        workers: u8,
    ) -> Result<SearchResult, SearchError> {
        let (word, truncated) = SearchWord::new(word)?;
        if truncated {
            self.logger.log(
                Level::WARN,
                &format!("search word truncated to {} bytes: '{word}'", word.len()),
            );
        }
        let start_time = Instant::now();
        drop(source.open()?);
        let total_len = source.len()?;
        let strategy = select_strategy(total_len, workers, &self.options);

        let (occurrences, launched, reports) = match strategy {
            Strategy::Sequential => {
                self.logger.log(Level::INFO, "Using single threaded search");
                let (occurrences, failure) = self.scan_sequential(source, &word, total_len);
                let reports = match failure {
                    Some(failure) => {
                        self.logger.log(
                            Level::ERROR,
                            &format!("sequential scan stopped early: {failure}"),
                        );
                        vec![WorkerReport {
                            id: 0,
                            start: 0,
                            end: total_len,
                            occurrences,
                            failure: Some(failure),
                        }]
                    }
                    None => Vec::new(),
                };
                (occurrences, 0, reports)
            }
            Strategy::Parallel => {
                self.logger.log(
                    Level::INFO,
                    &format!("Using parallel search with {workers} workers over {total_len} bytes"),
                );
                let outcome = self.scan_parallel(source, &word, total_len, workers);
                (outcome.occurrences, outcome.launched, outcome.reports)
            }
        };

        let result = SearchResult {
            word: word.to_string(),
            occurrences,
            elapsed: start_time.elapsed(),
            strategy,
            file_size: total_len,
            workers_requested: workers,
            workers_launched: launched,
            workers: reports,
        };

        let failed = result.failed_workers();
        if failed > 0 {
            self.logger.log(
                Level::WARN,
                &format!(
                    "{failed} of {} workers failed; occurrence count is incomplete",
                    result.workers.len()
                ),
            );
        }
        self.logger.log(
            Level::INFO,
            &format!(
                "search finished source={} occurrences={} elapsed_ms={}",
                source.describe(),
                result.occurrences,
                result.elapsed_ms()
            ),
        );

        Ok(result)
    }

    /// Whole-source scan on the calling thread. A failure keeps the matches
    /// confirmed before it.
    fn scan_sequential(
        &self,
        source: &dyn TextSource,
        word: &SearchWord,
        total_len: u64,
    ) -> (u64, Option<WorkerFailure>) {
        let mut reader = match source.open() {
            Ok(reader) => reader,
            Err(err) => return (0, Some(WorkerFailure::Open(err.to_string()))),
        };
        if let Err(err) = reader.seek(SeekFrom::Start(0)) {
            return (0, Some(WorkerFailure::Seek(err.to_string())));
        }
        let window = ReadWindow {
            start: 0,
            end: total_len,
        };
        match workers::stream_window(
            reader.as_mut(),
            window,
            total_len,
            word.as_bytes(),
            self.options.block_size,
        ) {
            Ok(count) => (count, None),
            Err(interrupted) => (
                interrupted.confirmed,
                Some(WorkerFailure::Read(interrupted.error.to_string())),
            ),
        }
    }

    fn scan_parallel(
        &self,
        source: &dyn TextSource,
        word: &SearchWord,
        total_len: u64,
        workers: u8,
    ) -> ParallelOutcome {
        let mut tasks: Vec<ChunkTask> = plan_chunks(total_len, u64::from(workers))
            .into_iter()
            .map(|chunk| ChunkTask::new(chunk, word.len()))
            .collect();

        let ctx = WorkerContext {
            source,
            word,
            total_len,
            block_size: self.options.block_size,
            logger: self.logger.as_ref(),
        };

        // the scope joins every launched worker before `tasks` is read again,
        // including after a failed launch
        let (launched, panicked) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(tasks.len());
            for task in tasks.iter_mut() {
                let id = task.chunk.id;
                let ctx = &ctx;
                let spawned = thread::Builder::new()
                    .name(format!("tsearch-worker-{id}"))
                    .spawn_scoped(scope, move || run_worker(task, ctx));
                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(err) => {
                        self.logger
                            .log(Level::ERROR, &format!("Failed to create worker {id}: {err}"));
                        break;
                    }
                }
            }

            let launched = handles.len();
            let mut panicked = Vec::new();
            for (id, handle) in handles {
                if handle.join().is_err() {
                    self.logger.log(Level::ERROR, &format!("worker {id} panicked"));
                    panicked.push(id);
                }
            }
            (launched, panicked)
        });

        for task in &mut tasks[launched..] {
            task.failure = Some(WorkerFailure::NotLaunched);
        }
        for task in tasks.iter_mut().filter(|t| panicked.contains(&t.chunk.id)) {
            task.local_count = 0;
            task.failure = Some(WorkerFailure::Panicked);
        }

        ParallelOutcome {
            occurrences: tasks.iter().map(|t| t.local_count).sum(),
            launched,
            reports: tasks.iter().map(WorkerReport::from).collect(),
        }
    }
}

/// Search the file at `path` with default options and `tracing` logging.
pub fn search(path: &Path, word: &str, workers: u8) -> Result<SearchResult, SearchError> {
    let source = FileSource::new(path)?;
    Searcher::new(SearchOptions::default()).search(&source, word, workers)
}
