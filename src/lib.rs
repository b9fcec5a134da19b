//! Whole-word occurrence counting over large text files, sequentially or
//! with one worker thread per byte-range chunk.

pub mod chunk;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod source;

pub use error::{SearchError, WorkerFailure};
pub use pipeline::{SearchOptions, SearchResult, Searcher, Strategy, search};
