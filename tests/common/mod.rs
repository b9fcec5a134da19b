//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use tsearch::pipeline::{SearchOptions, SearchResult, Searcher};
use tsearch::source::FileSource;

/// Write `bytes` to a fresh temp file. Keep the `TempDir` alive while the
/// path is in use.
pub fn write_input(bytes: &[u8]) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let input_path = temp_dir.path().join("input.txt");
    fs::write(&input_path, bytes).expect("write input");
    (temp_dir, input_path)
}

/// Options that force the parallel path for anything but tiny inputs and
/// use small blocks so block seams are exercised too.
pub fn small_block_options() -> SearchOptions {
    SearchOptions {
        block_size: 16,
        sequential_threshold: 0,
    }
}

pub fn search_bytes(bytes: &[u8], word: &str, workers: u8, options: SearchOptions) -> SearchResult {
    let (_dir, path) = write_input(bytes);
    let source = FileSource::new(&path).expect("source");
    Searcher::new(options)
        .search(&source, word, workers)
        .expect("search")
}

/// `ERROR ` repeated up to `size` bytes, cut at a token boundary.
pub fn error_log(size: usize) -> Vec<u8> {
    let token = b"ERROR ";
    let mut bytes = Vec::with_capacity(size);
    while bytes.len() + token.len() <= size {
        bytes.extend_from_slice(token);
    }
    bytes
}
