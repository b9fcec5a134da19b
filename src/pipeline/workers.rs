//! # Pipeline Workers
//!
//! Per-chunk scanning. Each worker opens its own reader, reads its window in
//! bounded blocks and leaves its count on the task it owns.

use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use tracing::Level;

use crate::chunk::{ReadWindow, ScanChunk, read_window};
use crate::error::WorkerFailure;
use crate::logging::SearchLogger;
use crate::matcher::{SearchWord, StreamMatcher};
use crate::source::{SourceReader, TextSource};

/// Work item for one worker. Only the owning worker writes `local_count` and
/// `failure`; the orchestrator reads them after the join.
#[derive(Debug, Clone)]
pub struct ChunkTask {
    pub chunk: ScanChunk,
    pub word_len: usize,
    pub local_count: u64,
    pub failure: Option<WorkerFailure>,
}

impl ChunkTask {
    pub fn new(chunk: ScanChunk, word_len: usize) -> Self {
        Self {
            chunk,
            word_len,
            local_count: 0,
            failure: None,
        }
    }
}

/// Read-only inputs shared by every worker of a run.
#[derive(Clone, Copy)]
pub struct WorkerContext<'a> {
    pub source: &'a dyn TextSource,
    pub word: &'a SearchWord,
    pub total_len: u64,
    pub block_size: usize,
    pub logger: &'a dyn SearchLogger,
}

/// Scan one chunk. Failures are logged and recorded on the task, never
/// returned: a broken worker only lowers the total.
pub fn run_worker(task: &mut ChunkTask, ctx: &WorkerContext<'_>) {
    let id = task.chunk.id;
    match scan_chunk(task, ctx) {
        Ok(count) => {
            task.local_count = count;
            ctx.logger.log(
                Level::DEBUG,
                &format!(
                    "worker {id}: range {}..{} occurrences={count}",
                    task.chunk.start, task.chunk.end
                ),
            );
        }
        Err(failure) => {
            task.local_count = 0;
            ctx.logger.log(Level::ERROR, &format!("worker {id}: {failure}"));
            task.failure = Some(failure);
        }
    }
}

fn scan_chunk(task: &ChunkTask, ctx: &WorkerContext<'_>) -> Result<u64, WorkerFailure> {
    let window = read_window(&task.chunk, task.word_len);
    let mut reader = ctx
        .source
        .open()
        .map_err(|err| WorkerFailure::Open(err.to_string()))?;
    reader
        .seek(SeekFrom::Start(context_start(&window)))
        .map_err(|err| WorkerFailure::Seek(err.to_string()))?;
    stream_window(
        reader.as_mut(),
        window,
        ctx.total_len,
        ctx.word.as_bytes(),
        ctx.block_size,
    )
    .map_err(|interrupted| WorkerFailure::Read(interrupted.error.to_string()))
}

/// Offset a reader must be positioned at before [`stream_window`]: one byte
/// early when there is a byte before the window to use as boundary context.
pub(crate) fn context_start(window: &ReadWindow) -> u64 {
    window.start.saturating_sub(1)
}

/// A read error part-way through a window. `confirmed` holds the matches
/// already decided before the error.
#[derive(Debug)]
pub(crate) struct ScanInterrupted {
    pub(crate) confirmed: u64,
    pub(crate) error: io::Error,
}

/// Count matches lying entirely inside `window`, reading it in blocks of at
/// most `block_size` bytes. The reader must sit at [`context_start`].
pub(crate) fn stream_window(
    reader: &mut dyn SourceReader,
    window: ReadWindow,
    total_len: u64,
    word: &[u8],
    block_size: usize,
) -> Result<u64, ScanInterrupted> {
    let leading = if window.start > 0 {
        read_byte(reader).map_err(|error| ScanInterrupted {
            confirmed: 0,
            error,
        })?
    } else {
        None
    };

    let mut matcher = StreamMatcher::new(word, leading);
    let mut buf = vec![0u8; block_size.max(1)];
    let mut remaining = window.len();

    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let n = match reader.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(error) => {
                return Err(ScanInterrupted {
                    confirmed: matcher.confirmed(),
                    error,
                });
            }
        };
        matcher.feed(&buf[..n]);
        remaining -= n as u64;
    }

    let trailing = if remaining == 0 && window.end < total_len {
        match read_byte(reader) {
            Ok(byte) => byte,
            Err(error) => {
                return Err(ScanInterrupted {
                    confirmed: matcher.confirmed(),
                    error,
                });
            }
        }
    } else {
        None
    };

    Ok(matcher.finish(trailing))
}

fn read_byte(reader: &mut dyn SourceReader) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::plan_chunks;
    use crate::logging::TracingLogger;
    use crate::matcher::count_occurrences;
    use crate::source::{MemorySource, SourceError};

    fn run_all(text: &[u8], word: &str, workers: u64, block_size: usize) -> Vec<ChunkTask> {
        let source = MemorySource::new(text.to_vec());
        let (word, _) = SearchWord::new(word).expect("word");
        let logger = TracingLogger;
        let ctx = WorkerContext {
            source: &source,
            word: &word,
            total_len: text.len() as u64,
            block_size,
            logger: &logger,
        };
        let mut tasks: Vec<ChunkTask> = plan_chunks(text.len() as u64, workers)
            .into_iter()
            .map(|chunk| ChunkTask::new(chunk, word.len()))
            .collect();
        for task in &mut tasks {
            run_worker(task, &ctx);
        }
        tasks
    }

    fn total(tasks: &[ChunkTask]) -> u64 {
        tasks.iter().map(|t| t.local_count).sum()
    }

    #[test]
    fn straddling_match_is_counted_by_one_worker() {
        // boundary at 7 cuts "ERROR" in half
        let text = b"abcd ERROR xyz";
        let tasks = run_all(text, "ERROR", 2, 4096);
        assert_eq!(tasks[0].chunk.end, 7);
        assert_eq!(tasks[0].local_count, 0);
        assert_eq!(tasks[1].local_count, 1);
    }

    #[test]
    fn chunk_edges_respect_word_boundaries() {
        // boundary at 7 falls right after the "cat" that starts "catalog"
        let text = b"cat catalog xy";
        let tasks = run_all(text, "cat", 2, 4096);
        assert_eq!(tasks[0].chunk.end, 7);
        assert_eq!(total(&tasks), 1);

        let text = b"xbob cat bobcat";
        for workers in 1..=text.len() as u64 {
            assert_eq!(total(&run_all(text, "cat", workers, 4096)), 1);
        }
    }

    #[test]
    fn any_worker_count_and_block_size_agree_with_plain_count() {
        let text = b"one two one,one;ONE one1 one\tone two-one";
        let expected = count_occurrences(text, b"one");
        assert_eq!(expected, 6);
        for workers in 1..=text.len() as u64 + 3 {
            for block_size in [1usize, 2, 3, 7, 4096] {
                let tasks = run_all(text, "one", workers, block_size);
                assert_eq!(total(&tasks), expected, "workers={workers} block={block_size}");
            }
        }
    }

    #[test]
    fn word_longer_than_chunk_is_still_found() {
        let text = b"  elephant  ";
        for workers in 1..=12 {
            assert_eq!(total(&run_all(text, "elephant", workers, 3)), 1);
        }
    }

    struct BrokenSource;

    impl TextSource for BrokenSource {
        fn len(&self) -> Result<u64, SourceError> {
            Ok(10)
        }

        fn open(&self) -> Result<Box<dyn SourceReader>, SourceError> {
            Err(SourceError::Io(io::Error::new(ErrorKind::PermissionDenied, "denied")))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn open_failure_leaves_zero_and_records_failure() {
        let (word, _) = SearchWord::new("x").expect("word");
        let logger = TracingLogger;
        let ctx = WorkerContext {
            source: &BrokenSource,
            word: &word,
            total_len: 10,
            block_size: 4,
            logger: &logger,
        };
        let mut task = ChunkTask::new(ScanChunk { id: 1, start: 5, end: 10 }, 1);
        run_worker(&mut task, &ctx);
        assert_eq!(task.local_count, 0);
        assert!(matches!(task.failure, Some(WorkerFailure::Open(_))));
    }

    #[test]
    fn stream_window_reads_context_bytes() {
        let source = MemorySource::new(b"xcat cat".to_vec());
        let mut reader = source.open().expect("reader");
        let window = ReadWindow { start: 1, end: 4 };
        reader
            .seek(SeekFrom::Start(context_start(&window)))
            .expect("seek");
        assert_eq!(stream_window(reader.as_mut(), window, 8, b"cat", 2).expect("scan"), 0);

        let mut reader = source.open().expect("reader");
        let window = ReadWindow { start: 5, end: 8 };
        reader
            .seek(SeekFrom::Start(context_start(&window)))
            .expect("seek");
        assert_eq!(stream_window(reader.as_mut(), window, 8, b"cat", 2).expect("scan"), 1);

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).expect("read");
        assert!(rest.is_empty());
    }
}
