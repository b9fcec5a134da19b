/// One worker's share of the source: the half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanChunk {
    pub id: u64,
    pub start: u64,
    pub end: u64,
}

impl ScanChunk {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Physical range a worker reads for a chunk. It may begin before the
/// chunk's logical start; it never extends past the chunk's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadWindow {
    pub start: u64,
    pub end: u64,
}

impl ReadWindow {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, total_len)` into `workers` contiguous chunks.
///
/// Every boundary sits at a multiple of `total_len / workers`; the last chunk
/// absorbs the division remainder. Returns no chunks for zero workers.
pub fn plan_chunks(total_len: u64, workers: u64) -> Vec<ScanChunk> {
    if workers == 0 {
        return Vec::new();
    }

    let chunk_size = total_len / workers;
    (0..workers)
        .map(|id| {
            let start = id * chunk_size;
            let end = if id == workers - 1 {
                total_len
            } else {
                (id + 1) * chunk_size
            };
            ScanChunk { id, start, end }
        })
        .collect()
}

/// Where a chunk's read begins so that a match whose first bytes belong to
/// the previous chunk is still seen.
///
/// Every chunk after the first re-reads the `word_len - 1` bytes before its
/// start, clamped at offset 0. A chunk therefore counts exactly the matches
/// that end inside `(start, end]`.
pub fn overlap_start(chunk_id: u64, start_pos: u64, word_len: usize) -> u64 {
    if chunk_id == 0 {
        return start_pos;
    }
    let overlap = (word_len as u64).saturating_sub(1);
    start_pos.saturating_sub(overlap)
}

pub fn read_window(chunk: &ScanChunk, word_len: usize) -> ReadWindow {
    ReadWindow {
        start: overlap_start(chunk.id, chunk.start, word_len),
        end: chunk.end,
    }
}
