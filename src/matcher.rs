//! # Matcher
//!
//! Whole-word, case-sensitive byte matching. A match only counts when the
//! bytes on either side of it are not ASCII alphanumeric (or do not exist).

use std::fmt;
use std::ops::Range;

use memchr::memchr;

use crate::error::SearchError;

/// Longest search word kept, in bytes. Longer words are truncated.
pub const MAX_WORD_LEN: usize = 127;

/// A validated search word: non-empty, at most [`MAX_WORD_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchWord(String);

impl SearchWord {
    /// Returns the word and whether it had to be truncated. Truncation cuts
    /// at the last UTF-8 character boundary at or below [`MAX_WORD_LEN`], so a
    /// multibyte word may end up a few bytes shorter than the limit.
    pub fn new(word: &str) -> Result<(Self, bool), SearchError> {
        if word.is_empty() {
            return Err(SearchError::EmptyWord);
        }
        if word.len() <= MAX_WORD_LEN {
            return Ok((Self(word.to_string()), false));
        }
        let mut cut = MAX_WORD_LEN;
        while !word.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            return Err(SearchError::EmptyWord);
        }
        Ok((Self(word[..cut].to_string()), true))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SearchWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Count whole-word occurrences of `word` in `text`.
pub fn count_occurrences(text: &[u8], word: &[u8]) -> u64 {
    count_within(text, 0..text.len(), word)
}

/// Count whole-word occurrences of `word` lying entirely inside `span`.
///
/// Bytes of `text` outside `span` are never matched against, but the byte
/// right before and right after a candidate are still consulted for the
/// boundary rule even when they fall outside `span`.
pub fn count_within(text: &[u8], span: Range<usize>, word: &[u8]) -> u64 {
    let word_len = word.len();
    if word_len == 0 || span.end > text.len() || span.start > span.end {
        return 0;
    }
    if span.end - span.start < word_len {
        return 0;
    }

    let last = span.end - word_len;
    let first = word[0];
    let mut count = 0u64;
    let mut pos = span.start;

    while pos <= last {
        let idx = match memchr(first, &text[pos..=last]) {
            Some(i) => pos + i,
            None => break,
        };
        if text[idx..idx + word_len] == *word {
            let before_ok = idx == 0 || !is_word_byte(text[idx - 1]);
            let after_ok = text.get(idx + word_len).is_none_or(|&b| !is_word_byte(b));
            if before_ok && after_ok {
                count += 1;
            }
        }
        pos = idx + 1;
    }

    count
}

/// Block-wise form of [`count_within`].
///
/// Blocks are fed in order; between blocks only the bytes still needed by
/// the next candidate (plus one byte of look-behind) are kept, so memory is
/// bounded by the block size plus the word length.
pub struct StreamMatcher<'w> {
    word: &'w [u8],
    carry: Vec<u8>,
    // index in `carry` of the next candidate start; bytes before it are context
    scan_from: usize,
    count: u64,
}

impl<'w> StreamMatcher<'w> {
    /// `leading` is the byte just before the stream, if there is one.
    pub fn new(word: &'w [u8], leading: Option<u8>) -> Self {
        let carry: Vec<u8> = leading.into_iter().collect();
        let scan_from = carry.len();
        Self {
            word,
            carry,
            scan_from,
            count: 0,
        }
    }

    pub fn feed(&mut self, block: &[u8]) {
        let word_len = self.word.len();
        if word_len == 0 || block.is_empty() {
            return;
        }
        self.carry.extend_from_slice(block);

        // the final buffered byte is held back as look-ahead for the candidate
        // ending right before it
        if self.carry.len() < self.scan_from + word_len + 1 {
            return;
        }
        let scan_end = self.carry.len() - 1;
        self.count += count_within(&self.carry, self.scan_from..scan_end, self.word);

        let next = scan_end + 1 - word_len;
        let keep_from = next - 1;
        self.carry.drain(..keep_from);
        self.scan_from = next - keep_from;
    }

    /// Matches already decided; later input can no longer change them.
    pub fn confirmed(&self) -> u64 {
        self.count
    }

    /// `trailing` is the byte just after the stream, if there is one.
    pub fn finish(mut self, trailing: Option<u8>) -> u64 {
        let end = self.carry.len();
        if let Some(byte) = trailing {
            self.carry.push(byte);
        }
        self.count + count_within(&self.carry, self.scan_from..end, self.word)
    }
}
