//! Sliding-window chunking for span-limited capabilities
//!
//! Text is tokenized once into byte spans. Windows of `max_span` tokens start
//! at token 0 and advance by `max_span - overlap` until a window reaches the
//! last token. Each window is decoded by slicing the original text from the
//! start of its first token to the end of its last, so chunk text is always a
//! substring of the input.
//!
//! Input of at most `max_span` tokens (the empty string included) yields a
//! single chunk equal to the whole input.

use crate::error::GatewayError;
use llmsvc_common::config::ChunkingConfig;
use std::ops::Range;

/// Splits text into tokens, reported as byte ranges into the input
pub trait Tokenizer: Send + Sync {
    fn token_spans(&self, text: &str) -> Vec<Range<usize>>;
}

/// Whitespace-delimited tokens
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn token_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let mut start = None;

        for (i, c) in text.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some(s)) => {
                    spans.push(s..i);
                    start = None;
                }
                (false, None) => start = Some(i),
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push(s..text.len());
        }

        spans
    }
}

/// One window of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub sequence_index: usize,
    /// First token of the window (inclusive)
    pub token_start: usize,
    /// One past the last token of the window
    pub token_end: usize,
    pub text: String,
}

/// Validated window geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_span: usize,
    overlap: usize,
}

impl Chunker {
    /// Requires `overlap < max_span`
    pub fn new(max_span: usize, overlap: usize) -> Result<Self, GatewayError> {
        if max_span == 0 || overlap >= max_span {
            return Err(GatewayError::InvalidChunkParameters { max_span, overlap });
        }
        Ok(Self { max_span, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self, GatewayError> {
        Self::new(config.max_span, config.overlap)
    }

    pub fn max_span(&self) -> usize {
        self.max_span
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Lazily split `text` into overlapping windows
    pub fn split<'a>(&self, text: &'a str, tokenizer: &dyn Tokenizer) -> Chunks<'a> {
        Chunks {
            text,
            spans: tokenizer.token_spans(text),
            max_span: self.max_span,
            stride: self.max_span - self.overlap,
            next_start: 0,
            next_index: 0,
            done: false,
        }
    }
}

/// Iterator over the windows of one input
///
/// Cloning it restarts from the current position; a fresh [`Chunker::split`]
/// restarts from the beginning.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    text: &'a str,
    spans: Vec<Range<usize>>,
    max_span: usize,
    stride: usize,
    next_start: usize,
    next_index: usize,
    done: bool,
}

impl Chunks<'_> {
    /// Total tokens in the input
    pub fn token_count(&self) -> usize {
        self.spans.len()
    }
}

impl Iterator for Chunks<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.done {
            return None;
        }

        let total = self.spans.len();
        if total <= self.max_span {
            self.done = true;
            return Some(Chunk {
                sequence_index: 0,
                token_start: 0,
                token_end: total,
                text: self.text.to_string(),
            });
        }

        let start = self.next_start;
        let end = (start + self.max_span).min(total);
        let bytes = self.spans[start].start..self.spans[end - 1].end;

        let chunk = Chunk {
            sequence_index: self.next_index,
            token_start: start,
            token_end: end,
            text: self.text[bytes].to_string(),
        };

        if end == total {
            self.done = true;
        } else {
            self.next_start += self.stride;
            self.next_index += 1;
        }

        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_rejects_overlap_not_below_span() {
        assert!(matches!(
            Chunker::new(10, 10),
            Err(GatewayError::InvalidChunkParameters { max_span: 10, overlap: 10 })
        ));
        assert!(Chunker::new(10, 11).is_err());
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(10, 0).is_ok());
    }

    #[test]
    fn test_empty_input_yields_one_empty_chunk() {
        let chunker = Chunker::new(512, 50).unwrap();
        let chunks: Vec<_> = chunker.split("", &WhitespaceTokenizer).collect();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
        assert_eq!((chunks[0].token_start, chunks[0].token_end), (0, 0));
    }

    #[test]
    fn test_short_input_is_one_chunk_equal_to_input() {
        let chunker = Chunker::new(5, 2).unwrap();
        let text = "  exactly five   tokens in here ";
        let chunks: Vec<_> = chunker.split(text, &WhitespaceTokenizer).collect();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_long_input_windows_cover_with_exact_overlap() {
        let chunker = Chunker::new(4, 1).unwrap();
        let text = words(10);
        let chunks: Vec<_> = chunker.split(&text, &WhitespaceTokenizer).collect();

        let ranges: Vec<_> = chunks.iter().map(|c| (c.token_start, c.token_end)).collect();
        assert_eq!(ranges, vec![(0, 4), (3, 7), (6, 10)]);

        assert_eq!(chunks[0].text, "w0 w1 w2 w3");
        assert_eq!(chunks[1].text, "w3 w4 w5 w6");
        assert_eq!(chunks[2].text, "w6 w7 w8 w9");

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence_index, i);
        }
    }

    #[test]
    fn test_only_last_chunk_may_be_short() {
        let chunker = Chunker::new(4, 1).unwrap();
        let text = words(8);
        let chunks: Vec<_> = chunker.split(&text, &WhitespaceTokenizer).collect();

        let ranges: Vec<_> = chunks.iter().map(|c| (c.token_start, c.token_end)).collect();
        assert_eq!(ranges, vec![(0, 4), (3, 7), (6, 8)]);
    }

    #[test]
    fn test_coverage_and_overlap_hold_across_geometries() {
        for (max_span, overlap) in [(3, 0), (3, 2), (7, 3), (16, 5)] {
            let chunker = Chunker::new(max_span, overlap).unwrap();
            for n in [max_span + 1, 2 * max_span, 41] {
                let text = words(n);
                let chunks: Vec<_> = chunker.split(&text, &WhitespaceTokenizer).collect();

                assert_eq!(chunks.first().unwrap().token_start, 0);
                assert_eq!(chunks.last().unwrap().token_end, n);
                for pair in chunks.windows(2) {
                    assert_eq!(pair[0].token_end - pair[1].token_start, overlap);
                    assert_eq!(pair[0].token_end - pair[0].token_start, max_span);
                }
            }
        }
    }

    #[test]
    fn test_split_is_restartable_and_deterministic() {
        let chunker = Chunker::new(4, 1).unwrap();
        let text = words(11);

        let first: Vec<_> = chunker.split(&text, &WhitespaceTokenizer).collect();
        let second: Vec<_> = chunker.split(&text, &WhitespaceTokenizer).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_tokenizer_spans_unicode() {
        let spans = WhitespaceTokenizer.token_spans(" héllo  wörld\n");
        assert_eq!(spans.len(), 2);
        assert_eq!(&" héllo  wörld\n"[spans[1].clone()], "wörld");
    }
}
