//! Order-preserving, bounded-size text chunking.
//!
//! Lengths are counted in `char`s, so a chunk never splits a UTF-8 sequence.

use std::iter::FusedIterator;

use crate::error::AnalysisError;

/// Chunk length used when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSplitter {
    chunk_size: usize,
}

impl Default for ChunkSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkSplitter {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidChunkSize`] when `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Result<Self, AnalysisError> {
        if chunk_size == 0 {
            return Err(AnalysisError::InvalidChunkSize);
        }
        Ok(Self { chunk_size })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Lazily split `text` into chunks of at most `chunk_size` chars.
    ///
    /// The iterator is `Clone`, so the same sequence can be replayed. Empty
    /// text yields no chunks.
    #[must_use]
    pub fn split<'a>(&self, text: &'a str) -> Chunks<'a> {
        Chunks {
            rest: text,
            chunk_size: self.chunk_size,
        }
    }

    /// Number of chunks [`split`](Self::split) yields for `text`.
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chunk_size)
    }
}

/// Iterator returned by [`ChunkSplitter::split`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    chunk_size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map_or(self.rest.len(), |(offset, _)| offset);
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            (0, Some(0))
        } else {
            // Every chunk holds at least one char and at most four bytes per char.
            let max_chars = self.rest.len();
            let min_chars = self.rest.len().div_ceil(4);
            (
                min_chars.div_ceil(self.chunk_size),
                Some(max_chars.div_ceil(self.chunk_size)),
            )
        }
    }
}

impl FusedIterator for Chunks<'_> {}
