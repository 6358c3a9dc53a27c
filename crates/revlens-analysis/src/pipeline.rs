//! Review analysis pipeline orchestration.

use revlens_core::{AnalysisProfile, AppConfig};
use revlens_llm::CompletionService;

use crate::analyzer::analyze_chunks;
use crate::chunk::ChunkSplitter;
use crate::error::AnalysisError;
use crate::reducer::reduce;
use crate::types::Report;

/// Split → analyze → reduce, parameterized only by an [`AnalysisProfile`].
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    splitter: ChunkSplitter,
    concurrency: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            splitter: ChunkSplitter::default(),
            concurrency: 1,
        }
    }
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidChunkSize`] or
    /// [`AnalysisError::InvalidConcurrency`] for zero values.
    pub fn new(chunk_size: usize, concurrency: usize) -> Result<Self, AnalysisError> {
        if concurrency == 0 {
            return Err(AnalysisError::InvalidConcurrency);
        }
        Ok(Self {
            splitter: ChunkSplitter::new(chunk_size)?,
            concurrency,
        })
    }

    /// # Errors
    ///
    /// See [`Pipeline::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        Self::new(config.chunk_size, config.chunk_concurrency)
    }

    #[must_use]
    pub fn splitter(&self) -> ChunkSplitter {
        self.splitter
    }

    /// Run the full pipeline over `raw_text`.
    ///
    /// 1. Split the text into chunks of at most `chunk_size` chars.
    /// 2. Analyze every chunk (one completion call each).
    /// 3. Merge the analyses, in chunk order, with one more call.
    ///
    /// Empty text returns [`Report::empty`] without any completion call.
    /// N chunks cost N + 1 calls.
    ///
    /// # Errors
    ///
    /// Any completion failure aborts the run; no partial report is returned.
    pub async fn run<S: CompletionService>(
        &self,
        service: &S,
        profile: &AnalysisProfile,
        raw_text: &str,
    ) -> Result<Report, AnalysisError> {
        let chunks: Vec<&str> = self.splitter.split(raw_text).collect();

        if chunks.is_empty() {
            tracing::info!(
                profile = profile.name,
                "no review text to analyze, returning empty report"
            );
            return Ok(Report::empty());
        }

        tracing::info!(
            profile = profile.name,
            chunks = chunks.len(),
            chunk_size = self.splitter.chunk_size(),
            concurrency = self.concurrency,
            "starting review analysis"
        );

        let analyses = analyze_chunks(service, profile, &chunks, self.concurrency).await?;
        let report = reduce(service, profile, &analyses).await?;

        tracing::info!(
            profile = profile.name,
            report_chars = report.as_str().chars().count(),
            "review analysis complete"
        );
        Ok(report)
    }
}
