//! Per-chunk analysis: one completion call per chunk.

use futures::{stream, StreamExt, TryStreamExt};
use revlens_core::AnalysisProfile;
use revlens_llm::{CompletionRequest, CompletionService, LlmError};

use crate::error::AnalysisError;

/// Analyze a single chunk with the profile's chunk template.
///
/// # Errors
///
/// Returns the completion service's error unchanged.
pub async fn analyze_chunk<S: CompletionService>(
    service: &S,
    profile: &AnalysisProfile,
    chunk: &str,
) -> Result<String, LlmError> {
    let request = CompletionRequest::from_template(&profile.chunk, chunk);
    service.complete(&request).await
}

/// Analyze every chunk and return the analyses in chunk order.
///
/// With `concurrency == 1` calls are issued one at a time. Higher values keep
/// up to that many calls in flight; results are still yielded in chunk order.
/// The first failure aborts the whole map and discards every analysis
/// gathered so far.
///
/// # Errors
///
/// Returns [`AnalysisError::ChunkFailed`] carrying the index of the failing chunk.
pub async fn analyze_chunks<S: CompletionService>(
    service: &S,
    profile: &AnalysisProfile,
    chunks: &[&str],
    concurrency: usize,
) -> Result<Vec<String>, AnalysisError> {
    let total = chunks.len();

    if concurrency <= 1 {
        let mut analyses = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            tracing::debug!(
                profile = profile.name,
                chunk = index + 1,
                total,
                "analyzing chunk"
            );
            let analysis = analyze_chunk(service, profile, chunk)
                .await
                .map_err(|source| AnalysisError::ChunkFailed { index, source })?;
            analyses.push(analysis);
        }
        return Ok(analyses);
    }

    stream::iter((0..total).map(move |index| async move {
        let chunk = chunks[index];
        tracing::debug!(
            profile = profile.name,
            chunk = index + 1,
            total,
            "analyzing chunk"
        );
        analyze_chunk(service, profile, chunk)
            .await
            .map_err(|source| AnalysisError::ChunkFailed { index, source })
    }))
    .buffered(concurrency)
    .try_collect()
    .await
}
