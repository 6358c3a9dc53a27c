//! Merge per-chunk analyses into one report.

use revlens_core::AnalysisProfile;
use revlens_llm::{CompletionRequest, CompletionService};

use crate::error::AnalysisError;
use crate::types::Report;

/// Separator placed between per-chunk analyses in the combined text.
pub const ANALYSIS_SEPARATOR: &str = "\n\n";

/// Join analyses in order with a blank line between them.
#[must_use]
pub fn combine(analyses: &[String]) -> String {
    analyses.join(ANALYSIS_SEPARATOR)
}

/// Issue one merge call over the combined analyses.
///
/// An empty `analyses` slice returns [`Report::empty`] without calling the
/// service.
///
/// # Errors
///
/// Returns [`AnalysisError::ReduceFailed`] if the merge call fails.
pub async fn reduce<S: CompletionService>(
    service: &S,
    profile: &AnalysisProfile,
    analyses: &[String],
) -> Result<Report, AnalysisError> {
    if analyses.is_empty() {
        return Ok(Report::empty());
    }

    let combined = combine(analyses);
    tracing::debug!(
        profile = profile.name,
        analyses = analyses.len(),
        combined_chars = combined.chars().count(),
        "reducing chunk analyses"
    );
    let request = CompletionRequest::from_template(&profile.reduce, &combined);
    let text = service
        .complete(&request)
        .await
        .map_err(|source| AnalysisError::ReduceFailed { source })?;
    Ok(Report::new(text))
}
