//! Single-call generators over an existing report or artifact.
//!
//! None of these chunk their input: each formats one prompt from a fixed
//! template and issues one completion call. They refuse to run over empty
//! context so a reset session cannot trigger calls.

use revlens_core::DerivedKind;
use revlens_llm::{CompletionRequest, CompletionService};

use crate::error::AnalysisError;
use crate::types::{KeywordsAndDescriptions, Report};

async fn generate<S: CompletionService>(
    service: &S,
    kind: DerivedKind,
    context: &str,
    what: &'static str,
) -> Result<String, AnalysisError> {
    if context.trim().is_empty() {
        return Err(AnalysisError::MissingInput(what));
    }
    tracing::debug!(?kind, context_chars = context.chars().count(), "generating artifact");
    let request = CompletionRequest::from_template(&kind.template(), context);
    Ok(service.complete(&request).await?)
}

/// Prefix every line of `text` with `"- "`, blank lines included.
fn bulletize(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keyword suggestions and three product descriptions from a review report.
///
/// Two calls: keywords first, then descriptions.
///
/// # Errors
///
/// [`AnalysisError::MissingInput`] for an empty report (no calls made), or
/// [`AnalysisError::Completion`] if either call fails.
pub async fn generate_keywords_and_descriptions<S: CompletionService>(
    service: &S,
    report: &Report,
) -> Result<KeywordsAndDescriptions, AnalysisError> {
    const WHAT: &str = "review analysis";
    let keywords = generate(service, DerivedKind::Keywords, report.as_str(), WHAT).await?;
    let descriptions = generate(service, DerivedKind::Descriptions, report.as_str(), WHAT).await?;
    Ok(KeywordsAndDescriptions {
        keywords: bulletize(&keywords),
        descriptions: bulletize(&descriptions),
    })
}

/// Three optimized titles and descriptions from the combined keywords/descriptions text.
///
/// # Errors
///
/// [`AnalysisError::MissingInput`] when `keywords_and_descriptions` is empty.
pub async fn generate_optimized_titles<S: CompletionService>(
    service: &S,
    keywords_and_descriptions: &str,
) -> Result<String, AnalysisError> {
    generate(
        service,
        DerivedKind::OptimizedTitles,
        keywords_and_descriptions,
        "keywords and descriptions",
    )
    .await
}

/// Customer-facing overview of a review report.
///
/// # Errors
///
/// [`AnalysisError::MissingInput`] for an empty report.
pub async fn generate_review_summary<S: CompletionService>(
    service: &S,
    report: &Report,
) -> Result<String, AnalysisError> {
    generate(
        service,
        DerivedKind::ReviewSummary,
        report.as_str(),
        "review analysis",
    )
    .await
}

/// Competitive-positioning insights from a competitor report.
///
/// # Errors
///
/// [`AnalysisError::MissingInput`] for an empty report.
pub async fn generate_competitive_edge<S: CompletionService>(
    service: &S,
    competitor_report: &Report,
) -> Result<String, AnalysisError> {
    generate(
        service,
        DerivedKind::CompetitiveEdge,
        competitor_report.as_str(),
        "competitor review analysis",
    )
    .await
}
