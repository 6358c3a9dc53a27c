use std::str::FromStr;

use serde::Serialize;

/// Final merged output of one pipeline run.
///
/// An empty report is the designated result for empty input; it is never
/// produced by a completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report(String);

impl Report {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyword recommendations and product descriptions, each already bulleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordsAndDescriptions {
    pub keywords: String,
    pub descriptions: String,
}

impl KeywordsAndDescriptions {
    /// Single text block used for display, download and the titles prompt.
    #[must_use]
    pub fn combined(&self) -> String {
        format!(
            "Keyword Recommendations:\n\n{}\n\nDynamic Descriptions:\n\n{}",
            self.keywords, self.descriptions
        )
    }
}

/// Artifacts generated from finished reports. Empty strings mean "not generated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedArtifacts {
    pub keywords_and_descriptions: String,
    pub optimized_titles: String,
    pub review_summary: String,
    pub competitive_edge: String,
}

impl DerivedArtifacts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords_and_descriptions.is_empty()
            && self.optimized_titles.is_empty()
            && self.review_summary.is_empty()
            && self.competitive_edge.is_empty()
    }
}

/// Every downloadable piece of generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    ReviewAnalysis,
    KeywordsAndDescriptions,
    OptimizedTitles,
    ReviewSummary,
    CompetitorReviewAnalysis,
    CompetitiveEdge,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::ReviewAnalysis,
        ArtifactKind::KeywordsAndDescriptions,
        ArtifactKind::OptimizedTitles,
        ArtifactKind::ReviewSummary,
        ArtifactKind::CompetitorReviewAnalysis,
        ArtifactKind::CompetitiveEdge,
    ];

    /// URL-safe identifier, e.g. `review-summary`.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            ArtifactKind::ReviewAnalysis => "review-analysis",
            ArtifactKind::KeywordsAndDescriptions => "keywords-and-descriptions",
            ArtifactKind::OptimizedTitles => "optimized-titles",
            ArtifactKind::ReviewSummary => "review-summary",
            ArtifactKind::CompetitorReviewAnalysis => "competitor-review-analysis",
            ArtifactKind::CompetitiveEdge => "competitive-edge",
        }
    }

    /// Download file name without extension.
    #[must_use]
    pub fn file_stem(self) -> &'static str {
        match self {
            ArtifactKind::ReviewAnalysis => "Review_Analysis",
            ArtifactKind::KeywordsAndDescriptions => "Keywords_and_Descriptions",
            ArtifactKind::OptimizedTitles => "Optimized_Titles_and_Descriptions",
            ArtifactKind::ReviewSummary => "Review_Summary",
            ArtifactKind::CompetitorReviewAnalysis => "Competitor_Review_Analysis",
            ArtifactKind::CompetitiveEdge => "Competitive_Edge_Insights",
        }
    }

    #[must_use]
    pub fn file_name(self) -> String {
        format!("{}.docx", self.file_stem())
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| format!("unknown artifact: {s}"))
    }
}
