//! Instruction templates for every completion call revlens makes.
//!
//! Analysis profiles differ only in wording, so they are plain data records
//! rather than separate code paths.

use serde::{Deserialize, Serialize};

/// Placeholder substituted by [`PromptTemplate::render`].
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// A system instruction paired with a user prompt containing one `{text}` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub system_instruction: &'static str,
    pub user_template: &'static str,
}

impl PromptTemplate {
    /// Substitute `text` into the user template.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.user_template.replacen(TEXT_PLACEHOLDER, text, 1)
    }
}

/// Which product a set of reviews belongs to. Keys all per-profile session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Main,
    Competitor,
}

impl ProfileKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Main => "main",
            ProfileKind::Competitor => "competitor",
        }
    }

    #[must_use]
    pub fn profile(self) -> AnalysisProfile {
        match self {
            ProfileKind::Main => AnalysisProfile::primary(),
            ProfileKind::Competitor => AnalysisProfile::competitor(),
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProfileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(ProfileKind::Main),
            "competitor" => Ok(ProfileKind::Competitor),
            other => Err(format!("unknown profile '{other}'")),
        }
    }
}

/// Templates for the per-chunk analysis and the final merge of one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisProfile {
    pub name: &'static str,
    pub chunk: PromptTemplate,
    pub reduce: PromptTemplate,
}

impl AnalysisProfile {
    /// Review analysis for the user's own product.
    #[must_use]
    pub fn primary() -> Self {
        Self {
            name: "primary-review",
            chunk: PromptTemplate {
                system_instruction: "You are an assistant that deeply analyzes Amazon reviews. \
                    Provide your analysis in a structured format with sections for positive keywords, \
                    negative keywords, positive attributes, negative attributes, and a brief summary.",
                user_template: "Analyze these reviews and identify positive and negative keywords \
                    and attributes: {text}",
            },
            reduce: PromptTemplate {
                system_instruction: "You are an assistant that summarizes multiple review analyses \
                    into a single comprehensive report.",
                user_template: "Summarize these review analyses into a single comprehensive report \
                    with sections for positive keywords, negative keywords, positive attributes, \
                    negative attributes, and an overall conclusion. Avoid repetition and provide a \
                    clear, concise summary:\n\n{text}",
            },
        }
    }

    /// Review analysis for a competing product.
    #[must_use]
    pub fn competitor() -> Self {
        Self {
            name: "competitor-review",
            chunk: PromptTemplate {
                system_instruction: "You are an assistant that deeply analyzes competitor product \
                    reviews. Provide your analysis in a structured format with sections for positive \
                    keywords, negative keywords, positive attributes, negative attributes, and a \
                    brief summary.",
                user_template: "Analyze these competitor reviews and identify positive and negative \
                    keywords and attributes: {text}",
            },
            reduce: PromptTemplate {
                system_instruction: "You are an assistant that summarizes multiple competitor review \
                    analyses into a single comprehensive report.",
                user_template: "Summarize these competitor review analyses into a single \
                    comprehensive report with sections for positive keywords, negative keywords, \
                    positive attributes, negative attributes, and an overall conclusion. Focus on \
                    insights that could be used for competitive positioning. Avoid repetition and \
                    provide a clear, concise summary:\n\n{text}",
            },
        }
    }
}

/// Single-call generators that run over an existing report or artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedKind {
    Keywords,
    Descriptions,
    OptimizedTitles,
    ReviewSummary,
    CompetitiveEdge,
}

impl DerivedKind {
    #[must_use]
    pub fn template(self) -> PromptTemplate {
        match self {
            DerivedKind::Keywords => PromptTemplate {
                system_instruction: "You are an assistant that suggests keywords for Amazon product \
                    titles and descriptions.",
                user_template: "Based on this review analysis, suggest recommended keywords that \
                    should be used in product titles and descriptions to attract more customers: {text}",
            },
            DerivedKind::Descriptions => PromptTemplate {
                system_instruction: "You are an assistant that generates dynamic product descriptions.",
                user_template: "Generate 3 dynamic product descriptions based on this review \
                    analysis. Keep the descriptions short, informative, and attractive to customers. \
                    Do not include keyword suggestions, just the descriptions: {text}",
            },
            DerivedKind::OptimizedTitles => PromptTemplate {
                system_instruction: "You are an assistant that optimizes product titles and \
                    descriptions for e-commerce platforms.",
                user_template: "Based on these keywords and descriptions, create 3 optimized product \
                    titles and descriptions. Ensure compliance with platform restrictions on title \
                    length and keyword usage:\n\n{text}",
            },
            DerivedKind::ReviewSummary => PromptTemplate {
                system_instruction: "You are an assistant that summarizes product review insights.",
                user_template: "Provide a concise overview of what customers are saying about the \
                    product. Summarize positive and negative attributes, highlighting key features \
                    and potential improvements:\n\n{text}",
            },
            DerivedKind::CompetitiveEdge => PromptTemplate {
                system_instruction: "You are an assistant that provides competitive edge insights \
                    based on competitor review analysis.",
                user_template: "Based on this competitor review analysis, provide insights on \
                    successful keywords, descriptions, and strategies for competitive positioning. \
                    Focus on benchmarking and identifying areas for improvement:\n\n{text}",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_placeholder_once() {
        let template = PromptTemplate {
            system_instruction: "sys",
            user_template: "Analyze: {text}",
        };
        assert_eq!(template.render("great product"), "Analyze: great product");
    }

    #[test]
    fn render_does_not_expand_placeholders_inside_text() {
        let template = PromptTemplate {
            system_instruction: "sys",
            user_template: "Analyze: {text}",
        };
        assert_eq!(template.render("literal {text}"), "Analyze: literal {text}");
    }

    #[test]
    fn every_template_has_exactly_one_placeholder() {
        let mut templates = Vec::new();
        for profile in [AnalysisProfile::primary(), AnalysisProfile::competitor()] {
            templates.push(profile.chunk);
            templates.push(profile.reduce);
        }
        for kind in [
            DerivedKind::Keywords,
            DerivedKind::Descriptions,
            DerivedKind::OptimizedTitles,
            DerivedKind::ReviewSummary,
            DerivedKind::CompetitiveEdge,
        ] {
            templates.push(kind.template());
        }

        for template in templates {
            assert_eq!(
                template.user_template.matches(TEXT_PLACEHOLDER).count(),
                1,
                "template should have one placeholder: {}",
                template.user_template
            );
        }
    }

    #[test]
    fn line_continuations_collapse_to_single_spaces() {
        let profile = AnalysisProfile::primary();
        assert!(profile
            .chunk
            .system_instruction
            .contains("Amazon reviews. Provide your analysis"));
        assert!(!profile.chunk.system_instruction.contains("  "));
    }

    #[test]
    fn competitor_reduce_focuses_on_positioning() {
        let profile = AnalysisProfile::competitor();
        assert!(profile.reduce.user_template.contains("competitive positioning"));
        assert!(!AnalysisProfile::primary()
            .reduce
            .user_template
            .contains("competitive positioning"));
    }

    #[test]
    fn profile_kind_round_trips_through_str() {
        for kind in [ProfileKind::Main, ProfileKind::Competitor] {
            assert_eq!(kind.as_str().parse::<ProfileKind>().unwrap(), kind);
        }
        assert!("rival".parse::<ProfileKind>().is_err());
    }

    #[test]
    fn profile_kind_serializes_lowercase() {
        let json = serde_json::to_string(&ProfileKind::Competitor).unwrap();
        assert_eq!(json, "\"competitor\"");
    }
}
