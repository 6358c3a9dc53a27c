//! Chunked review analysis for revlens.
//!
//! Splits review text into bounded chunks, analyzes each chunk with one
//! completion call, then merges the per-chunk analyses into a single report
//! with one more call. Derived artifacts (keywords, descriptions, titles,
//! summaries) are single calls over a finished report. [`SessionContext`]
//! holds the state a UI session accumulates between those steps.

pub mod analyzer;
pub mod chunk;
pub mod derived;
pub mod error;
pub mod pipeline;
pub mod reducer;
pub mod session;
pub mod types;

pub use chunk::{ChunkSplitter, Chunks, DEFAULT_CHUNK_SIZE};
pub use derived::{
    generate_competitive_edge, generate_keywords_and_descriptions, generate_optimized_titles,
    generate_review_summary,
};
pub use error::AnalysisError;
pub use pipeline::Pipeline;
pub use reducer::ANALYSIS_SEPARATOR;
pub use session::{Screen, SessionContext};
pub use types::{ArtifactKind, DerivedArtifacts, KeywordsAndDescriptions, Report};
