use revlens_core::ProfileKind;
use revlens_llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("chunk concurrency must be greater than zero")]
    InvalidConcurrency,

    /// A per-chunk completion failed; analyses of other chunks are discarded.
    #[error("analysis of chunk {index} failed: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: LlmError,
    },

    #[error("report reduction failed: {source}")]
    ReduceFailed {
        #[source]
        source: LlmError,
    },

    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    /// A derived generator was asked to run over empty context.
    #[error("no {0} available yet")]
    MissingInput(&'static str),

    #[error("no {0} review report available; run the analysis first")]
    MissingReport(ProfileKind),

    #[error("no reviews uploaded for the {0} product")]
    MissingReviews(ProfileKind),

    #[error("API key must not be blank")]
    InvalidCredential,

    #[error("save an API key before continuing")]
    CredentialRequired,

    #[error("the main screen is not open")]
    NotOnMainScreen,

    /// Generated content was cleared while a run was in flight.
    #[error("session was reset while the request was running")]
    SessionReset,
}

impl AnalysisError {
    /// `true` when the completion service caused the failure.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnalysisError::ChunkFailed { .. }
                | AnalysisError::ReduceFailed { .. }
                | AnalysisError::Completion(_)
        )
    }
}
