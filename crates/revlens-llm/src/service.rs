use std::future::Future;

use revlens_core::PromptTemplate;

use crate::error::LlmError;

/// One completion call: a system instruction and a user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// Build a request by rendering `text` into `template`.
    #[must_use]
    pub fn from_template(template: &PromptTemplate, text: &str) -> Self {
        Self::new(template.system_instruction, template.render(text))
    }
}

/// A black-box text-completion backend.
pub trait CompletionService: Send + Sync {
    /// Issue exactly one completion and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on any transport, API or decoding failure.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}
