//! Explicit session context for one UI user.
//!
//! Holds the saved credential, the current screen, uploaded review text and
//! every generated artifact. Reports are only replaced by a successful run or
//! cleared by [`SessionContext::reset`]; a failed run never touches them.

use std::collections::HashMap;

use revlens_core::ProfileKind;
use serde::Serialize;

use crate::error::AnalysisError;
use crate::types::{ArtifactKind, DerivedArtifacts, KeywordsAndDescriptions, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Home,
    Main,
}

#[derive(Default)]
pub struct SessionContext {
    credential: Option<String>,
    on_main: bool,
    raw_text: HashMap<ProfileKind, String>,
    reports: HashMap<ProfileKind, Report>,
    artifacts: DerivedArtifacts,
    generation: u64,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("credential", &self.credential.as_ref().map(|_| "[redacted]"))
            .field("screen", &self.screen())
            .field("reports", &self.reports.keys().collect::<Vec<_>>())
            .field("artifacts_empty", &self.artifacts.is_empty())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the API key used for every completion call in this session.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::InvalidCredential`] for a blank key; the previous
    /// credential (if any) is kept.
    pub fn save_credential(&mut self, api_key: &str) -> Result<(), AnalysisError> {
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            return Err(AnalysisError::InvalidCredential);
        }
        self.credential = Some(trimmed.to_owned());
        tracing::info!("API key saved for session");
        Ok(())
    }

    #[must_use]
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    #[must_use]
    pub fn credential_saved(&self) -> bool {
        self.credential.is_some()
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        if self.on_main {
            Screen::Main
        } else {
            Screen::Home
        }
    }

    /// `home → main`, allowed only once a credential is saved.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::CredentialRequired`] when no key has been saved.
    pub fn enter_main(&mut self) -> Result<(), AnalysisError> {
        if !self.credential_saved() {
            return Err(AnalysisError::CredentialRequired);
        }
        self.on_main = true;
        Ok(())
    }

    /// Gate for every main-screen action.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::CredentialRequired`] or [`AnalysisError::NotOnMainScreen`].
    pub fn require_main(&self) -> Result<&str, AnalysisError> {
        let credential = self.credential().ok_or(AnalysisError::CredentialRequired)?;
        if !self.on_main {
            return Err(AnalysisError::NotOnMainScreen);
        }
        Ok(credential)
    }

    pub fn set_raw_text(&mut self, kind: ProfileKind, text: String) {
        self.raw_text.insert(kind, text);
    }

    #[must_use]
    pub fn raw_text(&self, kind: ProfileKind) -> Option<&str> {
        self.raw_text.get(&kind).map(String::as_str)
    }

    /// # Errors
    ///
    /// [`AnalysisError::MissingReviews`] when nothing was uploaded for `kind`.
    pub fn require_raw_text(&self, kind: ProfileKind) -> Result<&str, AnalysisError> {
        self.raw_text(kind).ok_or(AnalysisError::MissingReviews(kind))
    }

    /// Report for `kind`, or `None` if none has been produced (or it was empty).
    #[must_use]
    pub fn report(&self, kind: ProfileKind) -> Option<&Report> {
        self.reports.get(&kind).filter(|r| !r.is_empty())
    }

    /// # Errors
    ///
    /// [`AnalysisError::MissingReport`] when no non-empty report exists for `kind`.
    pub fn require_report(&self, kind: ProfileKind) -> Result<&Report, AnalysisError> {
        self.report(kind).ok_or(AnalysisError::MissingReport(kind))
    }

    /// Record the result of a successful run, replacing any previous report.
    pub fn store_report(&mut self, kind: ProfileKind, report: Report) {
        tracing::debug!(profile = %kind, empty = report.is_empty(), "storing report");
        self.reports.insert(kind, report);
    }

    #[must_use]
    pub fn artifacts(&self) -> &DerivedArtifacts {
        &self.artifacts
    }

    /// Stored text for `kind`, or `None` if it has not been generated.
    #[must_use]
    pub fn artifact_text(&self, kind: ArtifactKind) -> Option<&str> {
        let text = match kind {
            ArtifactKind::ReviewAnalysis => self.report(ProfileKind::Main).map(Report::as_str),
            ArtifactKind::CompetitorReviewAnalysis => {
                self.report(ProfileKind::Competitor).map(Report::as_str)
            }
            ArtifactKind::KeywordsAndDescriptions => {
                Some(self.artifacts.keywords_and_descriptions.as_str())
            }
            ArtifactKind::OptimizedTitles => Some(self.artifacts.optimized_titles.as_str()),
            ArtifactKind::ReviewSummary => Some(self.artifacts.review_summary.as_str()),
            ArtifactKind::CompetitiveEdge => Some(self.artifacts.competitive_edge.as_str()),
        };
        text.filter(|t| !t.is_empty())
    }

    pub fn set_keywords_and_descriptions(&mut self, generated: &KeywordsAndDescriptions) {
        self.artifacts.keywords_and_descriptions = generated.combined();
    }

    pub fn set_optimized_titles(&mut self, text: String) {
        self.artifacts.optimized_titles = text;
    }

    pub fn set_review_summary(&mut self, text: String) {
        self.artifacts.review_summary = text;
    }

    pub fn set_competitive_edge(&mut self, text: String) {
        self.artifacts.competitive_edge = text;
    }

    /// Bumped by every [`reset`](Self::reset). Callers that release the
    /// session during a completion run compare it before writing results.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// # Errors
    ///
    /// [`AnalysisError::SessionReset`] when a reset happened after `seen` was read.
    pub fn ensure_generation(&self, seen: u64) -> Result<(), AnalysisError> {
        if self.generation == seen {
            Ok(())
        } else {
            Err(AnalysisError::SessionReset)
        }
    }

    /// Clear every report and derived artifact. The screen, the credential and
    /// uploaded review text are kept.
    pub fn reset(&mut self) {
        self.reports.clear();
        self.artifacts = DerivedArtifacts::default();
        self.generation = self.generation.wrapping_add(1);
        tracing::info!("generated content cleared");
    }
}
