//! Working directory for intermediate CSV and PDF files.
//!
//! Each profile has fixed file names, so a new upload overwrites the previous
//! one for that profile.

use std::path::{Path, PathBuf};

use revlens_core::ProfileKind;

use crate::csv_pdf::csv_to_pdf;
use crate::error::DocsError;
use crate::pdf_text::extract_text;

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn csv_path(&self, kind: ProfileKind) -> PathBuf {
        self.root.join(format!("{}.csv", stem(kind)))
    }

    #[must_use]
    pub fn pdf_path(&self, kind: ProfileKind) -> PathBuf {
        self.root.join(format!("{}.pdf", stem(kind)))
    }

    /// Create the directory if it does not exist yet.
    ///
    /// # Errors
    ///
    /// [`DocsError::Io`] if the directory cannot be created.
    pub fn ensure(&self) -> Result<(), DocsError> {
        std::fs::create_dir_all(&self.root).map_err(|e| DocsError::io(&self.root, e))
    }

    /// Persist uploaded CSV bytes, convert them to PDF and return the PDF text.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError`] from any of the write, convert or extract steps.
    pub fn ingest_csv(&self, kind: ProfileKind, csv_bytes: &[u8]) -> Result<String, DocsError> {
        self.ensure()?;
        let csv_path = self.csv_path(kind);
        std::fs::write(&csv_path, csv_bytes).map_err(|e| DocsError::io(&csv_path, e))?;
        self.convert_and_extract(kind)
    }

    /// Like [`ingest_csv`](Self::ingest_csv) for a CSV already on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DocsError`] if the source cannot be read or converted.
    pub fn ingest_csv_file(&self, kind: ProfileKind, source: &Path) -> Result<String, DocsError> {
        let bytes = std::fs::read(source).map_err(|e| DocsError::io(source, e))?;
        self.ingest_csv(kind, &bytes)
    }

    fn convert_and_extract(&self, kind: ProfileKind) -> Result<String, DocsError> {
        let pdf_path = self.pdf_path(kind);
        csv_to_pdf(&self.csv_path(kind), &pdf_path)?;
        let text = extract_text(&pdf_path)?;
        tracing::info!(
            profile = %kind,
            chars = text.chars().count(),
            "reviews converted to text"
        );
        Ok(text)
    }
}

fn stem(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Main => "main_product",
        ProfileKind::Competitor => "competitor_product",
    }
}
