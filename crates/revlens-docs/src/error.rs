use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF encoding error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write error: {0}")]
    PdfWrite(String),

    #[error("text extraction failed for {context}: {reason}")]
    Extract { context: String, reason: String },

    #[error("document export error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl DocsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
