//! File-format collaborators for revlens: CSV → PDF, PDF → text, and Word export.

pub mod csv_pdf;
pub mod docx;
pub mod error;
pub mod pdf_text;
pub mod scratch;
mod winansi;

pub use csv_pdf::{csv_to_pdf, read_csv_rows, render_rows_pdf};
pub use docx::{docx_bytes, export_docx};
pub use error::DocsError;
pub use pdf_text::{extract_text, extract_text_from_bytes};
pub use scratch::ScratchDir;
