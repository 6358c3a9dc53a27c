//! PDF → plain text.
//!
//! `pdf-extract` handles font encodings well but panics on some malformed
//! files, so its call is isolated and a raw `lopdf` operator walk is used as
//! the fallback.

use std::path::Path;

use lopdf::{Document, Object};

use crate::error::DocsError;
use crate::winansi;

/// Extract the text of every page of `pdf_path`, in page order.
///
/// # Errors
///
/// [`DocsError::Extract`] when neither extractor can read the file.
pub fn extract_text(pdf_path: &Path) -> Result<String, DocsError> {
    let context = pdf_path.display().to_string();
    let primary = std::panic::catch_unwind(|| pdf_extract::extract_text(pdf_path));
    match primary {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => {
            tracing::warn!(pdf = %context, error = %e, "pdf-extract failed; using lopdf fallback");
            let doc = Document::load(pdf_path).map_err(|e| DocsError::Extract {
                context: context.clone(),
                reason: e.to_string(),
            })?;
            Ok(text_via_lopdf(&doc))
        }
        Err(panic) => {
            tracing::warn!(pdf = %context, panic = %panic_message(&*panic), "pdf-extract panicked; using lopdf fallback");
            let doc = Document::load(pdf_path).map_err(|e| DocsError::Extract {
                context,
                reason: e.to_string(),
            })?;
            Ok(text_via_lopdf(&doc))
        }
    }
}

/// In-memory variant of [`extract_text`].
///
/// # Errors
///
/// [`DocsError::Extract`] when neither extractor can read the bytes.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, DocsError> {
    let context = "in-memory PDF";
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => return Ok(text),
        Ok(Err(e)) => {
            tracing::warn!(pdf = context, error = %e, "pdf-extract failed; using lopdf fallback");
        }
        Err(panic) => {
            tracing::warn!(pdf = context, panic = %panic_message(&*panic), "pdf-extract panicked; using lopdf fallback");
        }
    }
    let doc = Document::load_mem(bytes).map_err(|e| DocsError::Extract {
        context: context.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(text_via_lopdf(&doc))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Collect `Tj`/`TJ` string operands, one line per text object.
pub(crate) fn text_via_lopdf(doc: &Document) -> String {
    let mut text = String::new();
    for page_id in doc.get_pages().into_values() {
        let Ok(content) = doc.get_page_content(page_id) else {
            continue;
        };
        let operations = lopdf::content::Content::decode(&content)
            .map(|c| c.operations)
            .unwrap_or_default();

        for op in operations {
            match op.operator.as_str() {
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = op.operands.first() {
                        text.push_str(&winansi::decode(bytes));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = op.operands.first() {
                        for item in items {
                            if let Object::String(bytes, _) = item {
                                text.push_str(&winansi::decode(bytes));
                            }
                        }
                    }
                }
                "ET" if !text.ends_with('\n') => text.push('\n'),
                _ => {}
            }
        }
        text.push('\n');
    }
    text
}
