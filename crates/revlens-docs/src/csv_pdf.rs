//! Render CSV review exports as a paginated A4 PDF.
//!
//! Every record becomes one paragraph of its fields joined by `", "`, set in
//! Helvetica 10 pt and wrapped to the page width minus the margins.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::DocsError;
use crate::winansi;

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 10.0;
const LEADING: f32 = 12.0;
/// Vertical space between two rows.
const ROW_GAP: f32 = 15.0;
/// Average Helvetica advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// A line of text positioned on a page (PDF user space, origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlacedLine {
    pub x: f32,
    pub baseline: f32,
    pub text: String,
}

/// Read every record of `csv_path` as a `", "`-joined line.
///
/// The first record is data, not a header, and rows may have different widths.
///
/// # Errors
///
/// [`DocsError::Csv`] if the file cannot be opened or a record is not valid UTF-8 CSV.
pub fn read_csv_rows(csv_path: &Path) -> Result<Vec<String>, DocsError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(csv_path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().collect::<Vec<_>>().join(", "));
    }
    Ok(rows)
}

/// Convert `csv_path` to a PDF at `pdf_path`, overwriting any existing file.
///
/// # Errors
///
/// Returns [`DocsError`] on CSV, PDF encoding or filesystem failures.
pub fn csv_to_pdf(csv_path: &Path, pdf_path: &Path) -> Result<(), DocsError> {
    let rows = read_csv_rows(csv_path)?;
    let bytes = render_rows_pdf(&rows)?;
    std::fs::write(pdf_path, bytes).map_err(|e| DocsError::io(pdf_path, e))?;
    tracing::debug!(
        csv = %csv_path.display(),
        pdf = %pdf_path.display(),
        rows = rows.len(),
        "converted CSV to PDF"
    );
    Ok(())
}

/// Render `rows` into PDF bytes. No rows still yields one blank page.
///
/// # Errors
///
/// Returns [`DocsError::Pdf`] or [`DocsError::PdfWrite`] if serialization fails.
pub fn render_rows_pdf(rows: &[String]) -> Result<Vec<u8>, DocsError> {
    let pages = layout(rows);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for lines in &pages {
        let page_id = add_page(&mut doc, pages_id, lines)?;
        kids.push(page_id.into());
    }

    let page_count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
    let media_box: Vec<Object> = vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()];
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| DocsError::PdfWrite(e.to_string()))?;
    Ok(bytes)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    lines: &[PlacedLine],
) -> Result<ObjectId, DocsError> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    for line in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
        operations.push(Operation::new("Td", vec![line.x.into(), line.baseline.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(winansi::encode(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Greedy word wrap to at most `max_chars` chars per line. Words longer than a
/// line are broken. Always returns at least one (possibly empty) line.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed <= max_chars {
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(word.iter());
                current_len += word.len();
                break;
            }
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            // Word alone is wider than a line.
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
    }

    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn max_chars_per_line() -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let chars = (usable / (FONT_SIZE * AVG_GLYPH_WIDTH)).floor() as usize;
    chars.max(1)
}

/// Place every row's wrapped lines on pages.
///
/// A row starts a new page when it does not fit in the remaining space and
/// the current page already has content. A row taller than a whole page
/// continues on the next page.
pub(crate) fn layout(rows: &[String]) -> Vec<Vec<PlacedLine>> {
    let top = PAGE_HEIGHT - MARGIN;
    let max_chars = max_chars_per_line();

    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut y = top;

    for row in rows {
        let lines = wrap_text(row, max_chars);
        #[allow(clippy::cast_precision_loss)]
        let row_height = lines.len() as f32 * LEADING;

        let page_has_content = pages.last().is_some_and(|p| !p.is_empty());
        if y - row_height < MARGIN && page_has_content {
            pages.push(Vec::new());
            y = top;
        }

        for text in lines {
            if y - LEADING < MARGIN {
                pages.push(Vec::new());
                y = top;
            }
            if let Some(page) = pages.last_mut() {
                page.push(PlacedLine {
                    x: MARGIN,
                    baseline: y - FONT_SIZE,
                    text,
                });
            }
            y -= LEADING;
        }
        y -= ROW_GAP;
    }

    pages
}
