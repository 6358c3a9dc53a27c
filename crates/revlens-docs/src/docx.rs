//! Minimal WordprocessingML export: one paragraph per line of text.

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::DocsError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

/// Build a `.docx` package whose body holds `text`.
///
/// # Errors
///
/// [`DocsError::Zip`] if the archive cannot be written.
pub fn docx_bytes(text: &str) -> Result<Vec<u8>, DocsError> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES.to_owned()),
        ("_rels/.rels", ROOT_RELS.to_owned()),
        ("word/document.xml", document_xml(text)),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())
            .map_err(zip::result::ZipError::from)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Write `text` as a Word document at `path`.
///
/// # Errors
///
/// Returns [`DocsError`] if packaging or the file write fails.
pub fn export_docx(text: &str, path: &Path) -> Result<(), DocsError> {
    let bytes = docx_bytes(text)?;
    std::fs::write(path, bytes).map_err(|e| DocsError::io(path, e))?;
    tracing::info!(path = %path.display(), "exported document");
    Ok(())
}

fn document_xml(text: &str) -> String {
    let mut xml = String::from(DOCUMENT_HEAD);
    for line in text.lines() {
        let cleaned: String = line.chars().filter(|c| is_xml_char(*c)).collect();
        if cleaned.is_empty() {
            xml.push_str("<w:p/>");
        } else {
            xml.push_str("<w:p><w:r><w:t xml:space=\"preserve\">");
            xml.push_str(&quick_xml::escape::escape(cleaned.as_str()));
            xml.push_str("</w:t></w:r></w:p>");
        }
    }
    xml.push_str(DOCUMENT_TAIL);
    xml
}

/// XML 1.0 forbids most C0 control characters.
fn is_xml_char(c: char) -> bool {
    !c.is_control() || c == '\t'
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = docx_bytes("hello").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"[Content_Types].xml"));
        assert!(names.contains(&"_rels/.rels"));
        assert!(names.contains(&"word/document.xml"));
    }

    #[test]
    fn each_line_becomes_a_paragraph() {
        let bytes = docx_bytes("- quiet\n\n- powerful").unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert_eq!(xml.matches("<w:p>").count(), 2);
        assert_eq!(xml.matches("<w:p/>").count(), 1);
        assert!(xml.contains(">- quiet<"));
        assert!(xml.contains(">- powerful<"));
    }

    #[test]
    fn markup_characters_are_escaped() {
        let bytes = docx_bytes("Price < $50 & \"worth it\"").unwrap();
        let xml = read_part(&bytes, "word/document.xml");
        assert!(xml.contains("Price &lt; $50 &amp; &quot;worth it&quot;"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let xml = document_xml("bell\u{7}here");
        assert!(xml.contains(">bellhere<"));
    }
}
