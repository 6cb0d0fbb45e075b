use crate::domain::model::file_name;
use crate::utils::error::{Result, SummarizerError};
use regex::{Captures, Regex};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::LazyLock;
use zip::ZipArchive;

static PARAGRAPH_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</w:p>").expect("valid paragraph regex"));
static TAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:tab\s*/>").expect("valid tab regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<w:(?:br|cr)\b[^>]*/>").expect("valid break regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|lt|gt|amp|quot|apos);").expect("valid entity regex")
});

pub fn extract_docx_text(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    read_docx_text(file).map_err(|e| match e {
        SummarizerError::IoError(_) | SummarizerError::ZipError(_) => {
            SummarizerError::ExtractionError {
                file: file_name(path),
                message: e.to_string(),
            }
        }
        other => other,
    })
}

/// 讀取 `word/document.xml` 並轉成純文字
pub fn read_docx_text<R: Read + Seek>(reader: R) -> Result<String> {
    let mut archive = ZipArchive::new(reader)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;
    Ok(document_xml_to_text(&xml))
}

pub fn document_xml_to_text(xml: &str) -> String {
    let text = PARAGRAPH_END.replace_all(xml, "\n");
    let text = TAB.replace_all(&text, "\t");
    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");
    decode_entities(&text).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = match entity.strip_prefix("#x") {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx_with(document_xml: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_breaks_and_tabs() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>Policy No:</w:t><w:tab/><w:t>AB12345</w:t></w:r></w:p><w:p><w:r><w:t>Line one</w:t><w:br/><w:t>Line two</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(
            document_xml_to_text(xml),
            "Policy No:\tAB12345\nLine one\nLine two"
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let xml = "<w:p><w:t>Tom &amp; Jerry &lt;&#65;&#x42;&gt; &quot;x&quot; &apos;y&apos; &bogus;</w:t></w:p>";
        assert_eq!(
            document_xml_to_text(xml),
            "Tom & Jerry <AB> \"x\" 'y' &bogus;"
        );
    }

    #[test]
    fn test_tab_stops_in_properties_are_ignored() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Name</w:t></w:r></w:p>"#;
        assert_eq!(document_xml_to_text(xml), "Name");
    }

    #[test]
    fn test_read_docx_archive() {
        let bytes = docx_with("<w:p><w:r><w:t>Claim Amount: 45,000</w:t></w:r></w:p>");
        let text = read_docx_text(Cursor::new(bytes)).unwrap();
        assert_eq!(text, "Claim Amount: 45,000");
    }

    #[test]
    fn test_missing_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        assert!(read_docx_text(Cursor::new(bytes)).is_err());
    }
}
