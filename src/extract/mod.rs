//! 文件類型判斷與純文字抽取

pub mod command;
pub mod docx;

pub use command::CommandLineExtractor;

use crate::domain::model::{file_name, DocumentKind};
use crate::utils::error::{Result, SummarizerError};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 可以直接辨識的副檔名
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "txt", "text", "md", "csv", "log", "png", "jpg", "jpeg", "tif", "tiff", "bmp",
    "gif",
];

const SNIFF_BYTES: usize = 8192;
const PREVIEW_CHARS: usize = 1500;

pub fn detect_kind(path: &Path) -> Result<DocumentKind> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => Ok(DocumentKind::Pdf),
        Some("docx") => Ok(DocumentKind::Docx),
        Some("txt" | "text" | "md" | "csv" | "log") => Ok(DocumentKind::Text),
        Some("png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "gif") => Ok(DocumentKind::Image),
        Some(other) => Err(SummarizerError::UnsupportedDocument {
            file: file_name(path),
            detail: format!("unsupported extension '.{}'", other),
        }),
        None => sniff_kind(path),
    }
}

/// 沒有副檔名時讀取檔頭判斷
fn sniff_kind(path: &Path) -> Result<DocumentKind> {
    let mut buffer = Vec::with_capacity(SNIFF_BYTES);
    File::open(path)?
        .take(SNIFF_BYTES as u64)
        .read_to_end(&mut buffer)?;

    if let Some(detected) = infer::get(&buffer) {
        let mime = detected.mime_type();
        tracing::debug!("Sniffed {} as {}", path.display(), mime);
        return match mime {
            "application/pdf" => Ok(DocumentKind::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(DocumentKind::Docx)
            }
            m if m.starts_with("image/") => Ok(DocumentKind::Image),
            other => Err(SummarizerError::UnsupportedDocument {
                file: file_name(path),
                detail: format!("content type {}", other),
            }),
        };
    }

    if looks_like_text(&buffer) {
        Ok(DocumentKind::Text)
    } else {
        Err(SummarizerError::UnsupportedDocument {
            file: file_name(path),
            detail: "unrecognized binary content".to_string(),
        })
    }
}

fn looks_like_text(buffer: &[u8]) -> bool {
    if buffer.contains(&0) {
        return false;
    }
    match std::str::from_utf8(buffer) {
        Ok(_) => true,
        // 截斷在多位元組字元中間
        Err(e) => e.error_len().is_none(),
    }
}

/// 原始文字預覽：前 1500 字元，過長則加上 "..."
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// 非空白字元數，用來判斷 PDF 是否需要 OCR
pub fn meaningful_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_detect_kind_by_extension() {
        assert_eq!(detect_kind(Path::new("a/claim.PDF")).unwrap(), DocumentKind::Pdf);
        assert_eq!(detect_kind(Path::new("form.docx")).unwrap(), DocumentKind::Docx);
        assert_eq!(detect_kind(Path::new("notes.txt")).unwrap(), DocumentKind::Text);
        assert_eq!(detect_kind(Path::new("scan.JPeg")).unwrap(), DocumentKind::Image);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = detect_kind(Path::new("sheet.xlsx")).unwrap_err();
        assert!(matches!(err, SummarizerError::UnsupportedDocument { .. }));
        assert!(err.to_string().contains("sheet.xlsx"));
    }

    #[test]
    fn test_sniff_without_extension() {
        let dir = TempDir::new().unwrap();

        let pdf = dir.path().join("scan");
        std::fs::write(&pdf, b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n").unwrap();
        assert_eq!(detect_kind(&pdf).unwrap(), DocumentKind::Pdf);

        let png = dir.path().join("photo");
        std::fs::write(&png, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]).unwrap();
        assert_eq!(detect_kind(&png).unwrap(), DocumentKind::Image);

        let text = dir.path().join("README");
        let mut file = File::create(&text).unwrap();
        writeln!(file, "Policy No: ABC12345").unwrap();
        assert_eq!(detect_kind(&text).unwrap(), DocumentKind::Text);

        let binary = dir.path().join("blob");
        std::fs::write(&binary, [0u8, 159, 146, 150, 0, 1]).unwrap();
        assert!(detect_kind(&binary).is_err());
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let short = "Claim form";
        assert_eq!(preview(short), short);

        let long = "é".repeat(1600);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 1503);

        let exact = "a".repeat(1500);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_meaningful_chars_ignores_whitespace() {
        assert_eq!(meaningful_chars(" a \n b\t"), 2);
    }
}
