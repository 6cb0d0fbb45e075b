//! 透過 poppler-utils 與 tesseract 外部指令抽取文字

use super::{docx, meaningful_chars};
use crate::domain::model::{file_name, DocumentKind, ExtractionMethod};
use crate::domain::ports::TextExtractor;
use crate::utils::error::{Result, SummarizerError};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use tempfile::TempDir;
use tracing::{debug, warn};

const PDFTOTEXT: &str = "pdftotext";
const PDFTOPPM: &str = "pdftoppm";
const TESSERACT: &str = "tesseract";

fn handle_cmd_output(result: std::io::Result<Output>, tool: &str, file: &Path) -> Result<String> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => Err(SummarizerError::ExtractionError {
            file: file_name(file),
            message: format!(
                "{} failed: {}",
                tool,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SummarizerError::ToolNotFound {
                tool: tool.to_string(),
            })
        }
        Err(e) => Err(SummarizerError::IoError(e)),
    }
}

fn check_cmd_status(
    result: std::io::Result<ExitStatus>,
    tool: &str,
    file: &Path,
) -> Result<()> {
    match result {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(SummarizerError::ExtractionError {
            file: file_name(file),
            message: format!("{} exited with {}", tool, status),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SummarizerError::ToolNotFound {
                tool: tool.to_string(),
            })
        }
        Err(e) => Err(SummarizerError::IoError(e)),
    }
}

#[derive(Debug, Clone)]
pub struct CommandLineExtractor {
    /// pdftotext 結果少於此數量的非空白字元時改用 OCR
    min_chars: usize,
    tesseract_lang: String,
}

impl Default for CommandLineExtractor {
    fn default() -> Self {
        Self {
            min_chars: 50,
            tesseract_lang: "eng".to_string(),
        }
    }
}

impl CommandLineExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    pub fn with_language(mut self, lang: &str) -> Self {
        self.tesseract_lang = lang.to_string();
        self
    }

    fn extract_pdf(&self, path: &Path) -> Result<(String, ExtractionMethod)> {
        let text = self.run_pdftotext(path)?;
        let chars = meaningful_chars(&text);
        if chars >= self.min_chars {
            return Ok((text, ExtractionMethod::PdfToText));
        }

        debug!(
            "{} has only {} text chars, trying OCR",
            path.display(),
            chars
        );
        match self.ocr_pdf(path) {
            Ok(ocr_text) if meaningful_chars(&ocr_text) > chars + chars / 5 => {
                let method = if chars == 0 {
                    ExtractionMethod::Ocr
                } else {
                    ExtractionMethod::Hybrid
                };
                Ok((ocr_text, method))
            }
            Ok(_) => Ok((text, ExtractionMethod::PdfToText)),
            Err(e) if chars == 0 => Err(e),
            Err(e) => {
                warn!("OCR fallback failed for {}: {}", path.display(), e);
                Ok((text, ExtractionMethod::PdfToText))
            }
        }
    }

    fn run_pdftotext(&self, path: &Path) -> Result<String> {
        let output = Command::new(PDFTOTEXT)
            .arg("-layout")
            .arg(path)
            .arg("-")
            .output();
        handle_cmd_output(output, PDFTOTEXT, path)
    }

    fn ocr_pdf(&self, path: &Path) -> Result<String> {
        let temp_dir = TempDir::new()?;
        let temp_path = temp_dir.path();

        let status = Command::new(PDFTOPPM)
            .args(["-png", "-r", "300"])
            .arg(path)
            .arg(temp_path.join("page"))
            .status();
        check_cmd_status(status, PDFTOPPM, path)?;

        let mut images: Vec<PathBuf> = std::fs::read_dir(temp_path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        images.sort();

        if images.is_empty() {
            return Err(SummarizerError::ExtractionError {
                file: file_name(path),
                message: "no page images produced".to_string(),
            });
        }

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            match self.run_tesseract(image) {
                Ok(text) => pages.push(text),
                Err(e @ SummarizerError::ToolNotFound { .. }) => return Err(e),
                Err(e) => warn!("OCR failed for page {}: {}", i + 1, e),
            }
        }
        Ok(pages.join("\n\n"))
    }

    fn run_tesseract(&self, image: &Path) -> Result<String> {
        let output = Command::new(TESSERACT)
            .arg(image)
            .arg("stdout")
            .args(["-l", &self.tesseract_lang])
            .output();
        handle_cmd_output(output, TESSERACT, image)
    }

    /// 回報外部工具是否可用
    pub fn check_tools() -> Vec<(String, bool)> {
        [PDFTOTEXT, PDFTOPPM, TESSERACT]
            .iter()
            .map(|tool| {
                let available = Command::new(tool)
                    .arg("-v")
                    .output()
                    .map(|_| true)
                    .unwrap_or(false);
                (tool.to_string(), available)
            })
            .collect()
    }
}

impl TextExtractor for CommandLineExtractor {
    fn extract(&self, path: &Path, kind: DocumentKind) -> Result<(String, ExtractionMethod)> {
        match kind {
            DocumentKind::Pdf => self.extract_pdf(path),
            DocumentKind::Docx => Ok((docx::extract_docx_text(path)?, ExtractionMethod::DocxXml)),
            DocumentKind::Text => {
                let bytes = std::fs::read(path)?;
                Ok((
                    String::from_utf8_lossy(&bytes).into_owned(),
                    ExtractionMethod::PlainText,
                ))
            }
            DocumentKind::Image => Ok((self.run_tesseract(path)?, ExtractionMethod::Ocr)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_text_replaces_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("claim.txt");
        std::fs::write(&path, b"Policy No: AB12345 \xff end").unwrap();

        let (text, method) = CommandLineExtractor::new()
            .extract(&path, DocumentKind::Text)
            .unwrap();
        assert_eq!(method, ExtractionMethod::PlainText);
        assert!(text.starts_with("Policy No: AB12345"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let result = handle_cmd_output(
            Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
            "pdftotext",
            Path::new("a.pdf"),
        );
        assert!(matches!(result, Err(SummarizerError::ToolNotFound { tool }) if tool == "pdftotext"));
    }

    #[test]
    fn test_missing_binary_suggests_package() {
        let output = Command::new("claim-summarizer-no-such-ocr-binary")
            .arg("page.png")
            .output();
        let err = handle_cmd_output(output, TESSERACT, Path::new("page.png")).unwrap_err();
        assert_eq!(
            err.recovery_suggestion(),
            "Install tesseract-ocr to read scanned documents"
        );

        let status = Command::new("claim-summarizer-no-such-pdf-binary").status();
        let err = check_cmd_status(status, PDFTOPPM, Path::new("scan.pdf")).unwrap_err();
        assert_eq!(
            err.recovery_suggestion(),
            "Install poppler-utils to read PDF documents"
        );
    }

    #[test]
    fn test_builder_overrides() {
        let extractor = CommandLineExtractor::new()
            .with_min_chars(10)
            .with_language("eng+hin");
        assert_eq!(extractor.min_chars, 10);
        assert_eq!(extractor.tesseract_lang, "eng+hin");
    }
}
