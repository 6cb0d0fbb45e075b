//! 摘要報告匯出成各種下載格式

pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod tabular;

use crate::domain::model::{ExportFormat, SummaryReport};
use crate::utils::error::{Result, SummarizerError};
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub const OUTPUT_STEM: &str = "insurance_summary";

pub fn output_file_name(format: ExportFormat) -> String {
    format!("{}.{}", OUTPUT_STEM, format.extension())
}

pub fn bundle_file_name() -> String {
    format!("{}.zip", OUTPUT_STEM)
}

pub fn render(report: &SummaryReport, format: ExportFormat) -> Result<Vec<u8>> {
    let text = report.full_text();
    let rendered = match format {
        ExportFormat::Pdf => Ok(pdf::render_pdf(&text)),
        ExportFormat::Docx => docx::render_docx(&text),
        ExportFormat::Pptx => pptx::render_pptx(&text),
        ExportFormat::Markdown => Ok(text.into_bytes()),
        ExportFormat::Text => Ok(tabular::render_plain_text(&text).into_bytes()),
        ExportFormat::Json => tabular::render_json(report),
        ExportFormat::Csv => tabular::render_csv(report),
    };

    rendered.map_err(|e| match e {
        SummarizerError::ZipError(_)
        | SummarizerError::IoError(_)
        | SummarizerError::CsvError(_)
        | SummarizerError::SerializationError(_) => SummarizerError::ExportError {
            format: format.label().to_string(),
            message: e.to_string(),
        },
        other => other,
    })
}

/// 依序輸出每個格式 (重複的格式只輸出一次)
pub fn render_all(
    report: &SummaryReport,
    formats: &[ExportFormat],
) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::with_capacity(formats.len());
    let mut seen = Vec::with_capacity(formats.len());

    for &format in formats {
        if seen.contains(&format) {
            continue;
        }
        seen.push(format);

        let data = render(report, format)?;
        tracing::debug!("Rendered {} ({} bytes)", format, data.len());
        files.push((output_file_name(format), data));
    }

    Ok(files)
}

/// 所有輸出打包成一個 ZIP
pub fn bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, data) in files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }

    Ok(zip.finish()?.into_inner())
}

/// 組成 OOXML 套件；第一個部件必須是 `[Content_Types].xml`
pub(crate) fn write_package(parts: &[(String, String)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, content) in parts {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

pub(crate) fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            // XML 1.0 不允許的控制字元
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => escaped.push(c),
        }
    }
    escaped
}
