use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};

/// 理賠文件類型，決定使用哪一份欄位規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Vehicle,
    Health,
    Life,
}

impl ClaimType {
    pub const ALL: [ClaimType; 3] = [ClaimType::Vehicle, ClaimType::Health, ClaimType::Life];

    pub fn display_name(&self) -> &'static str {
        match self {
            ClaimType::Vehicle => "Vehicle Insurance",
            ClaimType::Health => "Health Insurance",
            ClaimType::Life => "Life Insurance",
        }
    }

    /// e.g. `vehicle_insurance_config.json`
    pub fn config_file_name(&self) -> String {
        format!(
            "{}_config.json",
            self.display_name().to_lowercase().replace(' ', "_")
        )
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub fn is_yes(&self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        })
    }
}

/// 審核人員對理賠流程問題的回答
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimAnswers {
    pub policy_assigned: YesNo,
    pub kyc_verified: YesNo,
    pub hospital_network: YesNo,
    pub cashless_facility: YesNo,
    pub fir_filed: YesNo,
}

impl Default for ClaimAnswers {
    fn default() -> Self {
        Self {
            policy_assigned: YesNo::No,
            kyc_verified: YesNo::Yes,
            hospital_network: YesNo::No,
            cashless_facility: YesNo::No,
            fir_filed: YesNo::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    Primary,
    HospitalBill,
    HealthCard,
    FirAffidavit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub role: DocumentRole,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, role: DocumentRole) -> Self {
        Self {
            path: path.into(),
            role,
        }
    }

    pub fn primary(path: impl Into<PathBuf>) -> Self {
        Self::new(path, DocumentRole::Primary)
    }

    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PdfToText,
    Ocr,
    Hybrid,
    DocxXml,
    PlainText,
}

/// 單一文件抽出的純文字
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// 原始文字的索引鍵 (例如 `HospitalBill_bill.pdf`)
    pub key: String,
    pub document: SourceDocument,
    pub kind: DocumentKind,
    pub method: ExtractionMethod,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionFailure {
    pub name: String,
    pub reason: String,
}

/// 抽取階段的產出
#[derive(Debug, Clone, Default)]
pub struct ExtractionBatch {
    pub texts: Vec<ExtractedText>,
    pub failures: Vec<ExtractionFailure>,
    /// 只登記、不抽取的文件 (健保卡)
    pub acknowledged: Vec<SourceDocument>,
    pub warnings: Vec<String>,
}

/// 依插入順序保存的欄位摘要
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSummary {
    entries: Vec<(String, String)>,
}

impl ClaimSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// 覆寫或新增
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    /// 欄位不存在或值為空白時才寫入；回傳是否寫入
    pub fn insert_if_missing(&mut self, field: &str, value: &str) -> bool {
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some(entry) if entry.1.trim().is_empty() => {
                entry.1 = value.to_string();
                true
            }
            Some(_) => false,
            None => {
                self.entries.push((field.to_string(), value.to_string()));
                true
            }
        }
    }

    /// 先到先贏地合併另一份摘要
    pub fn merge_missing(&mut self, other: &ClaimSummary) -> usize {
        other
            .iter()
            .filter(|(field, value)| self.insert_if_missing(field, value))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ClaimSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRecord {
    pub key: String,
    pub path: PathBuf,
    pub role: DocumentRole,
    pub kind: Option<DocumentKind>,
    pub method: Option<ExtractionMethod>,
    pub characters: usize,
    pub extracted: bool,
}

/// 轉換階段的產出，也是所有匯出格式的來源
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub claim_type: ClaimType,
    pub generated_at: DateTime<Utc>,
    pub answers: ClaimAnswers,
    pub preamble: Vec<String>,
    pub sections: Vec<ReportSection>,
    pub body: String,
    pub summary: ClaimSummary,
    pub sources: Vec<SourceRecord>,
    pub failures: Vec<ExtractionFailure>,
    pub warnings: Vec<String>,
}

impl SummaryReport {
    /// 下載檔的完整內容：問答前言 + 空行 + 分節摘要
    pub fn full_text(&self) -> String {
        let mut text: String = self
            .preamble
            .iter()
            .map(|line| format!("{}\n", line))
            .collect();
        text.push('\n');
        text.push_str(&self.body);
        text
    }

    pub fn has_content(&self) -> bool {
        !self.summary.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
    Pptx,
    #[serde(alias = "md")]
    #[cfg_attr(feature = "cli", value(alias = "md"))]
    Markdown,
    #[serde(alias = "txt")]
    #[cfg_attr(feature = "cli", value(alias = "txt"))]
    Text,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Pptx => "pptx",
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Text => "text/plain",
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Docx => "Word (DOCX)",
            ExportFormat::Pptx => "PowerPoint (PPTX)",
            ExportFormat::Markdown => "Markdown",
            ExportFormat::Text => "Plain text",
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
