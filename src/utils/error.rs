use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unsupported document '{file}': {detail}")]
    UnsupportedDocument { file: String, detail: String },

    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("Text extraction failed for '{file}': {message}")]
    ExtractionError { file: String, message: String },

    #[error("No text could be extracted from any of the {attempted} document(s)")]
    NoDocumentsExtracted { attempted: usize },

    #[error("Language model error: {message}")]
    LlmError { message: String },

    #[error("Export to {format} failed: {message}")]
    ExportError { format: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    ExternalTool,
    Network,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SummarizerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::UnsupportedDocument { .. }
            | Self::NoDocumentsExtracted { .. }
            | Self::ValidationError { .. } => ErrorCategory::Input,
            Self::ToolNotFound { .. } | Self::ExtractionError { .. } => {
                ErrorCategory::ExternalTool
            }
            Self::HttpError(_) | Self::LlmError { .. } => ErrorCategory::Network,
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::ExportError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::LlmError { .. } => ErrorSeverity::Low,
            Self::HttpError(_) | Self::ExtractionError { .. } => ErrorSeverity::Medium,
            Self::IoError(_) | Self::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ConfigError { .. } | Self::ConfigValidationError { .. } => {
                "Check the claim-type configuration JSON and the run configuration file".to_string()
            }
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and run again", field)
            }
            Self::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            Self::UnsupportedDocument { .. } => {
                "Use PDF, DOCX, TXT or image (PNG/JPG/TIFF) documents".to_string()
            }
            Self::ToolNotFound { tool } => match tool.as_str() {
                "tesseract" => "Install tesseract-ocr to read scanned documents".to_string(),
                "pdftotext" | "pdftoppm" => "Install poppler-utils to read PDF documents".to_string(),
                other => format!("Install '{}' and make sure it is on PATH", other),
            },
            Self::ExtractionError { .. } => {
                "Check that the document opens correctly and is not password protected".to_string()
            }
            Self::NoDocumentsExtracted { .. } => {
                "Check the input paths and that OCR dependencies are installed".to_string()
            }
            Self::HttpError(_) | Self::LlmError { .. } => {
                "Check that the language model server is running, or disable LLM cleanup".to_string()
            }
            Self::ExportError { .. } | Self::ZipError(_) | Self::CsvError(_) => {
                "Try a different export format or output directory".to_string()
            }
            Self::IoError(_) => "Check file permissions and free disk space".to_string(),
            Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Run again with --verbose and report the log".to_string()
            }
            Self::ValidationError { .. } => "Fix the reported input and run again".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Input problem: {}", self),
            ErrorCategory::ExternalTool => format!("Document reading problem: {}", self),
            ErrorCategory::Network => format!("Language model problem: {}", self),
            ErrorCategory::Processing => format!("Processing problem: {}", self),
            ErrorCategory::Output => format!("Could not write the summary: {}", self),
        }
    }

    /// 對應 CLI 結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SummarizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_suggests_package() {
        let err = SummarizerError::ToolNotFound {
            tool: "tesseract".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::ExternalTool);
        assert!(err.recovery_suggestion().contains("tesseract-ocr"));
    }

    #[test]
    fn test_exit_codes_follow_severity() {
        let llm = SummarizerError::LlmError {
            message: "timeout".to_string(),
        };
        let config = SummarizerError::ConfigError {
            message: "bad".to_string(),
        };
        let io = SummarizerError::IoError(std::io::Error::other("disk"));

        assert_eq!(llm.exit_code(), 0);
        assert_eq!(config.exit_code(), 1);
        assert_eq!(io.exit_code(), 3);
    }
}
