use crate::utils::error::{Result, SummarizerError};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SummarizerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 輸入文件必須存在；有副檔名時必須在允許清單內 (沒有副檔名的交給內容偵測)
pub fn validate_document_paths<P: AsRef<Path>>(
    field_name: &str,
    files: &[P],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let path = file.as_ref();
        if !path.is_file() {
            return Err(SummarizerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: path.display().to_string(),
                reason: "File does not exist".to_string(),
            });
        }

        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            let extension = extension.to_ascii_lowercase();
            if !allowed_set.contains(extension.as_str()) {
                return Err(SummarizerError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: path.display().to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SummarizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("llm.endpoint", "http://localhost:11434").is_ok());
        assert!(validate_url("llm.endpoint", "https://example.com").is_ok());
        assert!(validate_url("llm.endpoint", "").is_err());
        assert!(validate_url("llm.endpoint", "invalid-url").is_err());
        assert!(validate_url("llm.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("concurrent_documents", 4, 1).is_ok());
        assert!(validate_positive_number("concurrent_documents", 0, 1).is_err());
    }

    #[test]
    fn test_validate_document_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("claim.TXT");
        let bad = dir.path().join("claim.exe");
        std::fs::File::create(&good).unwrap().write_all(b"x").unwrap();
        std::fs::File::create(&bad).unwrap().write_all(b"x").unwrap();

        assert!(validate_document_paths("documents", &[&good], &["txt", "pdf"]).is_ok());
        assert!(validate_document_paths("documents", &[&bad], &["txt", "pdf"]).is_err());
        assert!(validate_document_paths(
            "documents",
            &[dir.path().join("missing.pdf")],
            &["pdf"]
        )
        .is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("llm.temperature", 0.2_f32, 0.0, 2.0).is_ok());
        assert!(validate_range("llm.temperature", 3.0_f32, 0.0, 2.0).is_err());
    }
}
