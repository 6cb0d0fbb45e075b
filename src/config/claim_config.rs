use crate::domain::model::ClaimType;
use crate::utils::error::{Result, SummarizerError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

const VEHICLE_CONFIG: &str = include_str!("../../configs/vehicle_insurance_config.json");
const HEALTH_CONFIG: &str = include_str!("../../configs/health_insurance_config.json");
const LIFE_CONFIG: &str = include_str!("../../configs/life_insurance_config.json");

/// 單一欄位的抽取規則 (依序嘗試的正規表達式)
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarySection {
    pub section_title: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// 理賠類型的欄位規則與摘要分節
#[derive(Debug, Clone, Default)]
pub struct ClaimConfig {
    pub fields: Vec<FieldRule>,
    pub summary_sections: Vec<SummarySection>,
}

#[derive(Debug, Deserialize)]
struct RawClaimConfig {
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    summary_sections: Vec<SummarySection>,
}

impl ClaimConfig {
    /// 先找 `config_dir/<type>_config.json`，沒有指定目錄則用內建規則
    pub fn load(claim_type: ClaimType, config_dir: Option<&Path>) -> Result<Self> {
        match config_dir {
            Some(dir) => {
                let path = dir.join(claim_type.config_file_name());
                tracing::debug!("Loading claim rules from {}", path.display());
                Self::from_file(&path)
            }
            None => Self::builtin(claim_type),
        }
    }

    pub fn builtin(claim_type: ClaimType) -> Result<Self> {
        let content = match claim_type {
            ClaimType::Vehicle => VEHICLE_CONFIG,
            ClaimType::Health => HEALTH_CONFIG,
            ClaimType::Life => LIFE_CONFIG,
        };
        Self::from_json_str(content, &claim_type.config_file_name())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SummarizerError::ConfigError {
                    message: format!("Configuration file not found: {}", path.display()),
                }
            } else {
                SummarizerError::IoError(e)
            }
        })?;
        Self::from_json_str(&content, &path.display().to_string())
    }

    pub fn from_json_str(content: &str, source: &str) -> Result<Self> {
        let raw: RawClaimConfig =
            serde_json::from_str(content).map_err(|e| SummarizerError::ConfigValidationError {
                field: source.to_string(),
                message: format!("Invalid JSON: {}", e),
            })?;

        let mut fields = Vec::with_capacity(raw.fields.len());
        for (name, value) in raw.fields {
            let sources = pattern_sources(&name, value)?;
            let patterns = sources
                .iter()
                .map(|pattern| compile_pattern(&name, pattern))
                .collect::<Result<Vec<_>>>()?;
            fields.push(FieldRule { name, patterns });
        }

        Ok(Self {
            fields,
            summary_sections: raw.summary_sections,
        })
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|rule| rule.name == name)
    }

    /// 分節中引用、但沒有抽取規則的欄位
    pub fn unmapped_section_fields(&self) -> Vec<&str> {
        self.summary_sections
            .iter()
            .flat_map(|section| section.fields.iter())
            .filter(|field| self.field(field).is_none())
            .map(String::as_str)
            .collect()
    }
}

fn pattern_sources(field: &str, value: serde_json::Value) -> Result<Vec<String>> {
    match value {
        serde_json::Value::String(pattern) => Ok(vec![pattern]),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(pattern) => Ok(pattern),
                other => Err(SummarizerError::ConfigValidationError {
                    field: format!("fields.{}", field),
                    message: format!("Pattern must be a string, got {}", other),
                }),
            })
            .collect(),
        other => Err(SummarizerError::ConfigValidationError {
            field: format!("fields.{}", field),
            message: format!("Expected a list of patterns, got {}", other),
        }),
    }
}

fn compile_pattern(field: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| SummarizerError::ConfigValidationError {
            field: format!("fields.{}", field),
            message: format!("Invalid pattern '{}': {}", pattern, e),
        })
}
