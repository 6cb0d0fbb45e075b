use crate::core::ConfigProvider;
use crate::domain::model::{ClaimAnswers, ClaimType, DocumentRole, ExportFormat, SourceDocument};
use crate::extract::SUPPORTED_EXTENSIONS;
use crate::llm::LlmConfig;
use crate::utils::error::{Result, SummarizerError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: RunConfig,
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub answers: ClaimAnswers,
    #[serde(default)]
    pub export: ExportConfig,
    pub llm: Option<LlmConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub claim_type: ClaimType,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    pub config_dir: Option<PathBuf>,
    pub concurrent_documents: Option<usize>,
    pub show_text: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default)]
    pub primary: Vec<PathBuf>,
    #[serde(default)]
    pub hospital_bills: Vec<PathBuf>,
    #[serde(default)]
    pub health_cards: Vec<PathBuf>,
    #[serde(default)]
    pub fir_documents: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
    #[serde(default)]
    pub bundle: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            bundle: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_json: Option<bool>,
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Pdf]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SummarizerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CLAIMS_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 相對路徑以設定檔所在目錄為基準
    fn resolve_relative_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        let output = Path::new(&self.run.output_path);
        if !self.run.output_path.is_empty() && output.is_relative() {
            self.run.output_path = base.join(output).to_string_lossy().into_owned();
        }
        if let Some(dir) = self.run.config_dir.as_mut() {
            resolve(dir);
        }
        self.documents
            .primary
            .iter_mut()
            .chain(self.documents.hospital_bills.iter_mut())
            .chain(self.documents.health_cards.iter_mut())
            .chain(self.documents.fir_documents.iter_mut())
            .for_each(resolve);
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("run.output_path", &self.run.output_path)?;

        if let Some(concurrent) = self.run.concurrent_documents {
            validation::validate_positive_number("run.concurrent_documents", concurrent, 1)?;
        }

        if self.documents.primary.is_empty() {
            return Err(SummarizerError::MissingConfigError {
                field: "documents.primary".to_string(),
            });
        }

        let paths: Vec<PathBuf> = self
            .documents()
            .into_iter()
            .map(|document| document.path)
            .collect();
        validation::validate_document_paths("documents", &paths, SUPPORTED_EXTENSIONS)?;

        if self.export.formats.is_empty() {
            return Err(SummarizerError::MissingConfigError {
                field: "export.formats".to_string(),
            });
        }

        if let Some(dir) = &self.run.config_dir {
            if !dir.is_dir() {
                return Err(SummarizerError::InvalidConfigValueError {
                    field: "run.config_dir".to_string(),
                    value: dir.display().to_string(),
                    reason: "Directory does not exist".to_string(),
                });
            }
        }

        if let Some(llm) = self.llm.as_ref().filter(|llm| llm.enabled) {
            validation::validate_url("llm.endpoint", &llm.endpoint)?;
            validation::validate_non_empty_string("llm.model", &llm.model)?;
            validation::validate_range("llm.temperature", llm.temperature, 0.0, 2.0)?;
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.run.output_path
    }

    fn claim_type(&self) -> ClaimType {
        self.run.claim_type
    }

    fn documents(&self) -> Vec<SourceDocument> {
        let roles = [
            (&self.documents.primary, DocumentRole::Primary),
            (&self.documents.hospital_bills, DocumentRole::HospitalBill),
            (&self.documents.health_cards, DocumentRole::HealthCard),
            (&self.documents.fir_documents, DocumentRole::FirAffidavit),
        ];
        roles
            .into_iter()
            .flat_map(|(paths, role)| {
                paths
                    .iter()
                    .map(move |path| SourceDocument::new(path.clone(), role))
            })
            .collect()
    }

    fn answers(&self) -> ClaimAnswers {
        self.answers
    }

    fn export_formats(&self) -> &[ExportFormat] {
        &self.export.formats
    }

    fn bundle(&self) -> bool {
        self.export.bundle
    }

    fn concurrent_documents(&self) -> usize {
        self.run.concurrent_documents.unwrap_or(4)
    }

    fn config_dir(&self) -> Option<&Path> {
        self.run.config_dir.as_deref()
    }

    fn llm(&self) -> Option<LlmConfig> {
        self.llm.clone()
    }

    fn show_text(&self) -> bool {
        self.run.show_text.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const BASIC: &str = r#"
[run]
claim_type = "health"
output_path = "./summaries"
concurrent_documents = 2

[documents]
primary = ["claim_form.pdf", "discharge.docx"]
hospital_bills = ["bill.pdf"]

[answers]
hospital_network = "yes"
cashless_facility = "no"

[export]
formats = ["pdf", "md", "json"]
bundle = true
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.claim_type(), ClaimType::Health);
        assert_eq!(config.output_path(), "./summaries");
        assert_eq!(config.concurrent_documents(), 2);
        assert!(config.answers().hospital_network.is_yes());
        assert!(!config.answers().policy_assigned.is_yes());
        assert!(config.answers().kyc_verified.is_yes());
        assert_eq!(
            config.export_formats(),
            &[ExportFormat::Pdf, ExportFormat::Markdown, ExportFormat::Json]
        );
        assert!(config.bundle());
        assert!(config.llm().is_none());
        assert!(!config.monitoring_enabled());

        let docs = config.documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2].role, DocumentRole::HospitalBill);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = TomlConfig::from_toml_str(
            r#"
[run]
claim_type = "vehicle"

[documents]
primary = ["survey.pdf"]
"#,
        )
        .unwrap();

        assert_eq!(config.output_path(), "./output");
        assert_eq!(config.export_formats(), &[ExportFormat::Pdf]);
        assert_eq!(config.answers(), ClaimAnswers::default());
        assert_eq!(config.concurrent_documents(), 4);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLAIM_SUMMARY_TEST_OUT", "/tmp/claim-out");

        let config = TomlConfig::from_toml_str(
            r#"
[run]
claim_type = "life"
output_path = "${CLAIM_SUMMARY_TEST_OUT}"

[documents]
primary = ["${CLAIM_SUMMARY_UNSET_VAR}/death_certificate.pdf"]
"#,
        )
        .unwrap();
        assert_eq!(config.output_path(), "/tmp/claim-out");
        assert_eq!(
            config.documents()[0].path,
            PathBuf::from("${CLAIM_SUMMARY_UNSET_VAR}/death_certificate.pdf")
        );

        std::env::remove_var("CLAIM_SUMMARY_TEST_OUT");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[run]\nclaim_type = \"boat\"").unwrap_err();
        assert!(matches!(err, SummarizerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();
        // 文件不存在
        assert!(config.validate().is_err());

        let config = TomlConfig::from_toml_str(
            r#"
[run]
claim_type = "vehicle"

[documents]
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SummarizerError::MissingConfigError { .. }));
    }

    #[test]
    fn test_config_from_file_resolves_relative_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("claim.txt"), "Claim Number: CLM1234").unwrap();

        let toml_path = dir.path().join("claim.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        file.write_all(
            br#"
[run]
claim_type = "vehicle"
output_path = "summaries"

[documents]
primary = ["claim.txt"]

[llm]
enabled = true
endpoint = "http://localhost:11434"
model = "llama3.1:8b"
"#,
        )
        .unwrap();

        let config = TomlConfig::from_file(&toml_path).unwrap();
        assert_eq!(config.documents()[0].path, dir.path().join("claim.txt"));
        assert_eq!(
            PathBuf::from(config.output_path()),
            dir.path().join("summaries")
        );
        assert!(config.llm().unwrap().enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_named_temp_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[run]\nclaim_type = \"life\"\noutput_path = \"/abs/out\"\n\n[documents]\nprimary = [\"/abs/claim.pdf\"]\n\n[monitoring]\nenabled = true\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.claim_type(), ClaimType::Life);
        assert_eq!(config.documents()[0].path, PathBuf::from("/abs/claim.pdf"));
        assert_eq!(config.output_path(), "/abs/out");
        assert!(config.monitoring_enabled());
    }
}
