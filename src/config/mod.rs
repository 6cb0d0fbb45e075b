pub mod claim_config;
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{
    ClaimAnswers, ClaimType, DocumentRole, ExportFormat, SourceDocument, YesNo,
};
#[cfg(feature = "cli")]
use crate::extract::SUPPORTED_EXTENSIONS;
#[cfg(feature = "cli")]
use crate::llm::LlmConfig;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, SummarizerError};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "claim-summarizer")]
#[command(about = "Summarize insurance claim documents into structured reports")]
pub struct CliConfig {
    /// Primary claim documents (PDF, DOCX, TXT or scanned images)
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    #[arg(long, value_enum, default_value = "vehicle")]
    pub claim_type: ClaimType,

    /// Directory holding <type>_insurance_config.json rule files
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, value_delimiter = ',', default_value = "pdf")]
    pub formats: Vec<ExportFormat>,

    /// Pack every output file into insurance_summary.zip
    #[arg(long)]
    pub bundle: bool,

    #[arg(long, default_value = "4")]
    pub concurrent_documents: usize,

    #[arg(long, value_enum, default_value = "no")]
    pub policy_assigned: YesNo,

    #[arg(long, value_enum, default_value = "yes")]
    pub kyc_verified: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub hospital_network: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub cashless: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub fir_filed: YesNo,

    /// Hospital bill (repeatable)
    #[arg(long = "hospital-bill")]
    pub hospital_bills: Vec<PathBuf>,

    /// Health insurance card (repeatable)
    #[arg(long = "health-card")]
    pub health_cards: Vec<PathBuf>,

    /// FIR copy or affidavit (repeatable)
    #[arg(long = "fir-document")]
    pub fir_documents: Vec<PathBuf>,

    #[arg(long, help = "Print a preview of each extracted text")]
    pub show_text: bool,

    #[arg(long, help = "Clean OCR text with a local Ollama model")]
    pub llm_cleanup: bool,

    #[arg(long, default_value = "http://localhost:11434")]
    pub llm_endpoint: String,

    #[arg(long, default_value = "llama3.1:8b")]
    pub llm_model: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    fn all_document_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.documents
            .iter()
            .chain(&self.hospital_bills)
            .chain(&self.health_cards)
            .chain(&self.fir_documents)
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn claim_type(&self) -> ClaimType {
        self.claim_type
    }

    fn documents(&self) -> Vec<SourceDocument> {
        let roles = [
            (&self.documents, DocumentRole::Primary),
            (&self.hospital_bills, DocumentRole::HospitalBill),
            (&self.health_cards, DocumentRole::HealthCard),
            (&self.fir_documents, DocumentRole::FirAffidavit),
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
        ClaimAnswers {
            policy_assigned: self.policy_assigned,
            kyc_verified: self.kyc_verified,
            hospital_network: self.hospital_network,
            cashless_facility: self.cashless,
            fir_filed: self.fir_filed,
        }
    }

    fn export_formats(&self) -> &[ExportFormat] {
        &self.formats
    }

    fn bundle(&self) -> bool {
        self.bundle
    }

    fn concurrent_documents(&self) -> usize {
        self.concurrent_documents
    }

    fn config_dir(&self) -> Option<&Path> {
        self.config_dir.as_deref()
    }

    fn llm(&self) -> Option<LlmConfig> {
        self.llm_cleanup.then(|| LlmConfig {
            enabled: true,
            endpoint: self.llm_endpoint.clone(),
            model: self.llm_model.clone(),
            ..LlmConfig::default()
        })
    }

    fn show_text(&self) -> bool {
        self.show_text
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("concurrent_documents", self.concurrent_documents, 1)?;

        let paths: Vec<&PathBuf> = self.all_document_paths().collect();
        validation::validate_document_paths("documents", &paths, SUPPORTED_EXTENSIONS)?;

        if self.formats.is_empty() {
            return Err(SummarizerError::MissingConfigError {
                field: "formats".to_string(),
            });
        }

        if let Some(dir) = &self.config_dir {
            if !dir.is_dir() {
                return Err(SummarizerError::InvalidConfigValueError {
                    field: "config_dir".to_string(),
                    value: dir.display().to_string(),
                    reason: "Directory does not exist".to_string(),
                });
            }
        }

        if self.llm_cleanup {
            validation::validate_url("llm_endpoint", &self.llm_endpoint)?;
            validation::validate_non_empty_string("llm_model", &self.llm_model)?;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("claim-summarizer").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["claim.pdf"]);
        assert_eq!(config.claim_type, ClaimType::Vehicle);
        assert_eq!(config.formats, vec![ExportFormat::Pdf]);
        assert_eq!(config.answers(), ClaimAnswers::default());
        assert_eq!(config.output_path, "./output");
        assert!(config.llm().is_none());
    }

    #[test]
    fn test_documents_keep_roles() {
        let config = parse(&[
            "claim.pdf",
            "form.docx",
            "--claim-type",
            "health",
            "--hospital-bill",
            "bill.pdf",
            "--health-card",
            "card.png",
            "--formats",
            "pdf,md,json",
        ]);

        let docs = config.documents();
        let roles: Vec<_> = docs.iter().map(|d| d.role).collect();
        assert_eq!(
            roles,
            vec![
                DocumentRole::Primary,
                DocumentRole::Primary,
                DocumentRole::HospitalBill,
                DocumentRole::HealthCard
            ]
        );
        assert_eq!(
            config.formats,
            vec![ExportFormat::Pdf, ExportFormat::Markdown, ExportFormat::Json]
        );
    }

    #[test]
    fn test_answers_and_llm() {
        let config = parse(&[
            "claim.pdf",
            "--hospital-network",
            "yes",
            "--cashless",
            "yes",
            "--kyc-verified",
            "no",
            "--llm-cleanup",
            "--llm-model",
            "mistral",
        ]);
        let answers = config.answers();
        assert!(answers.hospital_network.is_yes());
        assert!(answers.cashless_facility.is_yes());
        assert_eq!(answers.kyc_verified, YesNo::No);

        let llm = config.llm().unwrap();
        assert!(llm.enabled);
        assert_eq!(llm.model, "mistral");
    }

    #[test]
    fn test_missing_documents_is_parse_error() {
        assert!(CliConfig::try_parse_from(["claim-summarizer"]).is_err());
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let claim = dir.path().join("claim.txt");
        std::fs::write(&claim, "Policy No: ABC12345").unwrap();
        let claim = claim.to_string_lossy().into_owned();
        let claim = claim.as_str();

        assert!(parse(&[claim]).validate().is_ok());
        assert!(parse(&["missing.pdf"]).validate().is_err());
        assert!(parse(&[claim, "--concurrent-documents", "0"]).validate().is_err());
        assert!(parse(&[claim, "--llm-cleanup", "--llm-endpoint", "ftp://x"])
            .validate()
            .is_err());

        let sheet = dir.path().join("sheet.xlsx");
        std::fs::write(&sheet, "x").unwrap();
        let sheet = sheet.to_string_lossy().into_owned();
        let err = parse(&[sheet.as_str()]).validate().unwrap_err();
        assert!(err.to_string().contains("sheet.xlsx"));
    }
}
