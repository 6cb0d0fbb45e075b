pub mod config;
pub mod core;
pub mod domain;
pub mod export;
pub mod extract;
pub mod llm;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{claim_config::ClaimConfig, cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::SummaryEngine, pipeline::ClaimPipeline};
pub use utils::error::{Result, SummarizerError};
