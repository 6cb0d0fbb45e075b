//! 以本機 Ollama 模型修正 OCR 文字
//!
//! 預設關閉；任何錯誤都只會讓管線沿用原始文字。

use crate::domain::ports::TextCleaner;
use crate::utils::error::{Result, SummarizerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const CLEANUP_PROMPT: &str = "The following text was produced by OCR from an insurance claim document. \
Correct obvious recognition errors (broken words, misread characters, stray symbols) \
while keeping every number, name and label exactly as written. \
Return only the corrected text with no commentary.\n\n{content}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// 超過此長度的文字不送出
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_content_chars() -> usize {
    12000
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    async fn call_ollama(&self, prompt: String) -> Result<String> {
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'));
        let resp = self.client.post(&url).json(&request).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SummarizerError::LlmError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let ollama_resp: OllamaResponse =
            resp.json().await.map_err(|e| SummarizerError::LlmError {
                message: format!("Unreadable response: {}", e),
            })?;

        Ok(ollama_resp.response)
    }
}

#[async_trait]
impl TextCleaner for LlmClient {
    async fn clean(&self, text: &str) -> Result<String> {
        let length = text.chars().count();
        if length > self.config.max_content_chars {
            debug!(
                "Skipping LLM cleanup: {} chars exceeds limit of {}",
                length, self.config.max_content_chars
            );
            return Ok(text.to_string());
        }

        let prompt = CLEANUP_PROMPT.replace("{content}", text);
        let cleaned = self.call_ollama(prompt).await?;
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(SummarizerError::LlmError {
                message: "Empty cleanup response".to_string(),
            });
        }
        Ok(cleaned.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = LlmConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.max_content_chars, 12000);
    }

    #[test]
    fn test_config_defaults_from_toml() {
        let config: LlmConfig = toml::from_str("enabled = true\nmodel = \"mistral\"").unwrap();
        assert!(config.enabled);
        assert_eq!(config.model, "mistral");
        assert_eq!(config.max_tokens, 4096);
    }

    #[tokio::test]
    async fn test_long_text_is_passed_through() {
        let client = LlmClient::new(LlmConfig {
            enabled: true,
            endpoint: "http://127.0.0.1:9".to_string(),
            max_content_chars: 10,
            ..LlmConfig::default()
        })
        .unwrap();

        let text = "x".repeat(11);
        assert_eq!(client.clean(&text).await.unwrap(), text);
    }
}
