//! LLM narration service.
//!
//! Optional rewrite of template narration by a local model. The default
//! client talks to Ollama's `/api/generate` endpoint.

use crate::error::{AnalyticsError, Result};
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait NarrationService: Send + Sync {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String>;
}

pub struct OllamaNarrator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaNarrator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        if self.base_url.ends_with("/api/generate") {
            self.base_url.clone()
        } else {
            format!("{}/api/generate", self.base_url)
        }
    }
}

#[async_trait]
impl NarrationService for OllamaNarrator {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(self.endpoint())
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyticsError::Narration(format!("Ollama call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AnalyticsError::Narration(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Narration(format!("Failed to parse Ollama response: {}", e)))?;

        let content = response_json["response"]
            .as_str()
            .ok_or_else(|| AnalyticsError::Narration("No response text from Ollama".to_string()))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_accepts_base_or_full_url() {
        assert_eq!(
            OllamaNarrator::new("http://localhost:11434/", "llama3:latest").endpoint(),
            "http://localhost:11434/api/generate"
        );
        assert_eq!(
            OllamaNarrator::new("http://localhost:11434/api/generate", "llama3:latest").endpoint(),
            "http://localhost:11434/api/generate"
        );
    }
}
