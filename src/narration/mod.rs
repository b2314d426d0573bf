//! Narration
//!
//! Template text is always produced first. When a [`NarrationService`] is
//! configured its output may replace the template, but only if it arrives
//! within the timeout and passes the length check; otherwise the template is
//! used and the failure is logged, never surfaced.

pub mod format;
pub mod llm;
pub mod template;

pub use format::*;
pub use llm::*;
pub use template::*;

use crate::execution::ResultRow;
use crate::intent::classifier::ConversationKind;
use crate::intent::descriptor::QueryDescriptor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Accepted LLM narration length, exclusive bounds, in words.
const MIN_WORDS: usize = 30;
const MAX_WORDS: usize = 150;
const MAX_CONVERSATION_WORDS: usize = 80;

pub struct Narrator {
    template: TemplateNarrator,
    service: Option<Arc<dyn NarrationService>>,
    timeout: Duration,
}

impl Narrator {
    /// Template-only narration.
    pub fn template_only() -> Self {
        Self {
            template: TemplateNarrator::new(),
            service: None,
            timeout: Duration::from_secs(0),
        }
    }

    pub fn with_service(service: Arc<dyn NarrationService>, timeout: Duration) -> Self {
        Self {
            template: TemplateNarrator::new(),
            service: Some(service),
            timeout,
        }
    }

    pub fn templates(&self) -> &TemplateNarrator {
        &self.template
    }

    pub async fn narrate(
        &self,
        utterance: &str,
        descriptor: &QueryDescriptor,
        region_name: &str,
        rows: &[ResultRow],
    ) -> String {
        let fallback = self.template.narrate(descriptor, region_name, rows);
        let Some(indicator) = descriptor.indicator else {
            return fallback;
        };
        if rows.is_empty() {
            return fallback;
        }

        let meta = indicator.meta();
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_deref().unwrap_or("Total")).collect();
        let values: Vec<String> = rows.iter().map(|r| format!("{:.2}", r.value)).collect();
        let prompt = format!(
            r#"Generate a professional analytical narration for this agriculture data.
Write 60-100 words with insights.

Query: "{}"
Region: {}
Title: {}
Unit: {}
Categories: {}
Values: {}
Summary: {}

Requirements:
1. Start with context about the data
2. Highlight the key finding (total or top item)
3. Provide one analytical insight or pattern
4. Keep it professional and data-driven
5. Do NOT use bullet points

Write the narration now:"#,
            utterance,
            region_name,
            descriptor.paired_comparison.map_or(meta.title, |paired| paired.title()),
            meta.unit,
            labels.join(", "),
            values.join(", "),
            fallback
        );

        self.enhance(&prompt, fallback, |words| MIN_WORDS < words && words < MAX_WORDS)
            .await
    }

    pub async fn conversation(&self, kind: ConversationKind, utterance: &str) -> String {
        let fallback = self.template.conversation(kind);
        let prompt = match kind {
            ConversationKind::Greeting => format!(
                "User said: \"{}\"\nYou are the AgriStack MIS Assistant. Reply with a warm greeting in 2 sentences. \
                 Mention crop data, farmer statistics, survey progress and district analysis.",
                utterance
            ),
            ConversationKind::Help | ConversationKind::General => format!(
                "User asked: \"{}\"\nYou are the AgriStack MIS Assistant. Give helpful guidance in 2-3 sentences. \
                 Suggest queries about survey status, farmer registration, crop area, irrigation and district comparisons.",
                utterance
            ),
        };
        self.enhance(&prompt, fallback, |words| words > 0 && words < MAX_CONVERSATION_WORDS)
            .await
    }

    async fn enhance(&self, prompt: &str, fallback: String, accept: impl Fn(usize) -> bool) -> String {
        let Some(service) = &self.service else {
            return fallback;
        };

        match tokio::time::timeout(self.timeout, service.generate(prompt, self.timeout)).await {
            Ok(Ok(text)) => {
                let text = text.trim();
                let words = text.split_whitespace().count();
                if accept(words) {
                    debug!(words, "using LLM narration");
                    text.to_string()
                } else {
                    debug!(words, "LLM narration rejected by length check, using template");
                    fallback
                }
            }
            Ok(Err(e)) => {
                warn!("Narration service failed, using template: {}", e);
                fallback
            }
            Err(_) => {
                warn!("Narration service timed out after {:?}, using template", self.timeout);
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalyticsError, Result};
    use crate::lexicon::Indicator;
    use async_trait::async_trait;

    struct FixedService(String);

    #[async_trait]
    impl NarrationService for FixedService {
        async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingService;

    #[async_trait]
    impl NarrationService for FailingService {
        async fn generate(&self, _prompt: &str, _timeout: Duration) -> Result<String> {
            Err(AnalyticsError::Narration("connection refused".to_string()))
        }
    }

    fn rows() -> Vec<ResultRow> {
        vec![ResultRow::total(42.0)]
    }

    #[tokio::test]
    async fn test_accepts_output_within_word_bounds() {
        let text = vec!["word"; 40].join(" ");
        let narrator = Narrator::with_service(Arc::new(FixedService(text.clone())), Duration::from_secs(1));
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount);
        assert_eq!(narrator.narrate("farmers", &descriptor, "Pune", &rows()).await, text);
    }

    #[tokio::test]
    async fn test_short_output_falls_back_to_template() {
        let narrator = Narrator::with_service(Arc::new(FixedService("Too short.".to_string())), Duration::from_secs(1));
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount);
        let text = narrator.narrate("farmers", &descriptor, "Pune", &rows()).await;
        assert!(text.starts_with("The registered farmers for Pune"));
    }

    #[tokio::test]
    async fn test_service_error_falls_back_to_template() {
        let narrator = Narrator::with_service(Arc::new(FailingService), Duration::from_secs(1));
        let descriptor = QueryDescriptor::new(Indicator::FarmerCount);
        let text = narrator.narrate("farmers", &descriptor, "Pune", &rows()).await;
        assert!(text.contains("42 farmers"));
    }

    #[tokio::test]
    async fn test_template_only_conversation() {
        let text = Narrator::template_only().conversation(ConversationKind::Help, "help").await;
        assert!(!text.is_empty());
    }
}
