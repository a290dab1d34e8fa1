use async_trait::async_trait;
use billsplit_ocr::ItemPriceEntry;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::prompt::build_prompt;
use crate::response::parse_response;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

#[derive(Debug, Error)]
pub enum StructuringError {
    #[error("Language model request failed: {0}")]
    Transport(reqwest::Error),
    #[error("Language model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Language model returned an empty response")]
    EmptyResponse,
    #[error("Could not read items from language model response: {0}")]
    Unparseable(String),
}

/// A text-in, text-out model. Replies carry no guaranteed grammar.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, StructuringError>;
}

impl From<reqwest::Error> for StructuringError {
    // Request URLs never reach error text, logs, or HTTP responses.
    fn from(e: reqwest::Error) -> Self {
        StructuringError::Transport(e.without_url())
    }
}

#[async_trait]
impl<T: LanguageModel + ?Sized> LanguageModel for Box<T> {
    async fn complete(&self, prompt: &str) -> Result<String, StructuringError> {
        (**self).complete(prompt).await
    }
}

// ── Gemini ────────────────────────────────────────────────────────────────────

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model.trim_start_matches("models/")
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, StructuringError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StructuringError::Api { status: status.as_u16(), body });
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed.text().ok_or(StructuringError::EmptyResponse)
    }
}

// ── Structuring ───────────────────────────────────────────────────────────────

/// Prompt → model → parse, for callers that want items from raw OCR lines.
pub struct Structurer<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> Structurer<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn structure<S: AsRef<str>>(
        &self,
        lines: &[S],
    ) -> Result<Vec<ItemPriceEntry>, StructuringError> {
        let prompt = build_prompt(lines);
        let reply = self.model.complete(&prompt).await?;
        match parse_response(&reply) {
            Ok(items) => {
                info!(lines = lines.len(), items = items.len(), "structured receipt via language model");
                Ok(items)
            }
            Err(e) => {
                warn!("Language model structuring failed: {e}");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    struct ScriptedModel {
        reply: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Self {
            Self { reply: Ok(reply.to_string()), prompts: Mutex::new(vec![]) }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> Result<String, StructuringError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(|_| StructuringError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn structure_sends_lines_and_parses_reply() {
        let model = ScriptedModel::replying(r#"[{"name":"Kaju Katli","price":99}]"#);
        let structurer = Structurer::new(model);
        let items = structurer.structure(&["Kaju Katli", "1.000 No", "99.00"]).await.unwrap();
        assert_eq!(items, vec![ItemPriceEntry::new("Kaju Katli", dec!(99))]);

        let prompts = structurer.model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- 1.000 No"));
    }

    #[tokio::test]
    async fn structure_reports_unparseable_reply() {
        let structurer = Structurer::new(ScriptedModel::replying("No items found."));
        let err = structurer.structure(&["Total", "389.00"]).await.unwrap_err();
        assert!(matches!(err, StructuringError::Unparseable(_)));
    }

    #[tokio::test]
    async fn structure_propagates_model_failure() {
        let model = ScriptedModel { reply: Err(()), prompts: Mutex::new(vec![]) };
        let err = Structurer::new(model).structure(&["Tea"]).await.unwrap_err();
        assert!(matches!(err, StructuringError::EmptyResponse));
    }

    #[test]
    fn endpoint_normalizes_model_prefix() {
        let client = GeminiClient::new("k", "models/gemini-1.5-flash-latest")
            .with_base_url("http://localhost:9/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[tokio::test]
    async fn transport_errors_do_not_reveal_the_api_key() {
        // Nothing listens on the discard port, so the request fails to connect.
        let client = GeminiClient::new("SUPERSECRETKEY", DEFAULT_GEMINI_MODEL)
            .with_base_url("http://127.0.0.1:9");
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, StructuringError::Transport(_)));
        let text = err.to_string();
        assert!(!text.contains("SUPERSECRETKEY"), "{text}");
        assert!(!text.contains("generateContent"), "{text}");
    }

    #[test]
    fn generate_response_joins_parts() {
        let resp: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"- Tea "},{"text":"— 20"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text().as_deref(), Some("- Tea — 20"));
    }

    #[test]
    fn generate_response_without_candidates_has_no_text() {
        let resp: GenerateResponse = serde_json::from_str(r#"{"promptFeedback":{}}"#).unwrap();
        assert_eq!(resp.text(), None);
    }
}
