use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{LanguageModel, SummaryError};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
const FALLBACK_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub struct GeminiModel {
    agent: ureq::Agent,
    url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiModel {
    /// Build a client, reading the credential from the environment.
    ///
    /// A missing key is not an error here; `generate` reports it so the
    /// board can still start and only report generation fails.
    pub fn from_config(config: &GeminiConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .or_else(|_| std::env::var(FALLBACK_API_KEY_ENV))
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self::with_key(config, api_key)
    }

    pub fn with_key(config: &GeminiConfig, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new().build();
        Self {
            agent,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            api_key_env: config.api_key_env.clone(),
        }
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

/// Concatenated text parts of the first candidate
fn response_text(response: GenerateResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}

impl LanguageModel for GeminiModel {
    fn generate(&self, prompt: &str) -> Result<Option<String>, SummaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SummaryError::MissingApiKey(self.api_key_env.clone()))?;

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response = self
            .agent
            .post(&self.url)
            .set("x-goog-api-key", api_key)
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(status, response) => SummaryError::Api {
                    status,
                    message: response
                        .into_string()
                        .unwrap_or_else(|_| "<unreadable body>".to_string()),
                },
                ureq::Error::Transport(t) => SummaryError::Network(t.to_string()),
            })?;

        let parsed: GenerateResponse = response
            .into_json()
            .map_err(|e| SummaryError::Decode(e.to_string()))?;
        Ok(response_text(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_before_any_request() {
        let model = GeminiModel::with_key(&GeminiConfig::default(), None);
        let err = model.generate("hello").unwrap_err();
        match err {
            SummaryError::MissingApiKey(var) => assert_eq!(var, "API_KEY"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn url_targets_configured_model() {
        let config = GeminiConfig {
            model: "gemini-test".to_string(),
            base_url: "http://localhost:9999/".to_string(),
            ..GeminiConfig::default()
        };
        let model = GeminiModel::with_key(&config, Some("k".to_string()));
        assert_eq!(
            model.url,
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let parsed: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "## Day" }, { "text": "\nAll good" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response_text(parsed).as_deref(), Some("## Day\nAll good"));
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let parsed: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(response_text(parsed), None);
    }
}
