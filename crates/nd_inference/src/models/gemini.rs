use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nd_core::{Error, RankingModel, RankingRequest, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::prompt::build_prompt;
use crate::Config;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, empty when there is none.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` client.
pub struct GeminiModel {
    client: Arc<Client>,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::Config("Gemini API key is required".to_string()))?;
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let model_name = config
            .model_name
            .map(|name| name.trim_start_matches("models/").to_string())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Ok(Self {
            client: Arc::new(client),
            api_key,
            model_name,
            base_url: config.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model_name
        )
    }
}

#[async_trait]
impl RankingModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn rank(&self, request: &RankingRequest) -> Result<String> {
        let prompt = build_prompt(request)?;
        info!(
            "Asking {} to rank {} headlines across {} topics",
            self.model_name,
            request.total_headlines(),
            request.headlines.len()
        );
        debug!("Prompt:\n{}", prompt);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Gemini request failed with {}: {}",
                status,
                detail.chars().take(500).collect::<String>()
            )));
        }

        let parsed = response.json::<GenerateResponse>().await?;
        Ok(parsed.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            model: "gemini".to_string(),
            api_key: Some("secret-key".to_string()),
            model_name: Some("models/gemini-1.5-pro".to_string()),
            base_url: Some("http://localhost:9999/v1beta/".to_string()),
        }
    }

    #[test]
    fn test_endpoint_and_debug() {
        let model = GeminiModel::new(config()).unwrap();
        assert_eq!(
            model.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-1.5-pro:generateContent"
        );
        let debug = format!("{:?}", model);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_response_text() {
        let parsed: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"A\": "}, {"text": "[\"x\"]}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.text(), r#"{"A": ["x"]}"#);

        let blocked: GenerateResponse = serde_json::from_str(r#"{"promptFeedback": {}}"#).unwrap();
        assert_eq!(blocked.text(), "");
    }
}
