//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! Requests a JSON array of strings through the response schema, so the
//! reply text can be parsed directly as the insight list.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::InsightError;
use crate::prompt::{build_prompt, parse_insights};
use crate::provider::TextInsightProvider;
use crate::retry::retry_with_backoff;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for the hosted Gemini model.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client against the public Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, InsightError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("medintel/0.1 (dashboard-insights)")
            .build()?;

        let endpoint = format!(
            "{}/v1beta/models/{model}:generateContent",
            base_url.trim_end_matches('/')
        );

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    /// Sets the retry policy for transient failures (429, 5xx, network).
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Sends one prompt and returns the insight list from the first candidate.
    ///
    /// # Errors
    ///
    /// - [`InsightError::Http`] on network failure.
    /// - [`InsightError::Api`] on a non-2xx status.
    /// - [`InsightError::EmptyResponse`] when no candidate text is returned.
    /// - [`InsightError::Deserialize`] when the text is not a string array.
    pub async fn generate_insights(&self, prompt: &str) -> Result<Vec<String>, InsightError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_once(prompt)
        })
        .await
    }

    async fn request_once(&self, prompt: &str) -> Result<Vec<String>, InsightError> {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: serde_json::json!({
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }),
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InsightError::Api {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_slice(&bytes).map_err(|e| InsightError::Deserialize {
                context: "generateContent response".to_string(),
                source: e,
            })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(InsightError::EmptyResponse)?;

        parse_insights(&text)
    }
}

impl TextInsightProvider for GeminiClient {
    async fn summarize(&self, title: &str, summary: &str) -> Result<Vec<String>, InsightError> {
        let prompt = build_prompt(title, summary);
        self.generate_insights(&prompt).await
    }
}
