use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

#[cfg(test)]
use mockall::automock;

use crate::completion::{errors::CompletionError, types::ModelCandidate};
use crate::config::CompletionConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";
const GENERATE_METHOD: &str = "generateContent";
const MODELS_PAGE_SIZE: u32 = 100;
const MAX_MODEL_PAGES: usize = 5;
// Error bodies are echoed into messages; keep them readable.
const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// The remote completion service, as seen by the model resolver.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Every model the service advertises.
    async fn list_models(&self) -> Result<Vec<ModelCandidate>, CompletionError>;

    /// One generation attempt against one model.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    http: Client,
    api_key: String,
    config: CompletionConfig,
}

impl GeminiClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(CompletionError::MissingCredential)?;

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| CompletionError::Transport(format!("failed to build client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.base_url,
            bare_model_name(model),
            GENERATE_METHOD
        )
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<ModelCandidate>, CompletionError> {
        let mut candidates = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_MODEL_PAGES {
            let mut request = self
                .http
                .get(self.models_url())
                .header(API_KEY_HEADER, &self.api_key)
                .timeout(self.config.discovery_timeout)
                .query(&[("pageSize", MODELS_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request
                .send()
                .await
                .map_err(CompletionError::from_reqwest_error)?;
            let page: ModelList = read_json(response).await?;

            candidates.extend(page.models.into_iter().map(|entry| {
                let supports_completion = entry
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == GENERATE_METHOD);
                ModelCandidate::new(bare_model_name(&entry.name), supports_completion)
            }));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = candidates.len(), "listed models");
        Ok(candidates)
    }

    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.chars().count()))]
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, CompletionError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.config.completion_timeout)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::from_reqwest_error)?;

        let envelope: Value = read_json(response).await?;

        extract_text(&envelope).ok_or(CompletionError::Empty)
    }
}

/// `models/gemini-x` and `gemini-x` name the same model.
pub fn bare_model_name(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, CompletionError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CompletionError::Api {
            status,
            message: error_message(&body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| CompletionError::Decode(e.to_string()))
}

/// Pull the human-readable part out of an error body.
fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            let message = error.get("message")?.as_str()?.to_string();
            Some(match error.get("status").and_then(Value::as_str) {
                Some(status) => format!("{status}: {message}"),
                None => message,
            })
        })
        .unwrap_or_else(|| body.trim().to_string());

    message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect()
}

/// Read the generated text out of a response envelope.
///
/// Two shapes are accepted: the first part of the first candidate, and the
/// concatenation of every text part of the first candidate (what SDK
/// `text()` accessors return). A bare top-level `text` field is accepted
/// as well. The first non-blank result wins.
pub fn extract_text(envelope: &Value) -> Option<String> {
    let first_part = || {
        envelope
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let all_parts = || {
        let parts = envelope
            .pointer("/candidates/0/content/parts")?
            .as_array()?;
        Some(
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<String>(),
        )
    };

    let top_level = || {
        envelope
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    first_part()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| all_parts().filter(|t| !t.trim().is_empty()))
        .or_else(|| top_level().filter(|t| !t.trim().is_empty()))
}
