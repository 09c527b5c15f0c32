//! GeminiClient - Direct REST API implementation for Gemini.
//!
//! Calls the generateContent endpoint directly, wrapping every call in the
//! backoff invoker so rate limiting stays invisible to callers until the
//! retry budget is exhausted. Configuration is loaded from secret.json with
//! an environment fallback.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;

use voicelab_core::api::ChatApi;
use voicelab_core::{Result, VoiceLabError};

use crate::backoff;
use crate::config::load_secret_config;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Text returned when the service answers 2xx but produces no candidates
/// (safety filtering can do this).
const EMPTY_RESPONSE_TEXT: &str = "No response generated.";

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Creates a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Loads configuration from ~/.config/voicelab/secret.json or
    /// environment variables.
    ///
    /// Priority:
    /// 1. ~/.config/voicelab/secret.json
    /// 2. Environment variables (GEMINI_API_KEY, GEMINI_MODEL_NAME)
    ///
    /// Model name defaults to `gemini-2.5-flash` if not specified.
    pub fn try_from_env() -> Result<Self> {
        if let Ok(secret_config) = load_secret_config() {
            if let Some(gemini_config) = secret_config.gemini {
                let model = gemini_config
                    .model_name
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
                return Ok(Self::new(gemini_config.api_key, model));
            }
        }

        let api_key = env::var("GEMINI_API_KEY").map_err(|_| {
            VoiceLabError::config(
                "GEMINI_API_KEY not found in ~/.config/voicelab/secret.json or environment variables",
            )
        })?;

        let model = env::var("GEMINI_MODEL_NAME").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into());
        Ok(Self::new(api_key, model))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// One attempt against the generateContent endpoint, no retry.
    async fn single_attempt(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: system_instruction.map(|text| Content {
                parts: vec![Part {
                    text: text.to_string(),
                }],
            }),
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            BASE_URL,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                VoiceLabError::service_unavailable(format!("Gemini API request failed: {err}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            VoiceLabError::malformed(format!("Failed to parse Gemini response: {err}"))
        })?;

        Ok(extract_text(parsed))
    }
}

#[async_trait::async_trait]
impl ChatApi for GeminiClient {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String> {
        backoff::invoke(|| self.single_attempt(prompt, system_instruction)).await
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|mut candidates| {
            if candidates.is_empty() {
                None
            } else {
                candidates.swap_remove(0).content
            }
        })
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string())
}

fn map_http_error(status: StatusCode, body: String) -> VoiceLabError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper
                .error
                .message
                .unwrap_or_else(|| "Gemini API Error".to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| "Gemini API Error".to_string());

    if status == StatusCode::TOO_MANY_REQUESTS {
        VoiceLabError::rate_limited(message)
    } else {
        VoiceLabError::remote(status.as_u16(), message)
    }
}
