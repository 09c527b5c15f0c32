//! HTTP client for the backend's report endpoint.
//!
//! One best-effort call per report: this path deliberately bypasses the
//! backoff invoker, and callers mask every failure behind fixed fallback
//! text.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use voicelab_core::api::ReportApi;
use voicelab_core::prediction::Prediction;
use voicelab_core::{Result, VoiceLabError};

use crate::config::ApiConfig;

/// Client for `/gemini/alz-chat`.
#[derive(Clone)]
pub struct ReportClient {
    client: Client,
    base_url: String,
}

impl ReportClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone())
    }
}

#[async_trait::async_trait]
impl ReportApi for ReportClient {
    async fn explain(
        &self,
        question: &str,
        prediction: &Prediction,
        model_name: &str,
        token: &str,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .post(format!("{}/gemini/alz-chat", self.base_url))
            .bearer_auth(token)
            .json(&ExplainRequest {
                question,
                class_name: &prediction.class_name,
                probability: prediction.probability,
                model_name,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            return Err(VoiceLabError::remote(status, "AI report service unavailable"));
        }

        let body: ExplainResponse = response.json().await.map_err(|err| {
            VoiceLabError::malformed(format!("Failed to parse report response: {err}"))
        })?;

        // A 2xx with an empty answer is a distinct outcome: the caller
        // substitutes its own fallback text rather than treating it as an
        // error.
        Ok(body.answer.filter(|answer| !answer.trim().is_empty()))
    }
}

#[derive(Serialize)]
struct ExplainRequest<'a> {
    question: &'a str,
    class_name: &'a str,
    probability: f64,
    model_name: &'a str,
}

#[derive(Deserialize)]
struct ExplainResponse {
    #[serde(default)]
    answer: Option<String>,
}
