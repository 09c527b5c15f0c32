//! HTTP client for the inference service's `/predict` endpoint.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};

use voicelab_core::api::InferenceApi;
use voicelab_core::prediction::{AnalysisRequest, Prediction};
use voicelab_core::{Result, VoiceLabError};

use crate::config::ApiConfig;

/// Client submitting audio samples for classification.
#[derive(Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
}

impl InferenceClient {
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
impl InferenceApi for InferenceClient {
    async fn predict(&self, request: &AnalysisRequest, token: &str) -> Result<Prediction> {
        let form = Form::new()
            .part(
                "file",
                Part::bytes(request.bytes.clone()).file_name(request.file_name.clone()),
            )
            .text("model_id", request.model_id.as_str())
            .text(
                "use_ensemble",
                if request.use_ensemble { "true" } else { "false" },
            );

        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        // 401 is semantically distinct: the whole session must be
        // invalidated, not just this call.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(VoiceLabError::Unauthorized);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "prediction request rejected: {body}");
            return Err(VoiceLabError::remote(status, "Prediction request failed"));
        }

        let prediction: Prediction = response.json().await.map_err(|err| {
            VoiceLabError::malformed(format!("Failed to parse prediction response: {err}"))
        })?;

        Ok(prediction)
    }
}
