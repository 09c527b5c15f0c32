//! Inference request and result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VoiceLabError;

/// Selects which trained model the inference service should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    /// CNN-LSTM baseline model.
    #[default]
    CnnLstm,
    /// GRU model with attention.
    GruAttn,
}

impl ModelId {
    /// Wire identifier expected by the inference service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::CnnLstm => "cnn_lstm",
            ModelId::GruAttn => "gru_attn",
        }
    }

    /// Human-readable model name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelId::CnnLstm => "CNN-LSTM",
            ModelId::GruAttn => "GRU-Attention",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = VoiceLabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cnn_lstm" => Ok(ModelId::CnnLstm),
            "gru_attn" => Ok(ModelId::GruAttn),
            other => Err(VoiceLabError::validation(format!(
                "Unknown model id '{other}' (expected cnn_lstm or gru_attn)"
            ))),
        }
    }
}

/// One submission to the inference service: the audio sample plus the model
/// selector and ensemble flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Original file name of the uploaded sample.
    pub file_name: String,
    /// Raw audio bytes.
    pub bytes: Vec<u8>,
    /// Which model to run.
    pub model_id: ModelId,
    /// Whether to combine all models for the prediction.
    pub use_ensemble: bool,
}

/// Classification output of the inference service for one audio sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Raw model probability in [0, 1].
    pub probability: f64,
    /// Binary class label (0 or 1).
    pub label: u8,
    /// Human-readable class name.
    pub class_name: String,
    /// Name of the model that produced the result, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// Model version string, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Prediction {
    /// Model name to attribute this prediction to.
    ///
    /// Falls back to "Ensemble" when the result came from an ensemble run,
    /// else to the CNN-LSTM baseline, matching what the service would have
    /// run by default.
    pub fn attributed_model_name(&self, use_ensemble: bool) -> String {
        match &self.model_name {
            Some(name) => name.clone(),
            None if use_ensemble => "Ensemble".to_string(),
            None => "CNN-LSTM".to_string(),
        }
    }
}
