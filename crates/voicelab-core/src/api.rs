//! Service traits for the three external collaborators.
//!
//! Controllers in the application layer depend on these seams rather than on
//! concrete HTTP clients, so they can be exercised with mock implementations.

use crate::error::Result;
use crate::prediction::{AnalysisRequest, Prediction};

/// Successful login payload from the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Bearer token for subsequent calls.
    pub access_token: String,
    /// Display name, when the service reports one.
    pub name: Option<String>,
}

/// Registration and authentication against the backend.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Registers a new account. Success does not authenticate.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()>;

    /// Exchanges credentials for a bearer token.
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome>;
}

/// Audio-sample classification by the inference service.
#[async_trait::async_trait]
pub trait InferenceApi: Send + Sync {
    /// Submits one audio sample for prediction, authorized with `token`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the service rejects the token; the caller must
    /// invalidate the whole session, not just this call.
    async fn predict(&self, request: &AnalysisRequest, token: &str) -> Result<Prediction>;
}

/// Natural-language explanation of a prediction (single best-effort call).
#[async_trait::async_trait]
pub trait ReportApi: Send + Sync {
    /// Asks the backend's generative-AI proxy to explain a screening result.
    ///
    /// Returns `Ok(None)` when the service answered 2xx with an empty
    /// answer field, so the caller can substitute its own fallback text.
    async fn explain(
        &self,
        question: &str,
        prediction: &Prediction,
        model_name: &str,
        token: &str,
    ) -> Result<Option<String>>;
}

/// Free-form text generation for the conversational assistant.
///
/// Implementations are expected to apply their own transient-failure retry
/// policy; an `Err` from `generate` is terminal.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    async fn generate(&self, prompt: &str, system_instruction: Option<&str>) -> Result<String>;
}
