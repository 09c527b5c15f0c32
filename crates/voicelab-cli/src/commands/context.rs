//! Shared construction of controllers wired to the real HTTP clients.

use std::sync::Arc;

use anyhow::Result;

use voicelab_application::{AuthController, DiagnosticController};
use voicelab_core::session::FileSessionStore;
use voicelab_interaction::{ApiConfig, AuthClient, InferenceClient, ReportClient};

/// Builds the authentication controller against the configured backend and
/// restores any persisted session.
pub async fn auth_controller() -> Result<Arc<AuthController>> {
    let config = ApiConfig::from_env();
    let store = FileSessionStore::default_location()?;
    let auth = Arc::new(AuthController::new(
        Arc::new(AuthClient::from_config(&config)),
        Arc::new(store),
    ));
    auth.restore().await?;
    Ok(auth)
}

/// Builds the diagnostic controller sharing `auth`'s session.
pub fn diagnostic_controller(auth: Arc<AuthController>) -> Arc<DiagnosticController> {
    let config = ApiConfig::from_env();
    Arc::new(DiagnosticController::new(
        Arc::new(InferenceClient::from_config(&config)),
        Arc::new(ReportClient::from_config(&config)),
        auth,
    ))
}
