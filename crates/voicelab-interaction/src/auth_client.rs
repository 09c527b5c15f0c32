//! HTTP client for the authentication endpoints.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use voicelab_core::api::{AuthApi, LoginOutcome};
use voicelab_core::{Result, VoiceLabError};

use crate::config::ApiConfig;

const DEFAULT_REGISTER_ERROR: &str = "Registration failed. Please try again.";
const DEFAULT_LOGIN_ERROR: &str = "Invalid credentials.";

/// Client for `/auth/register` and `/auth/login`.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
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
impl AuthApi for AuthClient {
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&RegisterRequest {
                name,
                email,
                password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceLabError::auth_rejected(
                read_detail(response, DEFAULT_REGISTER_ERROR).await,
            ));
        }

        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VoiceLabError::auth_rejected(
                read_detail(response, DEFAULT_LOGIN_ERROR).await,
            ));
        }

        let body: LoginResponse = response.json().await.map_err(|err| {
            VoiceLabError::malformed(format!("Failed to parse login response: {err}"))
        })?;

        Ok(LoginOutcome {
            access_token: body.access_token,
            name: body.name,
        })
    }
}

/// Extracts the server-provided `{detail}` message, falling back to a fixed
/// default when the body is absent or unreadable.
async fn read_detail(response: reqwest::Response, default: &str) -> String {
    let detail = match response.json::<ErrorDetail>().await {
        Ok(body) => body.detail,
        Err(_) => None,
    };
    detail.unwrap_or_else(|| default.to_string())
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}
