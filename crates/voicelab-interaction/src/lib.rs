//! HTTP clients for the external services the workflow depends on, plus the
//! backoff invoker they share for transient-failure retry.

pub mod auth_client;
pub mod backoff;
pub mod config;
pub mod gemini;
pub mod inference_client;
pub mod report_client;

pub use auth_client::AuthClient;
pub use config::{ApiConfig, load_secret_config};
pub use gemini::GeminiClient;
pub use inference_client::InferenceClient;
pub use report_client::ReportClient;
