//! Application workflows built on the service traits in `voicelab-core`.
//!
//! Each controller owns one workflow's state behind async locks and is shared
//! via `Arc`: authentication ([`auth::AuthController`]), audio analysis and
//! reporting ([`diagnostic::DiagnosticController`]), and the conversational
//! assistant ([`chat::ChatController`]).

pub mod auth;
pub mod chat;
pub mod diagnostic;

pub use auth::AuthController;
pub use chat::ChatController;
pub use diagnostic::{AnalysisPhase, DiagnosticController};
