pub mod api;
pub mod chat;
pub mod confidence;
pub mod error;
pub mod prediction;
pub mod session;

// Re-export common error type
pub use error::{Result, VoiceLabError};
