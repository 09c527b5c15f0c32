pub mod analyze;
pub mod auth;
pub mod chat;

mod context;
