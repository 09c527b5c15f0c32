//! Authenticated session model and persistence.

mod model;
mod storage;
mod store;

pub use model::Session;
pub use storage::FileSessionStore;
pub use store::SessionStore;
