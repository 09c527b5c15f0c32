use super::Session;
use crate::error::Result;

/// Persistence backend for the authenticated session.
///
/// Implementations store the token, name, and email as a single unit: a
/// restore returns either all three or nothing, and `clear` removes them
/// together.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Restores the persisted session, if any.
    ///
    /// Returns `None` when no session has been saved (or it was cleared).
    async fn load(&self) -> Result<Option<Session>>;

    /// Persists the session, replacing any previous one.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Removes the persisted session. Idempotent.
    async fn clear(&self) -> Result<()>;
}
