use serde::{Deserialize, Serialize};

/// The authenticated identity held for the lifetime of the client.
///
/// An empty token means "unauthenticated". A non-empty token is only ever
/// constructed from an authentication-service response, never fabricated
/// locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token issued by the authentication service.
    pub token: String,
    /// Display name of the authenticated user.
    pub name: String,
    /// Email address the user logged in with.
    pub email: String,
}

impl Session {
    /// Creates a session from an authentication-service response.
    pub fn new(
        token: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Whether this session carries a token.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_is_unauthenticated() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(session.token.is_empty());
        assert!(session.name.is_empty());
        assert!(session.email.is_empty());
    }

    #[test]
    fn test_session_with_token_is_authenticated() {
        let session = Session::new("jwt-token", "Ada", "ada@example.com");
        assert!(session.is_authenticated());
    }
}
