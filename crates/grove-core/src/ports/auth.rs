//! Authentication ports.

/// Identity carried by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
    /// Subject assigned by the identity provider.
    pub sub: String,
}

/// Verifies access tokens issued by an external identity provider.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token is not valid. [Reason] token is expired")]
    TokenExpired,

    #[error("token is not valid. [Reason] {0}")]
    InvalidToken(String),

    #[error("Bearer token was not found in Authorization header")]
    MissingAuth,

    #[error("cannot find user email = {0}")]
    UnknownUser(String),

    #[error("authentication is misconfigured: {0}")]
    Misconfigured(String),
}
