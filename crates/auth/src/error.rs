use std::time::Duration;

use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The authorization server redirected back with an `error` parameter.
    #[error("Authorization failed: {error}{}", .description.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    Authorization {
        error: String,
        description: Option<String>,
    },

    #[error("Callback state does not match the login request (possible CSRF)")]
    StateMismatch,

    #[error("Callback carried neither an authorization code nor an error")]
    MissingCode,

    #[error("Timed out after {0:?} waiting for the login callback")]
    Timeout(Duration),

    #[error("Callback listener stopped before a request arrived")]
    CallbackClosed,

    #[error("Failed to bind callback listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The token endpoint answered with an OAuth error response.
    #[error("Token request rejected: {error}{}", .description.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    TokenRejected {
        error: String,
        description: Option<String>,
    },

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("PKCE code verifier must be 43-128 unreserved characters")]
    InvalidVerifier,

    #[error("Provider discovery failed: {0}")]
    Discovery(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
