//! Error types for the OAuth session
//!
//! Three failure families per the flow: preconditions (local state missing,
//! no network call attempted), transport (connection-level), and provider
//! (non-2xx status, body kept for diagnostics). None are fatal — the caller
//! decides whether to re-authorize or give up.

/// Errors from OAuth session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required local state is missing; no request was sent.
    #[error("precondition not met: {0}")]
    Precondition(String),

    /// The redirect URL could not be parsed or carries no `code` parameter.
    #[error("invalid redirect URL: {0}")]
    Redirect(String),

    /// Transport-level failure talking to the provider.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// A success status carried an undecodable body.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Result alias for OAuth session operations.
pub type Result<T> = std::result::Result<T, Error>;
