use thiserror::Error;

/// Top-level error type for the `watchpost-api` crate.
///
/// Used by the `Result`-returning operations (login, client construction).
/// Cancellable fetches report failures through
/// [`FetchOutcome`](crate::FetchOutcome) instead, where "aborted" is a
/// first-class resolution rather than an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),
}
