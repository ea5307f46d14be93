//! Error types for the dashboard proxy

use std::io;

use thiserror::Error;

/// Result type alias for the dashboard proxy
pub type Result<T> = std::result::Result<T, Error>;

/// Dashboard proxy errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown logical server id in a proxy route
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    /// Transport-level failure while calling an upstream.
    /// The message is redacted before the variant is constructed.
    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    /// AWS integration not configured
    #[error("AWS not configured")]
    AwsDisabled,

    /// AWS integration failure
    #[error("AWS error: {0}")]
    Aws(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Replace every occurrence of `secret` in `message` with `[redacted]`.
///
/// Applied to any error text that could echo outbound-request internals
/// (the HTTP client may embed request headers in its messages) before
/// that text crosses the trust boundary.
#[must_use]
pub fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        message.to_string()
    } else {
        message.replace(secret, "[redacted]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_removes_secret() {
        let msg = "error sending request: Authorization: Bearer tok-123 rejected";
        assert_eq!(
            redact(msg, "tok-123"),
            "error sending request: Authorization: Bearer [redacted] rejected"
        );
    }

    #[test]
    fn redact_handles_repeated_occurrences() {
        assert_eq!(redact("tok tok tok", "tok"), "[redacted] [redacted] [redacted]");
    }

    #[test]
    fn redact_empty_secret_is_noop() {
        assert_eq!(redact("unchanged", ""), "unchanged");
    }
}
