//! Error types for the Cardmarket client.

use cardmarket_config::ConfigError;

/// Error from Cardmarket API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Credentials rejected at client construction.
    #[error("invalid credentials: {0}")]
    Credentials(String),

    /// Configuration could not provide a usable client.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error for downloaded payloads.
    #[error("base64 decode error")]
    Base64(#[from] base64::DecodeError),

    /// Download response did not contain exactly one usable payload field.
    #[error("download payload error: {0}")]
    Payload(String),
}
