use thiserror::Error;

/// Failures talking to the roster backend. None of these reach the screen;
/// they are written to the diagnostic log and the local state stays as it was.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot be used to build endpoint URLs.
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Connection, timeout or other transport-level failure.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("Backend returned {status} for {url}: {body}")]
    Status { url: String, status: u16, body: String },

    /// The response body was not the expected JSON shape.
    #[error("Unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
