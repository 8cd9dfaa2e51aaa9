use thiserror::Error;

/// Anything that can go wrong between pressing upload and holding a decoded
/// response. Every variant ends in the same `Fail` status.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid MIME type {mime} for {name}")]
    InvalidMime {
        name: String,
        mime: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to send request: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to decode upload response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("Upload task ended before resolving: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
