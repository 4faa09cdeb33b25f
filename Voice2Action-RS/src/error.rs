use std::path::PathBuf;

use thiserror::Error;

/// Reasons a local audio file is refused before anything is uploaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No file was selected.
    #[error("No audio file selected")]
    NoFile,

    /// Neither the MIME type nor the extension is an accepted audio format.
    #[error("Unsupported file type for {filename}: only MP3/OGG/WAV/M4A are accepted")]
    UnsupportedType {
        filename: String,
        mime: Option<String>,
    },

    /// The file exceeds the upload ceiling.
    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },
}

/// Errors returned by Voice2Action operations.
#[derive(Error, Debug)]
pub enum V2aError {
    /// The file was rejected locally; no request was made.
    #[error("Invalid audio file: {0}")]
    Validation(#[from] ValidationError),

    /// The API returned a non-success HTTP status. `message` is the
    /// normalized error body.
    #[error("Voice2Action API returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The configured endpoint cannot be used as a base URL.
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// The response was missing expected fields.
    #[error("{0}")]
    InvalidResponse(String),

    /// The job reached the `failed` status.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Polling used up its attempt budget without a terminal status.
    #[error("Timed out after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// Reading the local audio file failed.
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, V2aError>;
