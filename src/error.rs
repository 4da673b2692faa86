//! Error types for a single check run
//!
//! Each stage of a run has its own error type. Fetch, decode, schema and
//! persist failures abort the run and surface as [`CheckError`]. Notification
//! failures never abort a run, so [`NotifyError`] is not part of it.

/// Errors retrieving the metadata token
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Metadata endpoint {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Metadata source unavailable: {0}")]
    Unavailable(String),
}

/// Errors turning a token into payload text
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Token has {0} segment(s), expected at least 2")]
    MissingPayload(usize),

    #[error("Payload segment is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Token signature rejected: {0}")]
    Signature(String),
}

/// Errors reading version fields out of the decoded payload
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Field '{path}' must be a string")]
    NotAString { path: String },
}

/// Errors delivering a webhook notification
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned HTTP {0}")]
    Status(u16),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Errors reading or writing the persisted state
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Store I/O on '{key}' failed: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored state '{key}' is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid object name: {0}")]
    InvalidKey(String),

    #[error("Failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// A failed check run
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl CheckError {
    /// Short stage name used in log fields and failure alerts
    pub fn stage(&self) -> &'static str {
        match self {
            CheckError::Fetch(_) => "fetch",
            CheckError::Decode(_) => "decode",
            CheckError::Schema(_) => "schema",
            CheckError::Persist(_) => "persist",
        }
    }
}
