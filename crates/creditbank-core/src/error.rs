use thiserror::Error;

/// Credit quote pipeline errors.
///
/// Lower layers return these unchanged; the transport boundary maps each kind to one status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    /// Retries against a 5xx or transport failure were exhausted.
    #[error("config backend unavailable: {message}")]
    RemoteUnavailable {
        status: Option<u16>,
        message: String,
    },

    /// The config backend answered with a 4xx; never retried.
    #[error("config backend rejected request with status {status}: {message}")]
    RemoteRejected { status: u16, message: String },

    /// A 2xx body that does not decode as the expected document.
    #[error("config backend payload could not be decoded: {0}")]
    Decoding(String),

    #[error("{0}")]
    NotFound(String),

    #[error("request validation failed: {}", .0.join(", "))]
    ValidationFailed(Vec<String>),

    #[error("{0}")]
    InvalidState(String),
}

impl QuoteError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Human-readable reasons for the error payload.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::ValidationFailed(reasons) => reasons.clone(),
            other => vec![other.to_string()],
        }
    }
}

pub type QuoteResult<T> = Result<T, QuoteError>;
