use thiserror::Error;

/// Marker the wallet endpoint puts in its message when a debit is refused
pub const INSUFFICIENT_BALANCE: &str = "Insufficient wallet balance";

/// Errors that can occur when talking to the billing API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never completed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer without a recognised business meaning
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// HTTP 409, e.g. duplicate email
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Wallet debit refused for lack of funds
    #[error("{0}")]
    InsufficientBalance(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Business-rule rejection rather than transport or server failure
    pub fn is_business(&self) -> bool {
        matches!(self, ApiError::Conflict(_) | ApiError::InsufficientBalance(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Conflict(_) => Some(409),
            ApiError::Unauthorized => Some(401),
            ApiError::Http(err) => err.status().map(|s| s.as_u16()),
            ApiError::InsufficientBalance(_) | ApiError::Parse(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Pull a human message out of an error body: `{"message": ...}` if present,
/// otherwise the raw text
pub(crate) fn message_from_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
