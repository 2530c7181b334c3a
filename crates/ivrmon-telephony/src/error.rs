/// Errors that can occur when talking to the telephony vendor API.
///
/// # Examples
///
/// ```rust
/// use ivrmon_telephony::error::TelephonyError;
///
/// let err = TelephonyError::ConfigError("missing api_key".to_string());
/// assert!(err.to_string().contains("api_key"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    /// HTTP-level error: non-2xx status code from the vendor API.
    #[error("Telephony API HTTP error: status={status}, body={body}")]
    HttpError { status: u16, body: String },

    /// Request was throttled by the vendor. This client never retries;
    /// retry policy belongs to the caller of the report, if anywhere.
    #[error("Telephony API rate limited")]
    RateLimited,

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON deserialization failure on a vendor response.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Account configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, TelephonyError>;
