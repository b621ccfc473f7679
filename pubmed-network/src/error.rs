use std::result;

use crate::retry::RetryableError;
use thiserror::Error;

/// Error types for PubMed network operations
#[derive(Error, Debug)]
pub enum PubMedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),

    /// XML parsing failed
    #[error("XML parsing failed: {0}")]
    XmlError(String),

    /// The seed identifier has no resolvable metadata
    #[error("Record not found: PMID {pmid}")]
    RecordNotFound { pmid: String },

    /// Invalid PMID format
    #[error("Invalid PMID format: {pmid}")]
    InvalidPmid { pmid: String },

    /// Invalid query structure or parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Generic API error with HTTP status code
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The upstream kept failing with transient errors until the retry budget ran out
    #[error("Upstream unavailable after {attempts} attempts: {reason}")]
    UpstreamUnavailable { attempts: u32, reason: String },

    /// Collection identifier could not be resolved to a member list
    #[error("Collection not found: {collection_id}")]
    CollectionNotFound { collection_id: String },
}

pub type Result<T> = result::Result<T, PubMedError>;

impl PubMedError {
    /// Whether the caller should answer with a degraded payload instead of an error.
    ///
    /// Upstream outages and unresolvable seeds degrade; malformed input does not.
    pub fn is_degradable(&self) -> bool {
        !matches!(
            self,
            PubMedError::InvalidPmid { .. }
                | PubMedError::InvalidQuery(_)
                | PubMedError::CollectionNotFound { .. }
        )
    }
}

impl RetryableError for PubMedError {
    fn is_retryable(&self) -> bool {
        match self {
            PubMedError::RequestError(err) => {
                if err.is_timeout() || err.is_connect() {
                    return true;
                }

                if let Some(status) = err.status() {
                    return status.is_server_error() || status.as_u16() == 429;
                }

                // DNS and other network errors
                !err.is_builder() && !err.is_redirect() && !err.is_decode()
            }

            PubMedError::ApiError { status, message } => {
                (*status >= 500 && *status < 600) || *status == 429 || {
                    let lower_msg = message.to_lowercase();
                    lower_msg.contains("temporarily unavailable")
                        || lower_msg.contains("timeout")
                        || lower_msg.contains("connection")
                }
            }

            PubMedError::JsonError(_)
            | PubMedError::XmlError(_)
            | PubMedError::RecordNotFound { .. }
            | PubMedError::InvalidPmid { .. }
            | PubMedError::InvalidQuery(_)
            | PubMedError::UpstreamUnavailable { .. }
            | PubMedError::CollectionNotFound { .. } => false,
        }
    }

    fn retry_reason(&self) -> &str {
        if self.is_retryable() {
            match self {
                PubMedError::RequestError(err) if err.is_timeout() => "Request timeout",
                PubMedError::RequestError(err) if err.is_connect() => "Connection error",
                PubMedError::RequestError(_) => "Network error",
                PubMedError::ApiError { status, .. } => match status {
                    429 => "Rate limit exceeded",
                    500..=599 => "Server error",
                    _ => "Temporary API error",
                },
                _ => "Transient error",
            }
        } else {
            match self {
                PubMedError::JsonError(_) => "Invalid JSON response",
                PubMedError::XmlError(_) => "Invalid XML response",
                PubMedError::RecordNotFound { .. } => "Record does not exist",
                PubMedError::InvalidPmid { .. } => "Invalid input",
                PubMedError::InvalidQuery(_) => "Invalid query",
                PubMedError::UpstreamUnavailable { .. } => "Retry budget exhausted",
                PubMedError::CollectionNotFound { .. } => "Unknown collection",
                _ => "Non-transient error",
            }
        }
    }
}
