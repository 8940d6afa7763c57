use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing a price typed by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PriceError {
    #[error("price is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    Invalid(String),

    #[error("price must be greater than zero, got '{0}'")]
    NotPositive(String),
}

/// Input validation failures. Always recoverable: the caller re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("name must have at least {min} characters")]
    NameTooShort { min: usize },

    #[error("invalid price: {0}")]
    Price(#[from] PriceError),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("'{0}' is not an http(s) link")]
    InvalidMediaUrl(String),

    #[error("media limit of {0} items reached")]
    MediaLimitReached(usize),

    #[error("unknown field '{0}'")]
    UnknownField(String),
}

/// Errors related to catalog operations on existing products.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from decoding the persisted catalog document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed catalog document: {0}")]
    Malformed(String),

    #[error("catalog document must be an array or an object keyed by id, found {0}")]
    UnexpectedShape(&'static str),
}

/// Failures of the remote-repository synchronization legs.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("working copy at {0} is not a git repository")]
    NotARepository(String),

    #[error("local branch diverged from remote: {0}")]
    Diverged(String),

    #[error("git {operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    #[error("network failure: {0}")]
    Network(String),

    #[error("git {operation} failed: {detail}")]
    Command { operation: String, detail: String },

    #[error("filesystem error: {0}")]
    Io(String),
}

impl SyncError {
    /// Whether a single automatic retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Timeout { .. } | SyncError::Network(_))
    }

    /// Whether the working copy has to be force-reconciled with the remote.
    pub fn needs_reset(&self) -> bool {
        matches!(self, SyncError::NotARepository(_) | SyncError::Diverged(_))
    }
}

/// Errors from turning media into a durable public URL.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no media host is configured")]
    Unavailable,

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("media host rejected the file: {0}")]
    Rejected(String),

    #[error("upload timed out")]
    Timeout,
}

/// Errors related to configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid admin id '{0}'")]
    InvalidAdminId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_error_display() {
        let err = PriceError::Invalid("abc".to_string());
        assert_eq!(err.to_string(), "'abc' is not a number");
    }

    #[test]
    fn test_sync_error_classification() {
        assert!(SyncError::Network("reset by peer".into()).is_transient());
        assert!(
            SyncError::Timeout {
                operation: "push".into(),
                secs: 30
            }
            .is_transient()
        );
        assert!(!SyncError::Diverged("conflict".into()).is_transient());
        assert!(SyncError::Diverged("conflict".into()).needs_reset());
        assert!(SyncError::NotARepository("/tmp/x".into()).needs_reset());
        assert!(!SyncError::Io("denied".into()).needs_reset());
    }

    #[test]
    fn test_validation_error_wraps_price() {
        let err: ValidationError = PriceError::NotPositive("0".into()).into();
        assert!(err.to_string().contains("greater than zero"));
    }
}
