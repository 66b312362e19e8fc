use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StoreError {
    // Input validation
    #[error("Domain and path must be specified")]
    MissingDomainOrPath,

    // Store availability
    #[error("Key-value store client is not initialized")]
    ClientUnavailable,
    #[error("Key-value store connect failed: {message}")]
    ConnectFailed { message: String },
    #[error("Key-value store error: {message}")]
    Backend { message: String },
    #[error("Background task failed: {message}")]
    TaskFailed { message: String },

    // Cookie data
    #[error("Invalid cookie data: {message}")]
    InvalidCookieData { message: String },
    #[error("Cookie parse failed: {message}")]
    CookieParse { message: String },
    #[error("Cookie prefix validation failed")]
    CookieInvalidPrefix,
    #[error("Cookie domain is a public suffix")]
    CookiePublicSuffix,
    #[error("Cookie domain {domain} does not match host {host}")]
    CookieDomainMismatch { domain: String, host: String },
}

impl StoreError {
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend {
            message: message.into(),
        }
    }

    pub fn connect_failed(message: impl Into<String>) -> Self {
        StoreError::ConnectFailed {
            message: message.into(),
        }
    }

    pub fn invalid_cookie_data(message: impl Into<String>) -> Self {
        StoreError::InvalidCookieData {
            message: message.into(),
        }
    }

    pub fn cookie_parse(message: impl Into<String>) -> Self {
        StoreError::CookieParse {
            message: message.into(),
        }
    }

    /// Errors reported by the key-value store itself, as opposed to
    /// validation or data errors raised by the adapter.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            StoreError::ClientUnavailable
                | StoreError::ConnectFailed { .. }
                | StoreError::Backend { .. }
                | StoreError::TaskFailed { .. }
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::InvalidCookieData {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::TaskFailed {
            message: err.to_string(),
        }
    }
}
