use thiserror::Error;

/// Application-wide error types for jobbot.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Page content could not be interpreted.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Configuration file missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Tailored document could not be rendered.
    #[error("Render error: {0}")]
    RenderError(String),

    /// Message could not be built or delivered.
    #[error("Email error: {0}")]
    EmailError(String),

    /// SMTP credentials not present in the environment.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// A job record was scored twice.
    #[error("Job '{0}' has already been scored")]
    AlreadyScored(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this is a transport failure worth retrying.
    ///
    /// Status-based retries are decided by the retry policy, not here.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(AppError::NetworkError("reset".into()).is_retryable());
        assert!(AppError::Timeout(30).is_retryable());
        assert!(AppError::HttpError("connection reset by peer".into()).is_retryable());
        assert!(!AppError::ParseError("bad html".into()).is_retryable());
        assert!(
            !AppError::HttpStatus {
                status: 503,
                url: "https://example.com".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_status_accessor() {
        let err = AppError::HttpStatus {
            status: 429,
            url: "https://example.com".into(),
        };
        assert_eq!(err.status(), Some(429));
        assert_eq!(AppError::Timeout(5).status(), None);
        assert_eq!(err.to_string(), "HTTP 429 for https://example.com");
    }
}
