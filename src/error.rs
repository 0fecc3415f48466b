use thiserror::Error;

/// Errors produced by the enable-and-configure operation.
#[derive(Debug, Error)]
pub enum EnablementError {
    /// A required account id, repository name, or filter list is absent.
    /// Raised before any external call is attempted.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    /// The enable or configure call itself failed (permissions, throttling,
    /// invalid parameters). Nothing is retried and nothing is rolled back.
    #[error("{operation} failed: {message}")]
    UpstreamService { operation: String, message: String },
}

impl EnablementError {
    /// Create an upstream-service error for a named operation.
    pub fn upstream(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamService {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
