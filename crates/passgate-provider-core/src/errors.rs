pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The request cannot be shaped with the given configuration. Retrying changes nothing.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Token acquisition failed (missing, invalid or expired credential material).
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ProviderError::Configuration(msg.into())
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        ProviderError::Authentication(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Configuration(_))
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ProviderError::Authentication(_))
    }
}
