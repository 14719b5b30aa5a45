use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No cached snapshot at {0}")]
    CacheMissing(String),

    #[error("Corrupt cache: {0}")]
    CorruptCache(String),

    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

impl DomainError {
    /// Errors a caller may log and carry on from.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound(_) | DomainError::CacheMissing(_) | DomainError::MalformedKey(_)
        )
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Io(e.to_string())
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
