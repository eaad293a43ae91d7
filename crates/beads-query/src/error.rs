//! Query errors.

/// Coarse error classification, mirrored from `beads-storage::ErrorKind` so
/// callers can treat every crate's errors uniformly (SPEC_FULL §7.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("issue not found: {0}")]
    NotFound(String),

    #[error("invalid dag view: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;

impl QueryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Invalid(_) => ErrorKind::Validation,
        }
    }
}
