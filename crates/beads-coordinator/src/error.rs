//! Coordinator and resolver error types.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transient,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("storage error: {0}")]
    Storage(#[from] beads_storage::StorageError),

    #[error("coordinator for {0} is not accepting writes (state: {1:?})")]
    NotAccepting(String, crate::state::CoordinatorState),

    #[error("coordinator actor for {0} is gone")]
    ActorGone(String),
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Internal,
            Self::NotAccepting(..) => ErrorKind::Transient,
            Self::ActorGone(_) => ErrorKind::Internal,
        }
    }
}

/// Errors from the C11 installation-credential resolver (contract only,
/// SPEC_FULL §4.10 -- no concrete JWT/OAuth exchange is implemented here).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no installation is registered for {0}")]
    NoInstallation(String),

    #[error("credential exchange failed: {0}")]
    ExchangeFailed(String),
}
