//! Sync-orchestrator errors.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transient,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("storage error: {0}")]
    Storage(#[from] beads_storage::StorageError),

    #[error("upstream error: {0}")]
    Upstream(#[from] beads_upstream::UpstreamError),

    #[error("template error: {0}")]
    Template(#[from] beads_template::TemplateError),

    #[error("config error: {0}")]
    Config(#[from] beads_config::config::ConfigError),

    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted { attempts: u32, source: beads_upstream::UpstreamError },
}

pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::Internal,
            Self::Upstream(e) => {
                if e.is_transient() {
                    ErrorKind::Transient
                } else {
                    ErrorKind::Validation
                }
            }
            Self::Template(_) | Self::Config(_) => ErrorKind::Validation,
            Self::RetriesExhausted { .. } => ErrorKind::Transient,
        }
    }
}
