//! Upstream-adapter errors.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transient,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("github API error: {0}")]
    Github(#[from] octocrab::Error),

    #[error("github issue/PR not found: {0}")]
    GithubNotFound(String),

    #[error("linear HTTP error: {0}")]
    LinearHttp(#[from] reqwest::Error),

    #[error("linear GraphQL error: {0}")]
    LinearGraphql(String),

    #[error("beads CLI error (exit code {code:?}): {stderr}")]
    BeadsCli { code: Option<i32>, stderr: String },

    #[error("beads jsonl error: {0}")]
    BeadsJsonl(#[from] beads_core::jsonl::JsonlError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing credential: {0}")]
    MissingCredential(String),
}

pub type Result<T> = std::result::Result<T, UpstreamError>;

impl UpstreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GithubNotFound(_) => ErrorKind::NotFound,
            Self::MissingCredential(_) => ErrorKind::Validation,
            Self::Github(_) | Self::LinearHttp(_) | Self::BeadsCli { .. } => ErrorKind::Transient,
            Self::LinearGraphql(_) | Self::BeadsJsonl(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error is eligible for the orchestrator's retry/backoff
    /// loop (transient upstream/network failures) versus recorded once and
    /// never retried (permanent 4xx/schema errors).
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}
