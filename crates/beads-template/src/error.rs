//! Template-crate errors.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown pattern variable: {0}")]
    UnknownVariable(String),

    #[error("pattern does not match filename: {0}")]
    PatternMismatch(String),

    #[error("invalid frontmatter: {0}")]
    InvalidFrontmatter(String),

    #[error("render error: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownVariable(_) | Self::PatternMismatch(_) | Self::InvalidFrontmatter(_) => {
                ErrorKind::Validation
            }
            Self::Render(_) => ErrorKind::Internal,
        }
    }
}
