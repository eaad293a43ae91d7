//! Top-level CLI error, mapped to the exit codes in SPEC_FULL §6.3:
//! 0 success, 1 compile failure, 2 configuration error, 3 upstream error.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("compile failed: {0}")]
    Compile(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Compile(_) => 1,
            Self::Config(_) => 2,
            Self::Upstream(_) => 3,
        }
    }
}

impl From<beads_template::TemplateError> for CliError {
    fn from(e: beads_template::TemplateError) -> Self {
        Self::Compile(e.to_string())
    }
}

impl From<beads_config::config::ConfigError> for CliError {
    fn from(e: beads_config::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<beads_storage::StorageError> for CliError {
    fn from(e: beads_storage::StorageError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
