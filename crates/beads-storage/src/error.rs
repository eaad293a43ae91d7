//! Storage error types.

/// Coarse error classification used by the effect loop's retry decision
/// (SPEC_FULL §7.1) -- shared across every crate-local error enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Authorization,
    Transient,
    NotFound,
    Internal,
}

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `upsert`'s guard did not match the stored `updated_at` (I6, optimistic concurrency).
    #[error("stale write on {id}: expected updated_at {expected}, found {actual}")]
    StaleWrite {
        id: String,
        expected: String,
        actual: String,
    },

    /// Adding a dependency would create a cycle in the `blocks` graph (I3).
    #[error("adding blocks({from}, {to}) would create a cycle")]
    Cycle { from: String, to: String },

    /// A dependency edge would connect an issue to itself (I2).
    #[error("an issue cannot depend on itself: {id}")]
    SelfLoop { id: String },

    /// An edge referenced an issue id that does not exist.
    #[error("edge endpoint not found: {id}")]
    Missing { id: String },

    /// A received delivery was already applied (I7/P3).
    #[error("duplicate delivery: {0}")]
    Duplicate(String),

    /// A validation constraint was violated.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The database is locked by another process.
    #[error("database locked: {0}")]
    DatabaseLocked(String),

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A schema migration failed.
    #[error("migration {name} failed: {reason}")]
    Migration { name: String, reason: String },

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// JSON serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the storage crate.
pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry (e.g., database locked, connection errors).
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transient)
    }

    /// Classifies this error into one of the six taxonomy kinds (§7).
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StaleWrite { .. } | Self::Cycle { .. } | Self::SelfLoop { .. } | Self::Duplicate(_) => {
                ErrorKind::Conflict
            }
            Self::Missing { .. } | Self::Validation { .. } => ErrorKind::Validation,
            Self::DatabaseLocked(_) | Self::Connection(_) | Self::Transaction(_) => {
                ErrorKind::Transient
            }
            Self::Migration { .. } | Self::Query(_) | Self::Serialization(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_is_conflict_not_retryable() {
        let e = StorageError::Cycle {
            from: "a".into(),
            to: "b".into(),
        };
        assert_eq!(e.kind(), ErrorKind::Conflict);
        assert!(!e.is_retryable());
    }

    #[test]
    fn database_locked_is_transient_and_retryable() {
        let e = StorageError::DatabaseLocked("busy".into());
        assert_eq!(e.kind(), ErrorKind::Transient);
        assert!(e.is_retryable());
    }

    #[test]
    fn not_found_helper() {
        let e = StorageError::not_found("issue", "bd-xyz");
        assert!(e.is_not_found());
    }
}
