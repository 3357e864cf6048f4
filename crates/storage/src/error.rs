//! Storage failures, typed by what the tracking pipeline can do about them.

use thiserror::Error;

/// SQLSTATE codes the store reacts to.
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A unique key (node key, global objective key) is already taken.
    #[error("unique key {constraint} already taken")]
    Duplicate { constraint: String },

    /// A row reached the store without a column its key is built from.
    #[error("{table} row without {column}")]
    MissingKey { table: &'static str, column: &'static str },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("schema statement {statement} failed: {source}")]
    Migration {
        statement: usize,
        #[source]
        source: sqlx::Error,
    },
}

impl StorageError {
    /// Pool exhaustion, I/O and aborted-transaction errors. The pipeline never
    /// retries; callers may.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => true,
            Self::Database(sqlx::Error::Database(db)) => db
                .code()
                .is_some_and(|c| c == SERIALIZATION_FAILURE || c == DEADLOCK_DETECTED),
            _ => false,
        }
    }

    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound { entity: "row", id: "unknown".into() },
            sqlx::Error::Database(db) if db.code().is_some_and(|c| c == UNIQUE_VIOLATION) => {
                Self::Duplicate {
                    constraint: db.constraint().unwrap_or_else(|| db.message()).to_owned(),
                }
            },
            _ => Self::Database(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = StorageError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::NotFound { entity: "row", .. }));
        assert!(!err.is_transient());
    }

    #[test]
    fn pool_timeout_is_transient() {
        let err = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
        assert!(!err.is_duplicate());
    }

    #[test]
    fn missing_key_names_the_column() {
        let err = StorageError::MissingKey { table: "cmi_node", column: "cp_node_id" };
        assert_eq!(err.to_string(), "cmi_node row without cp_node_id");
        assert!(!err.is_transient());
        assert!(StorageError::Duplicate { constraint: "idx_cmi_node_key".into() }.is_duplicate());
    }
}
