/// Errors that can occur within the storage layer.
///
/// # Examples
///
/// ```rust
/// use ivrmon_storage::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "ivr_path",
///     id: "CAxxxx".to_string(),
/// };
/// assert!(err.to_string().contains("ivr_path"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found in the database.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// An insert or upsert succeeded but the row could not be read back,
    /// which should be unreachable under the single-writer assumption.
    #[error("Storage: upsert of {entity} succeeded but the row could not be read back")]
    InsertReadback { entity: &'static str },

    /// An underlying SQLite error.
    #[error("Storage: SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database file could not be opened or created.
    #[error("Storage: cannot open database at {path}: {source}")]
    Open {
        path: String,
        source: rusqlite::Error,
    },

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
