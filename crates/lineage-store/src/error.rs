use thiserror::Error;

use lineage_core::PersonId;

/// Errors raised by dataset stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    /// A stored row cannot be turned back into a dataset record.
    #[error("invalid row for {id}: {message}")]
    InvalidRow { id: PersonId, message: String },
    #[error(transparent)]
    Dataset(#[from] lineage_core::Error),
}

impl StoreError {
    pub(crate) fn invalid_row(id: PersonId, message: impl Into<String>) -> Self {
        StoreError::InvalidRow {
            id,
            message: message.into(),
        }
    }
}
