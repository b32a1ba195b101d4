use thiserror::Error;

/// Core error type shared across Lineage crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The dataset violates internal invariants.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),
}

/// Convenience alias for results returned by Lineage crates.
pub type Result<T> = std::result::Result<T, Error>;
