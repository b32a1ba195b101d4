use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lineage_core::Dataset;

use crate::analytics::SampleReport;
use crate::error::StoreError;

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub people: u64,
    pub marriages: u64,
}

/// Trait implemented by backends that persist a dataset.
#[async_trait]
pub trait DatasetStore {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Create tables and indexes when missing.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Replace all stored rows with `dataset`. Importing the same dataset
    /// twice leaves the store unchanged.
    async fn import(&self, dataset: &Dataset) -> Result<ImportSummary, StoreError>;

    /// Read the stored dataset back, people in creation order.
    async fn export(&self) -> Result<Dataset, StoreError>;

    /// Run the sample analytics queries, ages measured at `as_of_year`.
    async fn sample_queries(&self, as_of_year: i32) -> Result<SampleReport, StoreError>;
}
