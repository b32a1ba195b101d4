//! Postgres storage for Lineage datasets.
//!
//! Loads a `family_tree.json` dataset into a flat `person` table (plus
//! `marriage`), reads it back in creation order, and runs the sample
//! analytics queries used to eyeball a generated population.

pub mod analytics;
pub mod error;
pub mod postgres;
pub mod store;

pub use analytics::{DecadeCount, LabelCount, ParentChildCount, SampleReport, UnknownParentCounts};
pub use error::StoreError;
pub use postgres::{PostgresStore, connect_pool};
pub use store::{DatasetStore, ImportSummary};
