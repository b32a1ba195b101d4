//! Core contracts and helpers for Lineage.
//!
//! This crate defines the canonical dataset types (people, marriages),
//! validation helpers, lineage graph analysis, and utilities shared across
//! the generator, storage adapter, evaluator and CLI.

pub mod dataset;
pub mod demographics;
pub mod error;
pub mod graph;
pub mod person;
pub mod redaction;
pub mod schema;
pub mod types;
pub mod validation;

pub use dataset::{Dataset, ParentRef};
pub use demographics::{AGE_BUCKETS, age_bucket, decade_of};
pub use error::{Error, Result};
pub use graph::{LineageGraphReport, LineageGraphSummary, build_lineage_graph_report};
pub use person::{Marriage, PLACEHOLDER_NOTE, Person, PersonId, UNKNOWN_NAME};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::dataset_json_schema;
pub use types::{
    BLOOD_TYPE_WEIGHTS, BloodType, CauseOfDeath, Education, Ethnicity, EyeColor, HairColor,
    Nationality, Religion, Sex,
};
pub use validation::{MARRIAGE_MIN_AGE, validate_dataset};

/// Current contract version for `family_tree.json` artifacts.
pub const DATASET_VERSION: &str = "0.1";
