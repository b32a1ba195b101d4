use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use lineage_core::PersonId;
use lineage_generate::SimulationConfig;

use crate::metrics::MetricsReport;

/// Options for dataset evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateOptions {
    /// Fail when any invariant is violated.
    pub strict: bool,
    /// Limit the number of examples emitted in the report.
    pub max_examples: usize,
    /// Emit violations.json with the full list of violations.
    pub write_violations: bool,
    /// Year ages are measured at.
    pub as_of_year: i32,
    /// Marriage and fertility limits the dataset was generated under.
    #[serde(default)]
    pub policy: SimulationConfig,
    /// Optional output directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_examples: 20,
            write_violations: false,
            as_of_year: 2025,
            policy: SimulationConfig::default(),
            out_dir: None,
        }
    }
}

/// Structured violation record. `path` is a JSON pointer into the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<PersonId>,
}

impl Violation {
    pub fn new(
        code: &str,
        path: impl Into<String>,
        message: impl Into<String>,
        person_id: Option<PersonId>,
    ) -> Self {
        Self {
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
            person_id,
        }
    }
}

/// Result of a dataset evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub run_dir: PathBuf,
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub violations_path: Option<PathBuf>,
    pub metrics: MetricsReport,
    pub report: String,
    pub violations: Vec<Violation>,
}
