//! Dataset evaluation for Lineage.
//!
//! Checks a `family_tree.json` artifact against its JSON Schema and the
//! genealogical invariants, collects lineage and demographic metrics, and
//! writes `metrics.json` plus a markdown report.

pub mod checks;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod model;
pub mod report;

pub use checks::{CheckOutcome, check_dataset};
pub use engine::{
    EvaluationEngine, METRICS_FILE, REPORT_MD_FILE, VIOLATIONS_FILE, validate_dataset_json,
};
pub use errors::EvalError;
pub use metrics::{
    DatasetCounts, Demographics, InvariantSummary, LabelCount, LineageMetrics, METRICS_VERSION,
    MetricsReport, PerformanceMetrics, WarningItem, collect_metrics,
};
pub use model::{EvaluateOptions, EvaluationResult, Violation};
pub use report::render_report;
