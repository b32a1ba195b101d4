use std::path::Path;
use std::time::Instant;

use jsonschema::JSONSchema;
use serde_json::Value;

use lineage_core::{Dataset, dataset_json_schema};
use lineage_generate::{GenerationReport, REPORT_FILE};

use crate::checks::{CheckOutcome, check_dataset};
use crate::errors::EvalError;
use crate::metrics::{
    InvariantSummary, METRICS_VERSION, MetricsReport, PerformanceMetrics, WarningItem,
    collect_metrics,
};
use crate::model::{EvaluateOptions, EvaluationResult, Violation};
use crate::report::render_report;

pub const METRICS_FILE: &str = "metrics.json";
pub const REPORT_MD_FILE: &str = "report.md";
pub const VIOLATIONS_FILE: &str = "violations.json";

/// Evaluate `family_tree.json` datasets against the schema and invariants.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    options: EvaluateOptions,
}

impl EvaluationEngine {
    pub fn new(options: EvaluateOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, dataset_path: &Path) -> Result<EvaluationResult, EvalError> {
        let total_start = Instant::now();
        let load_start = Instant::now();

        let dataset_dir = dataset_path.parent().unwrap_or_else(|| Path::new("."));
        let run_id = detect_run_id(dataset_dir).unwrap_or_else(|| "unknown".to_string());

        let raw: Value = serde_json::from_slice(&std::fs::read(dataset_path)?)?;
        let load_ms = load_start.elapsed().as_millis();
        let validate_start = Instant::now();

        let schema_violations = validate_dataset_json(&raw)?;
        let dataset: Dataset = serde_json::from_value(raw).map_err(|err| {
            EvalError::InvalidDataset(format!(
                "{err} ({} schema violation(s))",
                schema_violations.len()
            ))
        })?;

        let mut outcome = check_dataset(&dataset, &self.options.policy);
        outcome.violations.extend(schema_violations);
        sort_warnings(&mut outcome.warnings);
        sort_violations(&mut outcome.violations);

        let (counts, lineage, demographics) = collect_metrics(&dataset, self.options.as_of_year);
        let validate_ms = validate_start.elapsed().as_millis();

        let invariants = InvariantSummary::from_outcome(&outcome);
        let CheckOutcome {
            violations,
            warnings,
            ..
        } = outcome;

        let metrics = MetricsReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id,
            dataset: dataset_path.display().to_string(),
            as_of_year: self.options.as_of_year,
            counts,
            lineage,
            demographics,
            invariants,
            warnings,
            performance: PerformanceMetrics {
                load_ms,
                validate_ms,
                total_ms: total_start.elapsed().as_millis(),
            },
        };

        let report = render_report(&metrics, &violations, self.options.max_examples);
        let out_dir = self
            .options
            .out_dir
            .clone()
            .unwrap_or_else(|| dataset_dir.to_path_buf());
        std::fs::create_dir_all(&out_dir)?;

        let metrics_path = out_dir.join(METRICS_FILE);
        std::fs::write(&metrics_path, serde_json::to_vec_pretty(&metrics)?)?;

        let report_path = out_dir.join(REPORT_MD_FILE);
        std::fs::write(&report_path, report.as_bytes())?;

        let violations_path = if self.options.write_violations {
            let path = out_dir.join(VIOLATIONS_FILE);
            std::fs::write(&path, serde_json::to_vec_pretty(&violations)?)?;
            Some(path)
        } else {
            None
        };

        if self.options.strict && !violations.is_empty() {
            return Err(EvalError::Violations(violations.len() as u64));
        }

        Ok(EvaluationResult {
            run_dir: out_dir,
            metrics_path,
            report_path,
            violations_path,
            metrics,
            report,
            violations,
        })
    }
}

/// Validate a raw dataset document against the `family_tree.json` schema.
pub fn validate_dataset_json(raw: &Value) -> Result<Vec<Violation>, EvalError> {
    let schema = serde_json::to_value(dataset_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| EvalError::Schema(err.to_string()))?;

    let mut violations = Vec::new();
    if let Err(errors) = compiled.validate(raw) {
        for error in errors {
            let path = error.instance_path.to_string();
            let path = if path.is_empty() { "/".to_string() } else { path };
            violations.push(Violation::new(
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }
    Ok(violations)
}

fn detect_run_id(dataset_dir: &Path) -> Option<String> {
    let report_path = dataset_dir.join(REPORT_FILE);
    if let Ok(contents) = std::fs::read_to_string(report_path)
        && let Ok(report) = serde_json::from_str::<GenerationReport>(&contents)
    {
        return Some(report.run_id);
    }

    let name = dataset_dir.file_name()?.to_string_lossy();
    name.split_once("__run_")
        .map(|(_, run_part)| run_part.to_string())
}

fn sort_warnings(warnings: &mut [WarningItem]) {
    warnings.sort_by(|a, b| (&a.path, &a.code).cmp(&(&b.path, &b.code)));
}

fn sort_violations(violations: &mut [Violation]) {
    violations.sort_by(|a, b| {
        (&a.path, &a.code, &a.message).cmp(&(&b.path, &b.code, &b.message))
    });
}
