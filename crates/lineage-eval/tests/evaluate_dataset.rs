use std::path::PathBuf;

use lineage_eval::{EvalError, EvaluateOptions, EvaluationEngine, validate_dataset_json};
use lineage_generate::{DATASET_FILE, GenerateOptions, GenerationEngine, SimulationConfig};

fn temp_out_dir() -> PathBuf {
    std::env::temp_dir().join(format!("lineage_eval_{}", uuid::Uuid::new_v4()))
}

fn generate(
    out_dir: PathBuf,
) -> Result<lineage_generate::GenerationResult, Box<dyn std::error::Error>> {
    let options = GenerateOptions {
        out_dir,
        seed: Some(31),
        simulation: SimulationConfig {
            families: 3,
            ..SimulationConfig::default()
        },
        ..GenerateOptions::default()
    };
    Ok(GenerationEngine::new(options).run()?)
}

#[test]
fn evaluates_generated_run_cleanly() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = temp_out_dir();
    let generated = generate(out_dir.clone())?;

    let options = EvaluateOptions {
        strict: true,
        ..EvaluateOptions::default()
    };
    let result = EvaluationEngine::new(options).run(&generated.run_dir.join(DATASET_FILE))?;

    assert!(result.violations.is_empty());
    assert!(result.metrics_path.exists());
    assert!(result.report_path.exists());
    assert!(result.violations_path.is_none());
    assert_eq!(result.metrics.run_id, generated.report.run_id);
    assert_eq!(
        result.metrics.counts.people,
        generated.dataset.people.len() as u64
    );
    assert_eq!(result.metrics.invariants.schema_violations, 0);
    assert!(result.report.contains("no violations detected"));

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&result.metrics_path)?)?;
    assert_eq!(written["metrics_version"], "0.1");

    std::fs::remove_dir_all(&out_dir)?;
    Ok(())
}

#[test]
fn broken_parent_link_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = temp_out_dir();
    let generated = generate(out_dir.clone())?;

    let mut dataset = generated.dataset.clone();
    dataset.people[0].father_id = Some(lineage_core::PersonId(uuid::Uuid::new_v4()));
    let tampered = out_dir.join("tampered").join(DATASET_FILE);
    std::fs::create_dir_all(tampered.parent().ok_or("no parent")?)?;
    std::fs::write(&tampered, serde_json::to_vec_pretty(&dataset)?)?;

    let strict = EvaluationEngine::new(EvaluateOptions {
        strict: true,
        ..EvaluateOptions::default()
    })
    .run(&tampered);
    assert!(matches!(strict, Err(EvalError::Violations(1))));

    let lenient = EvaluationEngine::new(EvaluateOptions {
        write_violations: true,
        ..EvaluateOptions::default()
    })
    .run(&tampered)?;
    assert_eq!(lenient.violations.len(), 1);
    assert_eq!(lenient.violations[0].code, "dangling_parent");
    assert_eq!(lenient.violations[0].path, "/people/0/father_id");
    assert!(lenient.violations_path.is_some_and(|path| path.exists()));
    assert!(lenient.report.contains("## Top violations"));

    std::fs::remove_dir_all(&out_dir)?;
    Ok(())
}

#[test]
fn schema_violations_point_at_the_field() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = temp_out_dir();
    let generated = generate(out_dir.clone())?;

    let mut raw = serde_json::to_value(&generated.dataset)?;
    raw["people"][0]["blood_type"] = serde_json::json!("Z+");
    let violations = validate_dataset_json(&raw)?;
    assert!(!violations.is_empty());
    assert!(
        violations
            .iter()
            .all(|violation| violation.code == "schema_violation")
    );
    assert!(
        violations
            .iter()
            .any(|violation| violation.path == "/people/0/blood_type")
    );

    let path = out_dir.join("bad.json");
    std::fs::write(&path, serde_json::to_vec(&raw)?)?;
    let result = EvaluationEngine::new(EvaluateOptions::default()).run(&path);
    assert!(matches!(result, Err(EvalError::InvalidDataset(_))));

    std::fs::remove_dir_all(&out_dir)?;
    Ok(())
}
