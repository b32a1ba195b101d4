use crate::metrics::MetricsReport;
use crate::model::Violation;

/// Render a deterministic markdown report from metrics and violations.
pub fn render_report(
    metrics: &MetricsReport,
    violations: &[Violation],
    max_examples: usize,
) -> String {
    let mut lines = Vec::new();

    lines.push("# Lineage Evaluation Report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {}", metrics.run_id));
    lines.push(format!("- dataset: {}", metrics.dataset));
    lines.push(format!("- as_of_year: {}", metrics.as_of_year));
    lines.push(String::new());

    let counts = &metrics.counts;
    lines.push("## Records".to_string());
    lines.push("| metric | value |".to_string());
    lines.push("| --- | --- |".to_string());
    for (name, value) in [
        ("people", counts.people),
        ("placeholders", counts.placeholders),
        ("living", counts.living),
        ("deceased", counts.deceased),
        ("marriages", counts.marriages),
        ("active_marriages", counts.active_marriages),
        ("divorces", counts.divorces),
    ] {
        lines.push(format!("| {name} | {value} |"));
    }
    lines.push(String::new());

    let lineage = &metrics.lineage;
    lines.push("## Lineage".to_string());
    lines.push(format!(
        "- generations: {}",
        lineage
            .generations
            .map(|value| value.to_string())
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(format!("- roots: {}", lineage.roots));
    lines.push(format!("- parent links: {}", lineage.edges));
    if lineage.has_cycle {
        lines.push("- ancestry cycle detected".to_string());
    }
    if !lineage.generation_sizes.is_empty() {
        lines.push(String::new());
        lines.push("| generation | people |".to_string());
        lines.push("| --- | --- |".to_string());
        for (generation, size) in &lineage.generation_sizes {
            lines.push(format!("| {generation} | {size} |"));
        }
    }
    lines.push(String::new());

    let demographics = &metrics.demographics;
    lines.push("## Demographics".to_string());
    lines.push(format!("- sex: {}", join_counts(&demographics.sex)));
    lines.push(format!(
        "- unknown parents: father {}, mother {}",
        demographics.unknown_father, demographics.unknown_mother
    ));
    lines.push(format!(
        "- children per parent: mean {:.2}, max {}",
        demographics.mean_children_per_parent, demographics.max_children
    ));
    if let Some(lifespan) = demographics.mean_lifespan_years {
        lines.push(format!("- mean lifespan: {lifespan:.2} years"));
    }
    lines.push(String::new());
    lines.push("| living age | people |".to_string());
    lines.push("| --- | --- |".to_string());
    for bucket in &demographics.living_age_distribution {
        lines.push(format!("| {} | {} |", bucket.label, bucket.count));
    }
    lines.push(String::new());
    lines.push("| birth decade | people |".to_string());
    lines.push("| --- | --- |".to_string());
    for (decade, count) in &demographics.births_by_decade {
        lines.push(format!("| {decade}s | {count} |"));
    }
    lines.push(String::new());

    let invariants = &metrics.invariants;
    lines.push("## Invariants".to_string());
    lines.push(format!("- records checked: {}", invariants.records_checked));
    lines.push(format!("- violations: {}", invariants.violations));
    if !invariants.violations_by_code.is_empty() {
        lines.push("| code | count |".to_string());
        lines.push("| --- | --- |".to_string());
        for (code, count) in &invariants.violations_by_code {
            lines.push(format!("| {code} | {count} |"));
        }
    }
    lines.push(String::new());

    if !metrics.warnings.is_empty() {
        lines.push("## Warnings".to_string());
        for warning in metrics.warnings.iter().take(max_examples) {
            let hint = warning
                .hint
                .as_ref()
                .map(|hint| format!(" (hint: {hint})"))
                .unwrap_or_default();
            lines.push(format!(
                "- {} [{}]: {}{}",
                warning.path, warning.code, warning.message, hint
            ));
        }
        if metrics.warnings.len() > max_examples {
            lines.push(format!(
                "- ... {} more",
                metrics.warnings.len() - max_examples
            ));
        }
        lines.push(String::new());
    }

    if !violations.is_empty() {
        lines.push("## Top violations".to_string());
        for violation in violations.iter().take(max_examples) {
            lines.push(format!(
                "- {} [{}]: {}",
                violation.path, violation.code, violation.message
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics));
    lines.join("\n")
}

fn join_counts(counts: &std::collections::BTreeMap<String, u64>) -> String {
    if counts.is_empty() {
        return "-".to_string();
    }
    counts
        .iter()
        .map(|(label, count)| format!("{label}={count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn recommendations(metrics: &MetricsReport) -> Vec<String> {
    let codes = &metrics.invariants.violations_by_code;
    let mut lines = Vec::new();
    if codes.contains_key("schema_violation") {
        lines.push("- regenerate the dataset; it does not match the published schema.".to_string());
    }
    if codes.contains_key("dangling_parent") {
        lines.push("- create placeholder parents instead of leaving ids unresolved.".to_string());
    }
    if codes.contains_key("concurrent_marriage") {
        lines.push("- divorce before remarrying outside the exemption window.".to_string());
    }
    if metrics.lineage.has_cycle {
        lines.push("- break the ancestry cycle; parents must be born before children.".to_string());
    }
    if metrics.lineage.generations.unwrap_or(0) < 2 {
        lines.push("- widen the simulated year span to grow more generations.".to_string());
    }
    if codes.is_empty() {
        lines.push("- no violations detected; compare metrics across runs for drift.".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::metrics::{
        DatasetCounts, Demographics, InvariantSummary, LineageMetrics, METRICS_VERSION,
        PerformanceMetrics,
    };

    fn metrics() -> MetricsReport {
        MetricsReport {
            metrics_version: METRICS_VERSION.to_string(),
            run_id: "run-1".to_string(),
            dataset: "family_tree.json".to_string(),
            as_of_year: 2025,
            counts: DatasetCounts {
                people: 10,
                ..DatasetCounts::default()
            },
            lineage: LineageMetrics {
                generations: Some(3),
                generation_sizes: BTreeMap::from([(1, 4), (2, 4), (3, 2)]),
                ..LineageMetrics::default()
            },
            demographics: Demographics::default(),
            invariants: InvariantSummary::default(),
            warnings: Vec::new(),
            performance: PerformanceMetrics::default(),
        }
    }

    #[test]
    fn clean_report_has_sections_and_no_violations() {
        let report = render_report(&metrics(), &[], 5);
        assert!(report.starts_with("# Lineage Evaluation Report"));
        assert!(report.contains("| people | 10 |"));
        assert!(report.contains("- generations: 3"));
        assert!(report.contains("| 3 | 2 |"));
        assert!(!report.contains("## Top violations"));
        assert!(report.contains("no violations detected"));
    }

    #[test]
    fn violations_are_truncated_to_max_examples() {
        let mut metrics = metrics();
        metrics
            .invariants
            .violations_by_code
            .insert("dangling_parent".to_string(), 3);
        let violations: Vec<_> = (0..3)
            .map(|row| {
                Violation::new(
                    "dangling_parent",
                    format!("/people/{row}/father_id"),
                    "father does not resolve",
                    None,
                )
            })
            .collect();
        let report = render_report(&metrics, &violations, 2);
        assert!(report.contains("/people/1/father_id"));
        assert!(!report.contains("/people/2/father_id"));
        assert!(report.contains("create placeholder parents"));
    }
}
