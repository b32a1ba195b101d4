use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use lineage_core::{
    AGE_BUCKETS, Dataset, ParentRef, PersonId, age_bucket, build_lineage_graph_report, decade_of,
};

use crate::checks::CheckOutcome;

/// Metrics contract version for dataset evaluation.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable metrics for a dataset evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub metrics_version: String,
    pub run_id: String,
    pub dataset: String,
    pub as_of_year: i32,
    pub counts: DatasetCounts,
    pub lineage: LineageMetrics,
    pub demographics: Demographics,
    pub invariants: InvariantSummary,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<WarningItem>,
    pub performance: PerformanceMetrics,
}

/// Record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCounts {
    pub people: u64,
    pub placeholders: u64,
    pub living: u64,
    pub deceased: u64,
    pub marriages: u64,
    pub active_marriages: u64,
    pub divorces: u64,
}

/// Shape of the parent/child graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageMetrics {
    pub nodes: usize,
    pub edges: usize,
    pub roots: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generations: Option<u32>,
    pub generation_sizes: BTreeMap<u32, usize>,
    pub has_cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// Population make-up. Placeholder parents are left out of every figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub sex: BTreeMap<String, u64>,
    pub blood_type: BTreeMap<String, u64>,
    pub nationality: BTreeMap<String, u64>,
    pub living_age_distribution: Vec<LabelCount>,
    pub births_by_decade: BTreeMap<i32, u64>,
    pub unknown_father: u64,
    pub unknown_mother: u64,
    pub parents: u64,
    pub mean_children_per_parent: f64,
    pub max_children: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_lifespan_years: Option<f64>,
}

/// Outcome of the invariant checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantSummary {
    pub records_checked: u64,
    pub schema_violations: u64,
    pub violations: u64,
    pub violations_by_code: BTreeMap<String, u64>,
}

/// Structured warning entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningItem {
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Performance timings for the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub load_ms: u128,
    pub validate_ms: u128,
    pub total_ms: u128,
}

/// Count records, measure the lineage graph and summarize demographics.
/// Invariant and timing fields are left for the caller.
pub fn collect_metrics(
    dataset: &Dataset,
    as_of_year: i32,
) -> (DatasetCounts, LineageMetrics, Demographics) {
    (
        collect_counts(dataset),
        collect_lineage(dataset),
        collect_demographics(dataset, as_of_year),
    )
}

impl InvariantSummary {
    pub fn from_outcome(outcome: &CheckOutcome) -> Self {
        let violations_by_code = outcome.violations_by_code();
        Self {
            records_checked: outcome.records_checked,
            schema_violations: violations_by_code
                .get("schema_violation")
                .copied()
                .unwrap_or(0),
            violations: outcome.violations.len() as u64,
            violations_by_code,
        }
    }
}

fn collect_counts(dataset: &Dataset) -> DatasetCounts {
    let mut counts = DatasetCounts {
        people: dataset.people.len() as u64,
        marriages: dataset.marriages.len() as u64,
        ..DatasetCounts::default()
    };
    for person in &dataset.people {
        if person.is_placeholder() {
            counts.placeholders += 1;
        }
        if person.is_deceased {
            counts.deceased += 1;
        } else {
            counts.living += 1;
        }
    }
    for marriage in &dataset.marriages {
        if marriage.current {
            counts.active_marriages += 1;
        } else {
            counts.divorces += 1;
        }
    }
    counts
}

fn collect_lineage(dataset: &Dataset) -> LineageMetrics {
    let graph = build_lineage_graph_report(dataset);
    LineageMetrics {
        nodes: graph.summary.nodes,
        edges: graph.summary.edges,
        roots: graph.summary.roots,
        generations: graph.generations,
        generation_sizes: graph.generation_sizes,
        has_cycle: graph.cycle.is_some(),
    }
}

fn collect_demographics(dataset: &Dataset, as_of_year: i32) -> Demographics {
    let index = dataset.index();
    let mut demographics = Demographics::default();
    let mut buckets: BTreeMap<&str, u64> = BTreeMap::new();
    let mut lifespans = Vec::new();

    for person in dataset.people.iter().filter(|person| !person.is_placeholder()) {
        *demographics.sex.entry(person.sex.to_string()).or_insert(0) += 1;
        *demographics
            .blood_type
            .entry(person.blood_type.to_string())
            .or_insert(0) += 1;
        *demographics
            .nationality
            .entry(person.nationality.to_string())
            .or_insert(0) += 1;
        *demographics
            .births_by_decade
            .entry(decade_of(person.birth_year()))
            .or_insert(0) += 1;

        match person.death_year() {
            Some(death_year) if person.is_deceased => {
                lifespans.push(f64::from(death_year - person.birth_year()));
            }
            _ if person.birth_year() <= as_of_year => {
                *buckets.entry(age_bucket(person.age_in(as_of_year))).or_insert(0) += 1;
            }
            _ => {}
        }

        if unknown(Dataset::resolve_parent(&index, person.father_id)) {
            demographics.unknown_father += 1;
        }
        if unknown(Dataset::resolve_parent(&index, person.mother_id)) {
            demographics.unknown_mother += 1;
        }
    }

    demographics.living_age_distribution = AGE_BUCKETS
        .iter()
        .map(|bucket| LabelCount {
            label: (*bucket).to_string(),
            count: buckets.get(bucket).copied().unwrap_or(0),
        })
        .collect();

    let mut children: HashMap<PersonId, u64> = HashMap::new();
    for person in &dataset.people {
        for parent in [person.father_id, person.mother_id].into_iter().flatten() {
            if index.get(&parent).is_some_and(|parent| !parent.is_placeholder()) {
                *children.entry(parent).or_insert(0) += 1;
            }
        }
    }
    demographics.parents = children.len() as u64;
    demographics.max_children = children.values().copied().max().unwrap_or(0);
    if !children.is_empty() {
        let total: u64 = children.values().sum();
        demographics.mean_children_per_parent = round2(total as f64 / children.len() as f64);
    }
    if !lifespans.is_empty() {
        let total: f64 = lifespans.iter().sum();
        demographics.mean_lifespan_years = Some(round2(total / lifespans.len() as f64));
    }

    demographics
}

fn unknown(parent: ParentRef<'_>) -> bool {
    matches!(parent, ParentRef::Absent | ParentRef::Placeholder(_))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use lineage_generate::{FakeRsAdapter, SimulationConfig, simulate_dataset};

    use super::*;

    #[test]
    fn counts_and_demographics_agree_with_dataset() {
        let config = SimulationConfig {
            families: 3,
            ..SimulationConfig::default()
        };
        let (dataset, _) =
            simulate_dataset(&config, Box::new(FakeRsAdapter::default()), 23).expect("simulation");
        let (counts, lineage, demographics) = collect_metrics(&dataset, 2025);

        assert_eq!(counts.people, dataset.people.len() as u64);
        assert_eq!(counts.living + counts.deceased, counts.people);
        assert_eq!(counts.active_marriages + counts.divorces, counts.marriages);
        assert_eq!(lineage.nodes, dataset.people.len());
        assert!(!lineage.has_cycle);

        let non_placeholders = counts.people - counts.placeholders;
        assert_eq!(demographics.sex.values().sum::<u64>(), non_placeholders);
        assert_eq!(
            demographics.births_by_decade.values().sum::<u64>(),
            non_placeholders
        );
        let labels: Vec<_> = demographics
            .living_age_distribution
            .iter()
            .map(|row| row.label.as_str())
            .collect();
        assert_eq!(labels, AGE_BUCKETS);
        assert!(demographics.max_children >= 1);
        assert!(demographics.unknown_father >= 6);
    }
}
