use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::ledger::Refusal;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory where run artifacts are written.
    pub out_dir: PathBuf,
    /// Seed for the run's random source. Drawn once when absent.
    pub seed: Option<u64>,
    /// Faker locale for names, places and job titles.
    pub locale: String,
    /// Number of generations the caller hopes to see; the simulation always
    /// runs the full year span, so this is compared against the achieved depth.
    pub generations: u32,
    pub simulation: SimulationConfig,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            seed: None,
            locale: "en_US".to_string(),
            generations: 4,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Event counters collected while seeding and stepping the population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub years_simulated: u32,
    pub founders: u64,
    pub marriages_formed: u64,
    pub divorces: u64,
    pub marital_births: u64,
    pub out_of_wedlock_births: u64,
    pub orphans: u64,
    pub placeholders_created: u64,
    /// Refused marriage and birth attempts, keyed by refusal code.
    pub refusals: BTreeMap<String, u64>,
}

impl SimulationStats {
    pub fn record_refusal(&mut self, refusal: &Refusal) {
        *self.refusals.entry(refusal.code().to_string()).or_insert(0) += 1;
    }

    pub fn refusals_total(&self) -> u64 {
        self.refusals.values().sum()
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
}

/// Report for a generation run, written as `generation_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub locale: String,
    pub start_year: i32,
    pub present_year: i32,
    pub families: u32,
    pub generations_requested: u32,
    pub generations_achieved: Option<u32>,
    pub people: u64,
    pub placeholders: u64,
    pub deceased: u64,
    pub marriages: u64,
    pub active_marriages: u64,
    pub stats: SimulationStats,
    pub bytes_written: u64,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, options: &GenerateOptions) -> Self {
        Self {
            run_id,
            seed,
            locale: options.locale.clone(),
            start_year: options.simulation.start_year,
            present_year: options.simulation.present_year,
            families: options.simulation.families,
            generations_requested: options.generations,
            generations_achieved: None,
            people: 0,
            placeholders: 0,
            deceased: 0,
            marriages: 0,
            active_marriages: 0,
            stats: SimulationStats::default(),
            bytes_written: 0,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_warning(&mut self, code: &str, message: impl Into<String>) {
        *self.warnings_by_code.entry(code.to_string()).or_insert(0) += 1;
        self.warnings.push(GenerationIssue {
            level: "warning".to_string(),
            code: code.to_string(),
            message: message.into(),
        });
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.warnings.push(GenerationIssue {
            level: "error".to_string(),
            code: "generation_failed".to_string(),
            message: message.into(),
        });
    }
}
