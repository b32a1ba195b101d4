use std::any::Any;
use std::path::PathBuf;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use lineage_core::{Dataset, build_lineage_graph_report, validate_dataset};

use crate::config::SimulationConfig;
use crate::errors::GenerationError;
use crate::faker_rs::{FakeRsAdapter, FakerSource};
use crate::model::{GenerateOptions, GenerationReport, SimulationStats};
use crate::output::csv::write_people_csv;
use crate::population::Population;
use crate::seeder::seed_population;
use crate::simulation::YearStepper;
use crate::synth::AttributeSynthesizer;

pub const DATASET_FILE: &str = "family_tree.json";
pub const PEOPLE_CSV_FILE: &str = "people.csv";
pub const REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub run_dir: PathBuf,
    pub report: GenerationReport,
    pub dataset: Dataset,
}

/// Seed and simulate a population in memory.
///
/// The same `seed`, configuration and faker always yield the same dataset.
/// The result is checked against the dataset invariants before it is returned.
pub fn simulate_dataset(
    config: &SimulationConfig,
    faker: Box<dyn FakerSource>,
    seed: u64,
) -> Result<(Dataset, SimulationStats), GenerationError> {
    config.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let synth = AttributeSynthesizer::new(config, faker);
    let mut population = Population::new(config);
    let mut stats = SimulationStats::default();

    seed_population(&mut population, &synth, config, &mut stats, &mut rng);
    YearStepper::new(config, &synth).run(&mut population, &mut stats, &mut rng);

    let dataset = population.into_dataset();
    validate_dataset(&dataset)?;
    Ok((dataset, stats))
}

/// Entry point for generating family-tree datasets into a run directory.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Simulate a dataset and write `family_tree.json`, `people.csv` and
    /// `generation_report.json` under `<out_dir>/<timestamp>__run_<id>/`.
    pub fn run(&self) -> Result<GenerationResult, GenerationError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
        let run_dir = self
            .options
            .out_dir
            .join(format!("{timestamp}__run_{run_id}"));
        std::fs::create_dir_all(&run_dir)?;
        self.run_in(run_dir, run_id)
    }

    /// Like [`Self::run`], writing into an existing run directory.
    pub fn run_in(&self, run_dir: PathBuf, run_id: String) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let seed = self.options.seed.unwrap_or_else(rand::random::<u64>);
        let faker = FakeRsAdapter::for_locale(&self.options.locale)?;
        let config = &self.options.simulation;

        let mut report = GenerationReport::new(run_id.clone(), seed, &self.options);

        info!(
            run_id = %run_id,
            seed,
            families = config.families,
            start_year = config.start_year,
            present_year = config.present_year,
            locale = %faker.locale(),
            "generation started"
        );

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(
            || -> Result<Dataset, GenerationError> {
                let (dataset, stats) = simulate_dataset(config, Box::new(faker), seed)?;
                report.stats = stats;

                let json = serde_json::to_vec_pretty(&dataset)?;
                std::fs::write(run_dir.join(DATASET_FILE), &json)?;
                report.bytes_written += json.len() as u64;
                report.bytes_written += write_people_csv(&run_dir.join(PEOPLE_CSV_FILE), &dataset.people)?;

                summarize(&mut report, &dataset);
                Ok(dataset)
            },
        ));

        report.duration_ms = start.elapsed().as_millis() as u64;

        let report_path = run_dir.join(REPORT_FILE);
        let write_report = |report: &GenerationReport| -> Result<(), GenerationError> {
            std::fs::write(&report_path, serde_json::to_vec_pretty(report)?)?;
            Ok(())
        };

        match outcome {
            Ok(Ok(dataset)) => {
                write_report(&report)?;
                info!(
                    run_id = %run_id,
                    people = report.people,
                    marriages = report.marriages,
                    generations = report.generations_achieved.unwrap_or(0),
                    duration_ms = report.duration_ms,
                    bytes_written = report.bytes_written,
                    "generation completed"
                );
                Ok(GenerationResult {
                    run_dir,
                    report,
                    dataset,
                })
            }
            Ok(Err(err)) => {
                report.record_failure(err.to_string());
                write_report(&report)?;
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
            Err(panic) => {
                report.record_failure(panic_message(panic));
                write_report(&report)?;
                warn!(run_id = %run_id, "generation panicked");
                Err(GenerationError::Failed(Box::new(report)))
            }
        }
    }
}

fn summarize(report: &mut GenerationReport, dataset: &Dataset) {
    report.people = dataset.people.len() as u64;
    report.placeholders = dataset.people.iter().filter(|p| p.is_placeholder()).count() as u64;
    report.deceased = dataset.people.iter().filter(|p| p.is_deceased).count() as u64;
    report.marriages = dataset.marriages.len() as u64;
    report.active_marriages = dataset.marriages.iter().filter(|m| m.current).count() as u64;

    let graph = build_lineage_graph_report(dataset);
    report.generations_achieved = graph.generations;
    let achieved = graph.generations.unwrap_or(0);
    if achieved < report.generations_requested {
        let message = format!(
            "requested {} generations, simulated span produced {achieved}",
            report.generations_requested
        );
        warn!(
            requested = report.generations_requested,
            achieved, "fewer generations than requested"
        );
        report.record_warning("generations_short", message);
    }
    if report.stats.refusals_total() > 0 {
        info!(
            refusals = report.stats.refusals_total(),
            "attempts refused during simulation"
        );
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "generation panicked".to_string()
    }
}
