//! Generational simulation engine for Lineage.
//!
//! Seeds founding family lines, then steps the population year by year
//! (marriages, divorces, births, orphans) to produce a self-consistent
//! `family_tree.json` dataset, with CSV and report artifacts per run.

pub mod config;
pub mod engine;
pub mod errors;
pub mod faker_rs;
pub mod ledger;
pub mod model;
pub mod mortality;
pub mod output;
pub mod population;
pub mod registry;
pub mod seeder;
pub mod simulation;
pub mod synth;

pub use config::SimulationConfig;
pub use engine::{
    DATASET_FILE, GenerationEngine, GenerationResult, PEOPLE_CSV_FILE, REPORT_FILE, simulate_dataset,
};
pub use errors::GenerationError;
pub use faker_rs::{FakeRsAdapter, FakerCategory, FakerSource, LocaleKey};
pub use ledger::{Refusal, RelationshipLedger};
pub use model::{GenerateOptions, GenerationReport, SimulationStats};
pub use mortality::{MortalityModel, Vitals};
pub use population::Population;
pub use registry::PersonRegistry;
pub use seeder::{FamilySeed, FoundingFamily, seed_family, seed_population};
pub use simulation::YearStepper;
pub use synth::{AttributeSynthesizer, PersonSpec};
