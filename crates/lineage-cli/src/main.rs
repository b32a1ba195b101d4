mod commands;
mod config;
mod registry;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use lineage_core::Error as CoreError;
use lineage_eval::EvalError;
use lineage_generate::GenerationError;
use lineage_store::StoreError;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),
    #[error("unsupported engine: {0}")]
    UnsupportedEngine(String),
}

#[derive(Parser, Debug)]
#[command(name = "lineage", version, about = "Synthetic family-tree generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a population and write a run directory.
    Generate(GenerateArgs),
    /// Check a dataset and write metrics.json and report.md next to it.
    Evaluate(EvaluateArgs),
    /// Load a dataset into Postgres, replacing what is there.
    Import(ImportArgs),
    /// Read the stored dataset back into a family_tree.json file.
    Export(ExportArgs),
    /// Print or write the JSON Schema of family_tree.json.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of founding family lines.
    #[arg(long)]
    families: Option<u32>,
    /// Generations expected in the output; reported, never enforced.
    #[arg(long)]
    generations: Option<u32>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    out_dir: PathBuf,
    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with simulation parameters.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Faker locale (en_US, pt_BR).
    #[arg(long)]
    locale: Option<String>,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Path to family_tree.json.
    #[arg(long)]
    dataset: PathBuf,
    /// Directory for metrics.json and report.md (defaults to the dataset's).
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Exit with an error when any invariant is violated.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Also write violations.json.
    #[arg(long, default_value_t = false)]
    write_violations: bool,
    /// Year ages are measured at.
    #[arg(long)]
    as_of_year: Option<i32>,
    /// Examples listed per section of the report.
    #[arg(long, default_value_t = 20)]
    max_examples: usize,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Path to family_tree.json.
    #[arg(long)]
    dataset: PathBuf,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// Year ages are measured at in the sample queries.
    #[arg(long)]
    as_of_year: Option<i32>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Database connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    conn: String,
    /// Destination for the exported family_tree.json.
    #[arg(long)]
    out: PathBuf,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => commands::run_generate(args),
        Command::Evaluate(args) => commands::run_evaluate(args),
        Command::Import(args) => commands::run_import(args).await,
        Command::Export(args) => commands::run_export(args).await,
        Command::Schema(args) => commands::run_schema(args),
    }
}
