use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lineage_generate::{GenerateOptions, SimulationConfig};

use crate::CliError;

/// Optional TOML file for `generate`. Every key may be omitted.
///
/// ```toml
/// seed = 42
/// locale = "pt_BR"
///
/// [simulation]
/// families = 20
/// polygamy_probability = 0.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateFile {
    pub seed: Option<u64>,
    pub locale: Option<String>,
    pub generations: Option<u32>,
    pub simulation: SimulationConfig,
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct GenerateOverrides {
    pub families: Option<u32>,
    pub generations: Option<u32>,
    pub seed: Option<u64>,
    pub locale: Option<String>,
}

pub fn load_generate_file(path: Option<&Path>) -> Result<GenerateFile, CliError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(GenerateFile::default()),
    }
}

pub fn resolve_generate_options(
    file: GenerateFile,
    overrides: GenerateOverrides,
    out_dir: PathBuf,
) -> GenerateOptions {
    let defaults = GenerateOptions::default();
    let simulation = SimulationConfig {
        families: overrides.families.unwrap_or(file.simulation.families),
        ..file.simulation
    };
    GenerateOptions {
        out_dir,
        seed: overrides.seed.or(file.seed),
        locale: overrides.locale.or(file.locale).unwrap_or(defaults.locale),
        generations: overrides
            .generations
            .or(file.generations)
            .unwrap_or(defaults.generations),
        simulation,
    }
}
