use serde::{Deserialize, Serialize};

use lineage_core::MARRIAGE_MIN_AGE;

use crate::errors::GenerationError;

/// Tunable constants of the population simulation.
///
/// Every field has a default, so a TOML override file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// First year of the simulated window. Founders are born in its first 30 years.
    pub start_year: i32,
    /// The "present": mortality and ages are evaluated against this year.
    pub present_year: i32,
    /// Number of disjoint founding family lines.
    pub families: u32,
    pub max_age: i32,
    pub marriage_min_age: i32,
    pub fertility_start_age: i32,
    pub fertility_end_age_female: i32,
    pub fertility_end_age_male: i32,
    pub max_children_per_mother: usize,

    pub yearly_death_probability: f64,
    pub marriage_attempt_probability: f64,
    pub yearly_divorce_probability: f64,
    pub marital_birth_probability: f64,
    pub yearly_out_of_wedlock_probability: f64,
    pub unknown_father_probability: f64,
    pub unknown_mother_probability: f64,
    pub orphan_probability: f64,
    pub placeholder_deceased_probability: f64,

    /// Chance that an active marriage record is ignored when checking whether a
    /// male candidate is already married, before `era_cutoff_year`.
    pub polygamy_probability: f64,
    /// Year separating the "older" era (wider age gaps, polygamy) from the modern one.
    pub era_cutoff_year: i32,
    pub max_age_gap_before_cutoff: i32,
    pub max_age_gap_after_cutoff: i32,

    pub trait_inheritance_probability: f64,
    pub nationality_inheritance_probability: f64,
    pub religion_inheritance_probability: f64,
    pub middle_name_probability: f64,
    pub legacy_bucket_probability: f64,

    pub founder_birth_window: i32,
    pub founder_spouse_age_spread: i32,
    pub founder_marriage_age_min: i32,
    pub founder_marriage_age_max: i32,
    pub founder_children_min: u32,
    pub founder_children_max: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_year: 1900,
            present_year: 2025,
            families: 15,
            max_age: 100,
            marriage_min_age: 18,
            fertility_start_age: 16,
            fertility_end_age_female: 45,
            fertility_end_age_male: 70,
            max_children_per_mother: 10,

            yearly_death_probability: 0.01,
            marriage_attempt_probability: 0.1,
            yearly_divorce_probability: 0.35 / 50.0,
            marital_birth_probability: 0.2,
            yearly_out_of_wedlock_probability: 0.2 / 10.0,
            unknown_father_probability: 0.15,
            unknown_mother_probability: 0.05,
            orphan_probability: 0.05,
            placeholder_deceased_probability: 0.8,

            polygamy_probability: 0.03,
            era_cutoff_year: 1970,
            max_age_gap_before_cutoff: 20,
            max_age_gap_after_cutoff: 15,

            trait_inheritance_probability: 0.8,
            nationality_inheritance_probability: 0.9,
            religion_inheritance_probability: 0.8,
            middle_name_probability: 0.7,
            legacy_bucket_probability: 0.3,

            founder_birth_window: 30,
            founder_spouse_age_spread: 5,
            founder_marriage_age_min: 18,
            founder_marriage_age_max: 25,
            founder_children_min: 2,
            founder_children_max: 8,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.marriage_min_age < MARRIAGE_MIN_AGE {
            return Err(GenerationError::InvalidConfig(format!(
                "marriage_min_age must be at least {MARRIAGE_MIN_AGE}, got {}",
                self.marriage_min_age
            )));
        }
        if self.start_year + self.marriage_min_age >= self.present_year {
            return Err(GenerationError::InvalidConfig(format!(
                "present_year {} must be more than {} years after start_year {}",
                self.present_year, self.marriage_min_age, self.start_year
            )));
        }

        let probabilities = [
            ("yearly_death_probability", self.yearly_death_probability),
            ("marriage_attempt_probability", self.marriage_attempt_probability),
            ("yearly_divorce_probability", self.yearly_divorce_probability),
            ("marital_birth_probability", self.marital_birth_probability),
            (
                "yearly_out_of_wedlock_probability",
                self.yearly_out_of_wedlock_probability,
            ),
            ("unknown_father_probability", self.unknown_father_probability),
            ("unknown_mother_probability", self.unknown_mother_probability),
            ("orphan_probability", self.orphan_probability),
            (
                "placeholder_deceased_probability",
                self.placeholder_deceased_probability,
            ),
            ("polygamy_probability", self.polygamy_probability),
            (
                "trait_inheritance_probability",
                self.trait_inheritance_probability,
            ),
            (
                "nationality_inheritance_probability",
                self.nationality_inheritance_probability,
            ),
            (
                "religion_inheritance_probability",
                self.religion_inheritance_probability,
            ),
            ("middle_name_probability", self.middle_name_probability),
            ("legacy_bucket_probability", self.legacy_bucket_probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(GenerationError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.fertility_start_age > self.fertility_end_age_female
            || self.fertility_start_age > self.fertility_end_age_male
        {
            return Err(GenerationError::InvalidConfig(
                "fertility_start_age exceeds a fertility end age".to_string(),
            ));
        }
        if self.founder_marriage_age_min > self.founder_marriage_age_max
            || self.founder_children_min > self.founder_children_max
        {
            return Err(GenerationError::InvalidConfig(
                "founder ranges must have min <= max".to_string(),
            ));
        }
        if self.founder_birth_window < 0 || self.founder_spouse_age_spread < 0 {
            return Err(GenerationError::InvalidConfig(
                "founder windows must not be negative".to_string(),
            ));
        }

        Ok(())
    }

    /// Maximum spouse age difference allowed in `year`.
    pub fn max_age_gap(&self, year: i32) -> i32 {
        if year < self.era_cutoff_year {
            self.max_age_gap_before_cutoff
        } else {
            self.max_age_gap_after_cutoff
        }
    }
}
