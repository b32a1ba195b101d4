//! Whether, when and why a person died.
//!
//! Ages are measured against the configured present year. The realized death
//! probability is `yearly_hazard * age`, clamped into `[0, 1]`. This is a
//! rough approximation, not a life table.

use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use lineage_core::CauseOfDeath;

use crate::config::SimulationConfig;

/// Outcome of a mortality evaluation. `date_of_death` and `cause` are set iff
/// `is_deceased`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    pub is_deceased: bool,
    pub date_of_death: Option<NaiveDate>,
    pub cause: Option<CauseOfDeath>,
}

impl Vitals {
    pub const ALIVE: Vitals = Vitals {
        is_deceased: false,
        date_of_death: None,
        cause: None,
    };
}

/// Age after which death years are drawn from late life.
const LATE_LIFE_AGE: i32 = 75;
/// Age after which the yearly hazard grows by one base step per year.
const HAZARD_ONSET_AGE: i32 = 70;

#[derive(Debug, Clone, Copy)]
pub struct MortalityModel {
    start_year: i32,
    present_year: i32,
    max_age: i32,
    yearly_base: f64,
}

impl MortalityModel {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            start_year: config.start_year,
            present_year: config.present_year,
            max_age: config.max_age,
            yearly_base: config.yearly_death_probability,
        }
    }

    /// Probability that someone born in `birth_year` has died by the present.
    pub fn death_probability(&self, birth_year: i32) -> f64 {
        let age = self.present_year - birth_year;
        let mut yearly = self.yearly_base;
        if age > HAZARD_ONSET_AGE {
            yearly += f64::from(age - HAZARD_ONSET_AGE) * 0.01;
        }
        (yearly * f64::from(age)).clamp(0.0, 1.0)
    }

    /// Decide the vital status of a person born in `birth_year`.
    ///
    /// `forced` skips hazard sampling; anyone older than the maximum age is
    /// always deceased. Nobody born in or after the present year can be
    /// deceased, since no death year would exist.
    pub fn evaluate(&self, birth_year: i32, forced: Option<bool>, rng: &mut dyn RngCore) -> Vitals {
        let age = self.present_year - birth_year;

        let deceased = if age > self.max_age {
            true
        } else {
            match forced {
                Some(value) => value,
                None => rng.random_bool(self.death_probability(birth_year)),
            }
        };

        if !deceased || age <= 0 {
            return Vitals::ALIVE;
        }

        let upper = (birth_year + age)
            .min(self.present_year)
            .min(birth_year + self.max_age);
        let lower = if age > LATE_LIFE_AGE {
            (birth_year + LATE_LIFE_AGE).max(self.start_year)
        } else {
            birth_year + 1
        };
        let death_year = rng.random_range(lower.min(upper)..=upper);

        Vitals {
            is_deceased: true,
            date_of_death: Some(random_date(death_year, rng)),
            cause: CauseOfDeath::ALL.choose(&mut *rng).copied(),
        }
    }
}

/// A uniformly chosen day of `year`. February never goes past the 28th.
pub fn random_date(year: i32, rng: &mut dyn RngCore) -> NaiveDate {
    let month = rng.random_range(1..=12_u32);
    let max_day = match month {
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    let day = rng.random_range(1..=max_day);
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, 1, 1))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn model() -> MortalityModel {
        MortalityModel::new(&SimulationConfig::default())
    }

    #[test]
    fn very_old_people_die_late_in_life() {
        let model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let vitals = model.evaluate(1850, None, &mut rng);
            assert!(vitals.is_deceased);
            let year = vitals.date_of_death.expect("death date").year();
            assert!((1925..=1950).contains(&year), "death year {year}");
            assert!(vitals.cause.is_some());
        }
    }

    #[test]
    fn forced_flag_short_circuits_hazard() {
        let model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let vitals = model.evaluate(2000, Some(true), &mut rng);
        assert!(vitals.is_deceased);
        let year = vitals.date_of_death.expect("death date").year();
        assert!((2001..=2025).contains(&year));

        let alive = model.evaluate(1990, Some(false), &mut rng);
        assert_eq!(alive, Vitals::ALIVE);
    }

    #[test]
    fn born_in_present_year_is_never_deceased() {
        let model = model();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(model.evaluate(2025, Some(true), &mut rng), Vitals::ALIVE);
    }

    #[test]
    fn hazard_is_clamped() {
        let model = model();
        assert_eq!(model.death_probability(1900), 1.0);
        assert_eq!(model.death_probability(2025), 0.0);
        assert!((model.death_probability(2015) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn random_dates_stay_in_year() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            let date = random_date(1904, &mut rng);
            assert_eq!(date.year(), 1904);
            if date.month() == 2 {
                assert!(date.day() <= 28);
            }
        }
    }
}
