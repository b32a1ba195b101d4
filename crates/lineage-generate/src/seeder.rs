use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use lineage_core::{PersonId, Sex};

use crate::config::SimulationConfig;
use crate::model::SimulationStats;
use crate::population::Population;
use crate::synth::{AttributeSynthesizer, PersonSpec};

/// Shape of one founding family line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySeed {
    pub patriarch_birth: i32,
    pub matriarch_birth: i32,
    pub marriage_year: i32,
    /// Attempted birth years of the founders' children.
    pub child_years: Vec<i32>,
}

impl FamilySeed {
    /// Draw a family line: the patriarch is born early in the window, the
    /// matriarch within a few years of him, they marry as young adults and
    /// have children over the following two decades.
    pub fn draw(config: &SimulationConfig, rng: &mut dyn RngCore) -> Self {
        let patriarch_birth =
            rng.random_range(config.start_year..=config.start_year + config.founder_birth_window);
        let spread = config.founder_spouse_age_spread;
        let matriarch_birth = rng.random_range(patriarch_birth - spread..=patriarch_birth + spread);
        let marriage_year = patriarch_birth.max(matriarch_birth)
            + rng.random_range(config.founder_marriage_age_min..=config.founder_marriage_age_max);

        let children = rng.random_range(config.founder_children_min..=config.founder_children_max);
        let first = marriage_year + 1;
        let last = (marriage_year + 20).min(config.present_year - 20);
        let child_years = if first <= last {
            (0..children)
                .map(|_| rng.random_range(first..=last))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            patriarch_birth,
            matriarch_birth,
            marriage_year,
            child_years,
        }
    }
}

/// Ids produced by seeding one family line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundingFamily {
    pub patriarch: PersonId,
    pub matriarch: PersonId,
    /// Index of the founders' marriage in the ledger, when it was accepted.
    pub marriage: Option<usize>,
    pub children: Vec<PersonId>,
}

/// Register one founding family. Refused marriages and births are counted in
/// `stats` and otherwise skipped.
pub fn seed_family(
    population: &mut Population,
    synth: &AttributeSynthesizer,
    seed: &FamilySeed,
    stats: &mut SimulationStats,
    rng: &mut dyn RngCore,
) -> FoundingFamily {
    let patriarch =
        population.add_person(synth, PersonSpec::born(seed.patriarch_birth).sex(Sex::Male), rng);
    let matriarch = population.add_person(
        synth,
        PersonSpec::born(seed.matriarch_birth).sex(Sex::Female),
        rng,
    );
    stats.founders += 2;

    let marriage = match population.ledger.propose_marriage(
        &mut population.registry,
        patriarch,
        matriarch,
        seed.marriage_year,
    ) {
        Ok(index) => {
            stats.marriages_formed += 1;
            Some(index)
        }
        Err(refusal) => {
            stats.record_refusal(&refusal);
            None
        }
    };

    let mut children = Vec::with_capacity(seed.child_years.len());
    for year in &seed.child_years {
        match population.ledger.register_child(
            &mut population.registry,
            synth,
            Some(patriarch),
            matriarch,
            *year,
            rng,
        ) {
            Ok(child) => {
                stats.marital_births += 1;
                children.push(child);
            }
            Err(refusal) => stats.record_refusal(&refusal),
        }
    }

    FoundingFamily {
        patriarch,
        matriarch,
        marriage,
        children,
    }
}

/// Build the founding generation: `config.families` disjoint family lines.
pub fn seed_population(
    population: &mut Population,
    synth: &AttributeSynthesizer,
    config: &SimulationConfig,
    stats: &mut SimulationStats,
    rng: &mut dyn RngCore,
) -> Vec<FoundingFamily> {
    (0..config.families)
        .map(|line| {
            let seed = FamilySeed::draw(config, rng);
            let family = seed_family(population, synth, &seed, stats, rng);
            debug!(
                line,
                patriarch = %family.patriarch,
                marriage_year = seed.marriage_year,
                children = family.children.len(),
                "family line seeded"
            );
            family
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::synth::tests::synthesizer;

    #[test]
    fn drawn_seeds_respect_founder_windows() {
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(41);
        for _ in 0..100 {
            let seed = FamilySeed::draw(&config, &mut rng);
            assert!((1900..=1930).contains(&seed.patriarch_birth));
            assert!((seed.matriarch_birth - seed.patriarch_birth).abs() <= 5);
            let elder = seed.patriarch_birth.max(seed.matriarch_birth);
            assert!((elder + 18..=elder + 25).contains(&seed.marriage_year));
            assert!((2..=8).contains(&seed.child_years.len()));
            for year in &seed.child_years {
                assert!(*year > seed.marriage_year);
                assert!(*year <= seed.marriage_year + 20);
                assert!(*year <= 2005);
            }
        }
    }

    #[test]
    fn family_lines_are_disjoint() {
        let config = SimulationConfig {
            families: 4,
            ..SimulationConfig::default()
        };
        let synth = synthesizer(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();

        let families = seed_population(&mut population, &synth, &config, &mut stats, &mut rng);

        assert_eq!(families.len(), 4);
        assert_eq!(stats.founders, 8);
        for family in &families {
            for child in &family.children {
                let record = population.registry.get(*child).expect("child");
                assert_eq!(record.father_id, Some(family.patriarch));
                assert_eq!(record.mother_id, Some(family.matriarch));
            }
        }
        assert_eq!(population.ledger.marriages().len(), 4);
    }
}
