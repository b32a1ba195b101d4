//! Year-stepped evolution of a seeded population.
//!
//! Each simulated year runs, in order: an eligibility scan, marriages,
//! divorces, marital births, out-of-wedlock births and orphan injection.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use lineage_core::{Person, PersonId, Sex};

use crate::config::SimulationConfig;
use crate::model::SimulationStats;
use crate::population::Population;
use crate::synth::{AttributeSynthesizer, PersonSpec};

/// The loop starts this many years after the start of the window, once the
/// founders' children can marry.
pub const FIRST_STEP_OFFSET: i32 = 20;

/// Advances a population one calendar year at a time.
pub struct YearStepper<'a> {
    config: &'a SimulationConfig,
    synth: &'a AttributeSynthesizer,
}

/// Who may take part in this year's events.
struct Eligibility {
    marriage: Vec<PersonId>,
    childbirth: Vec<PersonId>,
}

impl<'a> YearStepper<'a> {
    pub fn new(config: &'a SimulationConfig, synth: &'a AttributeSynthesizer) -> Self {
        Self { config, synth }
    }

    /// Simulate every year from `start + 20` up to, not including, the present.
    pub fn run(
        &self,
        population: &mut Population,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) {
        for year in self.config.start_year + FIRST_STEP_OFFSET..self.config.present_year {
            self.step(population, year, stats, rng);
        }
    }

    pub fn step(
        &self,
        population: &mut Population,
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) {
        let eligibility = self.scan(population, year);
        let fertile: HashSet<PersonId> = eligibility.childbirth.iter().copied().collect();

        let married = self.marriages(population, &eligibility.marriage, year, stats, rng);
        let divorced = self.divorces(population, year, stats, rng);
        let marital = self.marital_births(population, &fertile, year, stats, rng);
        let out_of_wedlock =
            self.out_of_wedlock_births(population, &eligibility.childbirth, year, stats, rng);
        let orphans = self.orphans(population, year, stats, rng);

        stats.years_simulated += 1;
        debug!(
            year,
            people = population.registry.len(),
            married,
            divorced,
            marital,
            out_of_wedlock,
            orphans,
            "year simulated"
        );
    }

    fn scan(&self, population: &Population, year: i32) -> Eligibility {
        let mut marriage = Vec::new();
        let mut childbirth = Vec::new();

        for person in population.living_in(year) {
            let age = person.age_in(year);
            if age >= self.config.marriage_min_age && !population.ledger.is_married(person.id) {
                marriage.push(person.id);
            }
            if self.fertile(person, year) {
                childbirth.push(person.id);
            }
        }

        Eligibility {
            marriage,
            childbirth,
        }
    }

    fn fertile(&self, person: &Person, year: i32) -> bool {
        let age = person.age_in(year);
        let end = match person.sex {
            Sex::Female => self.config.fertility_end_age_female,
            Sex::Male => self.config.fertility_end_age_male,
        };
        (self.config.fertility_start_age..=end).contains(&age)
    }

    fn marriages(
        &self,
        population: &mut Population,
        eligible: &[PersonId],
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) -> u64 {
        let mut available: HashSet<PersonId> = eligible.iter().copied().collect();
        let mut formed = 0;

        for seeker in eligible {
            if !available.contains(seeker) {
                continue;
            }
            if !rng.random_bool(self.config.marriage_attempt_probability) {
                continue;
            }

            let candidates =
                population
                    .ledger
                    .find_candidates(&population.registry, *seeker, year, rng);
            let Some(spouse) = candidates.choose(&mut *rng).copied() else {
                continue;
            };

            match population
                .ledger
                .propose_marriage(&mut population.registry, *seeker, spouse, year)
            {
                Ok(_) => {
                    formed += 1;
                    available.remove(seeker);
                    available.remove(&spouse);
                }
                Err(refusal) => stats.record_refusal(&refusal),
            }
        }

        stats.marriages_formed += formed;
        formed
    }

    fn divorces(
        &self,
        population: &mut Population,
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) -> u64 {
        let mut divorced = 0;
        for index in 0..population.ledger.marriages().len() {
            let marriage = &population.ledger.marriages()[index];
            if !marriage.current || marriage.year >= year {
                continue;
            }
            if rng.random_bool(self.config.yearly_divorce_probability)
                && population.ledger.divorce(index, year)
            {
                divorced += 1;
            }
        }
        stats.divorces += divorced;
        divorced
    }

    fn marital_births(
        &self,
        population: &mut Population,
        fertile: &HashSet<PersonId>,
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) -> u64 {
        let couples: Vec<(PersonId, PersonId)> = population
            .ledger
            .marriages()
            .iter()
            .filter(|marriage| marriage.current && marriage.year < year)
            .filter_map(|marriage| {
                let first = population.registry.get(marriage.person1_id)?;
                match first.sex {
                    Sex::Male => Some((marriage.person1_id, marriage.person2_id)),
                    Sex::Female => Some((marriage.person2_id, marriage.person1_id)),
                }
            })
            .collect();

        let mut born = 0;
        for (father, mother) in couples {
            if !fertile.contains(&mother)
                || population.ledger.children_of(mother).len()
                    >= self.config.max_children_per_mother
            {
                continue;
            }
            if !rng.random_bool(self.config.marital_birth_probability) {
                continue;
            }
            match population.ledger.register_child(
                &mut population.registry,
                self.synth,
                Some(father),
                mother,
                year,
                rng,
            ) {
                Ok(_) => born += 1,
                Err(refusal) => stats.record_refusal(&refusal),
            }
        }

        stats.marital_births += born;
        born
    }

    fn out_of_wedlock_births(
        &self,
        population: &mut Population,
        fertile: &[PersonId],
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) -> u64 {
        let mut born = 0;
        for mother in fertile {
            let Some(mother_birth) = population
                .registry
                .get(*mother)
                .filter(|person| person.sex == Sex::Female)
                .map(Person::birth_year)
            else {
                continue;
            };
            if !rng.random_bool(self.config.yearly_out_of_wedlock_probability) {
                continue;
            }

            let known_father = if rng.random_bool(self.config.unknown_father_probability) {
                None
            } else {
                let pool: Vec<PersonId> = population
                    .living_in(year)
                    .filter(|person| person.sex == Sex::Male && self.fertile(person, year))
                    .map(|person| person.id)
                    .collect();
                pool.choose(&mut *rng).copied()
            };
            let father = match known_father {
                Some(father) => father,
                None => {
                    let birth_year = mother_birth + rng.random_range(-5..=5);
                    stats.placeholders_created += 1;
                    population.create_unknown_parent(self.synth, Sex::Male, Some(birth_year), rng)
                }
            };

            match population.ledger.register_child(
                &mut population.registry,
                self.synth,
                Some(father),
                *mother,
                year,
                rng,
            ) {
                Ok(_) => born += 1,
                Err(refusal) => stats.record_refusal(&refusal),
            }
        }

        stats.out_of_wedlock_births += born;
        born
    }

    fn orphans(
        &self,
        population: &mut Population,
        year: i32,
        stats: &mut SimulationStats,
        rng: &mut dyn RngCore,
    ) -> u64 {
        if !rng.random_bool(self.config.orphan_probability) {
            return 0;
        }

        let known_father = rng.random_bool(1.0 - self.config.unknown_father_probability);
        let known_mother = rng.random_bool(1.0 - self.config.unknown_mother_probability);

        let father_birth = year - rng.random_range(20..=40);
        let father = if known_father {
            population.add_person(self.synth, PersonSpec::born(father_birth).sex(Sex::Male), rng)
        } else {
            stats.placeholders_created += 1;
            population.create_unknown_parent(self.synth, Sex::Male, Some(father_birth), rng)
        };

        let mother_birth = year - rng.random_range(18..=35);
        let mother = if known_mother {
            population.add_person(
                self.synth,
                PersonSpec::born(mother_birth).sex(Sex::Female),
                rng,
            )
        } else {
            stats.placeholders_created += 1;
            population.create_unknown_parent(self.synth, Sex::Female, Some(mother_birth), rng)
        };

        population.ledger.register_foundling(
            &mut population.registry,
            self.synth,
            Some(father),
            Some(mother),
            year,
            rng,
        );
        stats.orphans += 1;
        1
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::synth::tests::synthesizer;

    /// A configuration in which no yearly event happens unless a test enables it.
    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            marriage_attempt_probability: 0.0,
            yearly_divorce_probability: 0.0,
            marital_birth_probability: 0.0,
            yearly_out_of_wedlock_probability: 0.0,
            orphan_probability: 0.0,
            placeholder_deceased_probability: 0.0,
            ..SimulationConfig::default()
        }
    }

    fn living(
        population: &mut Population,
        synth: &AttributeSynthesizer,
        birth_year: i32,
        sex: Sex,
        rng: &mut ChaCha8Rng,
    ) -> PersonId {
        population.add_person(
            synth,
            PersonSpec::born(birth_year).sex(sex).forced_deceased(false),
            rng,
        )
    }

    #[test]
    fn divorce_spares_marriages_formed_this_year() {
        let config = SimulationConfig {
            yearly_divorce_probability: 1.0,
            ..quiet_config()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(53);

        let older_husband = living(&mut population, &synth, 1948, Sex::Male, &mut rng);
        let older_wife = living(&mut population, &synth, 1949, Sex::Female, &mut rng);
        let newer_husband = living(&mut population, &synth, 1952, Sex::Male, &mut rng);
        let newer_wife = living(&mut population, &synth, 1953, Sex::Female, &mut rng);
        let earlier = population
            .ledger
            .propose_marriage(&mut population.registry, older_husband, older_wife, 1970)
            .expect("earlier marriage");
        let fresh = population
            .ledger
            .propose_marriage(&mut population.registry, newer_husband, newer_wife, 1975)
            .expect("fresh marriage");

        stepper.step(&mut population, 1975, &mut stats, &mut rng);

        assert_eq!(stats.divorces, 1);
        let marriages = population.ledger.marriages();
        assert!(!marriages[earlier].current);
        assert_eq!(marriages[earlier].ended_year, Some(1975));
        assert!(marriages[fresh].current);
        assert!(population.ledger.is_married(newer_wife));
        assert!(!population.ledger.is_married(older_wife));
    }

    #[test]
    fn marital_births_stop_at_the_per_mother_limit() {
        let config = SimulationConfig {
            marital_birth_probability: 1.0,
            ..quiet_config()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(54);

        let husband = living(&mut population, &synth, 1950, Sex::Male, &mut rng);
        let wife = living(&mut population, &synth, 1950, Sex::Female, &mut rng);
        population
            .ledger
            .propose_marriage(&mut population.registry, husband, wife, 1970)
            .expect("marriage");

        for year in 1971..=1990 {
            stepper.step(&mut population, year, &mut stats, &mut rng);
        }

        assert_eq!(
            population.ledger.children_of(wife).len(),
            config.max_children_per_mother
        );
        assert_eq!(stats.marital_births, config.max_children_per_mother as u64);
        let last_birth = population
            .ledger
            .children_of(wife)
            .iter()
            .filter_map(|child| population.registry.get(*child))
            .map(Person::birth_year)
            .max();
        assert_eq!(last_birth, Some(1980));
    }

    #[test]
    fn unknown_fathers_are_placeholders() {
        let config = SimulationConfig {
            yearly_out_of_wedlock_probability: 1.0,
            unknown_father_probability: 1.0,
            ..quiet_config()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(55);

        let mothers: Vec<PersonId> = (0..3)
            .map(|offset| living(&mut population, &synth, 1950 + offset, Sex::Female, &mut rng))
            .collect();
        living(&mut population, &synth, 1950, Sex::Male, &mut rng);

        stepper.step(&mut population, 1975, &mut stats, &mut rng);

        assert_eq!(stats.out_of_wedlock_births, 3);
        assert_eq!(stats.placeholders_created, 3);
        for mother in mothers {
            let children = population.ledger.children_of(mother);
            assert_eq!(children.len(), 1);
            let child = population.registry.get(children[0]).expect("child");
            let father = child
                .father_id
                .and_then(|id| population.registry.get(id))
                .expect("father record");
            assert!(father.is_placeholder());
        }
    }

    #[test]
    fn no_fertile_men_falls_back_to_placeholder_father() {
        let config = SimulationConfig {
            yearly_out_of_wedlock_probability: 1.0,
            unknown_father_probability: 0.0,
            ..quiet_config()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(56);

        let mother = living(&mut population, &synth, 1950, Sex::Female, &mut rng);
        living(&mut population, &synth, 1890, Sex::Male, &mut rng);

        stepper.step(&mut population, 1975, &mut stats, &mut rng);

        assert_eq!(stats.out_of_wedlock_births, 1);
        assert_eq!(stats.placeholders_created, 1);
        let children = population.ledger.children_of(mother);
        assert_eq!(children.len(), 1);
        let father = population
            .registry
            .get(children[0])
            .and_then(|child| child.father_id)
            .and_then(|id| population.registry.get(id))
            .expect("father record");
        assert!(father.is_placeholder());
    }

    #[test]
    fn certain_orphan_injection_adds_three_people_per_year() {
        let config = SimulationConfig {
            orphan_probability: 1.0,
            marriage_attempt_probability: 0.0,
            yearly_out_of_wedlock_probability: 0.0,
            ..SimulationConfig::default()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(51);

        stepper.step(&mut population, 1950, &mut stats, &mut rng);
        stepper.step(&mut population, 1951, &mut stats, &mut rng);

        assert_eq!(stats.orphans, 2);
        assert_eq!(stats.years_simulated, 2);
        assert_eq!(population.registry.len(), 6);
        let children: Vec<&Person> = population
            .registry
            .iter()
            .filter(|person| person.father_id.is_some())
            .collect();
        assert_eq!(children.len(), 2);
        for child in children {
            assert!(child.mother_id.is_some());
            let father = child.father_id.expect("father");
            assert!(population.ledger.children_of(father).contains(&child.id));
        }
    }

    #[test]
    fn seekers_marry_at_most_once_per_year() {
        let config = SimulationConfig {
            marriage_attempt_probability: 1.0,
            polygamy_probability: 0.0,
            orphan_probability: 0.0,
            yearly_out_of_wedlock_probability: 0.0,
            ..SimulationConfig::default()
        };
        let synth = synthesizer(&config);
        let stepper = YearStepper::new(&config, &synth);
        let mut population = Population::new(&config);
        let mut stats = SimulationStats::default();
        let mut rng = ChaCha8Rng::seed_from_u64(52);

        for offset in 0..6 {
            let sex = if offset % 2 == 0 { Sex::Male } else { Sex::Female };
            population.add_person(
                &synth,
                PersonSpec::born(1950 + offset).sex(sex).forced_deceased(false),
                &mut rng,
            );
        }

        stepper.step(&mut population, 1975, &mut stats, &mut rng);

        assert_eq!(stats.marriages_formed, 3);
        let mut seen = HashSet::new();
        for marriage in population.ledger.marriages() {
            assert!(seen.insert(marriage.person1_id));
            assert!(seen.insert(marriage.person2_id));
        }
    }
}
