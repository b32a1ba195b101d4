use rand::{Rng, RngCore};

use lineage_core::{Dataset, PLACEHOLDER_NOTE, Person, PersonId, Sex, UNKNOWN_NAME};

use crate::config::SimulationConfig;
use crate::ledger::RelationshipLedger;
use crate::registry::PersonRegistry;
use crate::synth::{AttributeSynthesizer, PersonSpec};

/// The owned state of one simulation run.
#[derive(Debug)]
pub struct Population {
    pub registry: PersonRegistry,
    pub ledger: RelationshipLedger,
    config: SimulationConfig,
}

impl Population {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            registry: PersonRegistry::new(),
            ledger: RelationshipLedger::new(config),
            config: config.clone(),
        }
    }

    /// Synthesize and register a person without recorded parents.
    pub fn add_person(
        &mut self,
        synth: &AttributeSynthesizer,
        spec: PersonSpec<'_>,
        rng: &mut dyn RngCore,
    ) -> PersonId {
        let person = synth.synthesize(spec, rng);
        self.registry.create(person, rng)
    }

    /// Register a placeholder standing in for an unrecorded parent.
    ///
    /// Placeholders are usually deceased. Without a birth year one is drawn
    /// from the simulated window, at least 20 years before the present.
    pub fn create_unknown_parent(
        &mut self,
        synth: &AttributeSynthesizer,
        sex: Sex,
        birth_year: Option<i32>,
        rng: &mut dyn RngCore,
    ) -> PersonId {
        let birth_year = birth_year.unwrap_or_else(|| {
            let latest = (self.config.present_year - 20).max(self.config.start_year);
            rng.random_range(self.config.start_year..=latest)
        });
        let deceased = rng.random_bool(self.config.placeholder_deceased_probability);
        let mut person = synth.synthesize(
            PersonSpec::born(birth_year)
                .sex(sex)
                .forced_deceased(deceased)
                .named(UNKNOWN_NAME, UNKNOWN_NAME),
            rng,
        );
        person.notes = Some(PLACEHOLDER_NOTE.to_string());
        self.registry.create(person, rng)
    }

    /// People alive in `year`, in creation order.
    pub fn living_in(&self, year: i32) -> impl Iterator<Item = &Person> {
        self.registry.iter().filter(move |person| person.alive_in(year))
    }

    pub fn into_dataset(self) -> Dataset {
        Dataset {
            marriages: self.ledger.into_marriages(),
            people: self.registry.into_people(),
        }
    }
}
