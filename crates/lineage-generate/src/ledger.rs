use std::collections::HashMap;

use rand::{Rng, RngCore};
use thiserror::Error;

use lineage_core::{Marriage, Person, PersonId, Sex};

use crate::config::SimulationConfig;
use crate::registry::PersonRegistry;
use crate::synth::{AttributeSynthesizer, PersonSpec};

/// Why a marriage or birth attempt was turned down. Refusals are expected
/// outcomes; callers skip the mutation and count them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Refusal {
    #[error("person {0} is not registered")]
    UnknownPerson(PersonId),
    #[error("person {0} is under the marriage age")]
    Underage(PersonId),
    #[error("marriage partners share the same sex")]
    SameSex,
    #[error("parent {0} has the wrong sex for the role")]
    ParentSex(PersonId),
    #[error("mother {0} is outside the fertility window")]
    MotherOutsideFertility(PersonId),
    #[error("mother {0} died before the birth year")]
    MotherDeceased(PersonId),
    #[error("father {0} is outside the fertility window")]
    FatherOutsideFertility(PersonId),
    #[error("father {0} died before the birth year")]
    FatherDeceased(PersonId),
}

impl Refusal {
    pub fn code(&self) -> &'static str {
        match self {
            Refusal::UnknownPerson(_) => "unknown_person",
            Refusal::Underage(_) => "underage",
            Refusal::SameSex => "same_sex",
            Refusal::ParentSex(_) => "parent_sex",
            Refusal::MotherOutsideFertility(_) => "mother_outside_fertility",
            Refusal::MotherDeceased(_) => "mother_deceased",
            Refusal::FatherOutsideFertility(_) => "father_outside_fertility",
            Refusal::FatherDeceased(_) => "father_deceased",
        }
    }
}

/// Marriages and the parent to children index.
#[derive(Debug)]
pub struct RelationshipLedger {
    config: SimulationConfig,
    marriages: Vec<Marriage>,
    children: HashMap<PersonId, Vec<PersonId>>,
    /// Undissolved marriage records per person.
    open_marriages: HashMap<PersonId, usize>,
}

impl RelationshipLedger {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            config: config.clone(),
            marriages: Vec::new(),
            children: HashMap::new(),
            open_marriages: HashMap::new(),
        }
    }

    pub fn marriages(&self) -> &[Marriage] {
        &self.marriages
    }

    pub fn children_of(&self, id: PersonId) -> &[PersonId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_index(&self) -> &HashMap<PersonId, Vec<PersonId>> {
        &self.children
    }

    /// Whether `id` holds a marriage that has not been dissolved. A marriage
    /// arranged for a later year already counts, so nobody is promised twice.
    pub fn is_married(&self, id: PersonId) -> bool {
        self.open_marriages.get(&id).is_some_and(|count| *count > 0)
    }

    /// Record a marriage between `a` and `b` in `year`.
    ///
    /// Existing marriages are not checked; use [`Self::find_candidates`] for
    /// that. The wife takes the husband's surname unless she already carries a
    /// maiden name from an earlier marriage.
    pub fn propose_marriage(
        &mut self,
        registry: &mut PersonRegistry,
        a: PersonId,
        b: PersonId,
        year: i32,
    ) -> Result<usize, Refusal> {
        let first = registry.get(a).ok_or(Refusal::UnknownPerson(a))?;
        let second = registry.get(b).ok_or(Refusal::UnknownPerson(b))?;

        if first.sex == second.sex {
            return Err(Refusal::SameSex);
        }
        for party in [first, second] {
            if party.age_in(year) < self.config.marriage_min_age {
                return Err(Refusal::Underage(party.id));
            }
        }

        let (wife, husband) = if first.sex == Sex::Female {
            (a, second)
        } else {
            (b, first)
        };
        let husband_surname = husband.last_name.clone();
        if let Some(wife) = registry.get_mut(wife)
            && wife.maiden_name.is_none()
        {
            wife.maiden_name = Some(std::mem::replace(&mut wife.last_name, husband_surname));
        }

        self.marriages.push(Marriage::new(a, b, year));
        *self.open_marriages.entry(a).or_insert(0) += 1;
        *self.open_marriages.entry(b).or_insert(0) += 1;
        Ok(self.marriages.len() - 1)
    }

    /// Living, unmarried, opposite-sex adults within the era's age gap of
    /// `person_id`, in registry order.
    ///
    /// Before the era cutoff a married male candidate can still qualify: each
    /// of his open marriage records is ignored with the polygamy probability,
    /// rolled independently per record.
    pub fn find_candidates(
        &self,
        registry: &PersonRegistry,
        person_id: PersonId,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Vec<PersonId> {
        let Some(person) = registry.get(person_id) else {
            return Vec::new();
        };
        if person.age_in(year) < self.config.marriage_min_age || !person.alive_in(year) {
            return Vec::new();
        }

        let wanted = person.sex.opposite();
        let max_gap = self.config.max_age_gap(year);
        let polygamy_era = year < self.config.era_cutoff_year;

        let mut candidates = Vec::new();
        for candidate in registry.iter() {
            if candidate.sex != wanted
                || candidate.age_in(year) < self.config.marriage_min_age
                || !candidate.alive_in(year)
                || (person.birth_year() - candidate.birth_year()).abs() > max_gap
            {
                continue;
            }

            let open = self.open_marriages.get(&candidate.id).copied().unwrap_or(0);
            let exemptible = polygamy_era && candidate.sex == Sex::Male;
            let married = (0..open).any(|_| {
                !(exemptible && rng.random_bool(self.config.polygamy_probability))
            });
            if !married {
                candidates.push(candidate.id);
            }
        }
        candidates
    }

    /// Create a child of `mother` (and `father`, when given) born in `year`.
    ///
    /// The mother must be a registered woman inside the fertility window and
    /// alive in `year`. A registered father, placeholders included, must be a
    /// fertile man alive in `year`.
    pub fn register_child(
        &mut self,
        registry: &mut PersonRegistry,
        synth: &AttributeSynthesizer,
        father: Option<PersonId>,
        mother: PersonId,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> Result<PersonId, Refusal> {
        let child = {
            let mother_record = registry.get(mother).ok_or(Refusal::UnknownPerson(mother))?;
            self.check_mother(mother_record, year)?;

            let father_record = match father {
                Some(id) => {
                    let record = registry.get(id).ok_or(Refusal::UnknownPerson(id))?;
                    self.check_father(record, year)?;
                    Some(record)
                }
                None => None,
            };

            synth.synthesize(
                PersonSpec::born(year).parents(father_record, Some(mother_record)),
                rng,
            )
        };

        let child_id = registry.create(child, rng);
        self.index_child(father, Some(mother), child_id);
        Ok(child_id)
    }

    /// Create a child without any eligibility checks on its parents.
    pub fn register_foundling(
        &mut self,
        registry: &mut PersonRegistry,
        synth: &AttributeSynthesizer,
        father: Option<PersonId>,
        mother: Option<PersonId>,
        year: i32,
        rng: &mut dyn RngCore,
    ) -> PersonId {
        let child = {
            let father_record = father.and_then(|id| registry.get(id));
            let mother_record = mother.and_then(|id| registry.get(id));
            synth.synthesize(
                PersonSpec::born(year).parents(father_record, mother_record),
                rng,
            )
        };

        let child_id = registry.create(child, rng);
        self.index_child(father, mother, child_id);
        child_id
    }

    /// Deactivate the marriage at `index`, recording `year` as its end.
    /// Returns false when it was already dissolved or does not exist.
    pub fn divorce(&mut self, index: usize, year: i32) -> bool {
        let Some(marriage) = self.marriages.get_mut(index) else {
            return false;
        };
        if !marriage.current {
            return false;
        }
        marriage.dissolve(year);
        for party in [marriage.person1_id, marriage.person2_id] {
            if let Some(count) = self.open_marriages.get_mut(&party) {
                *count = count.saturating_sub(1);
            }
        }
        true
    }

    pub fn into_marriages(self) -> Vec<Marriage> {
        self.marriages
    }

    fn check_mother(&self, mother: &Person, year: i32) -> Result<(), Refusal> {
        if mother.sex != Sex::Female {
            return Err(Refusal::ParentSex(mother.id));
        }
        let age = mother.age_in(year);
        if age < self.config.fertility_start_age || age > self.config.fertility_end_age_female {
            return Err(Refusal::MotherOutsideFertility(mother.id));
        }
        if !mother.alive_in(year) {
            return Err(Refusal::MotherDeceased(mother.id));
        }
        Ok(())
    }

    fn check_father(&self, father: &Person, year: i32) -> Result<(), Refusal> {
        if father.sex != Sex::Male {
            return Err(Refusal::ParentSex(father.id));
        }
        let age = father.age_in(year);
        if age < self.config.fertility_start_age || age > self.config.fertility_end_age_male {
            return Err(Refusal::FatherOutsideFertility(father.id));
        }
        if !father.alive_in(year) {
            return Err(Refusal::FatherDeceased(father.id));
        }
        Ok(())
    }

    fn index_child(&mut self, father: Option<PersonId>, mother: Option<PersonId>, child: PersonId) {
        for parent in [father, mother].into_iter().flatten() {
            self.children.entry(parent).or_default().push(child);
        }
    }
}
