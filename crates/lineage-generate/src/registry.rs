use std::collections::HashMap;

use rand::RngCore;

use lineage_core::{Person, PersonId};

/// Authoritative store of person records, in creation order.
#[derive(Debug, Default)]
pub struct PersonRegistry {
    people: Vec<Person>,
    index: HashMap<PersonId, usize>,
}

impl PersonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record under a fresh id drawn from `rng` and return that id.
    ///
    /// Any id already on `person` is replaced.
    pub fn create(&mut self, mut person: Person, rng: &mut dyn RngCore) -> PersonId {
        let id = loop {
            let mut bytes = [0_u8; 16];
            rng.fill_bytes(&mut bytes);
            let candidate = PersonId::from_bytes(bytes);
            if !self.index.contains_key(&candidate) {
                break candidate;
            }
        };
        person.id = id;
        self.index.insert(id, self.people.len());
        self.people.push(person);
        id
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.index.get(&id).map(|slot| &self.people[*slot])
    }

    /// Targeted updates only (surname changes on marriage).
    pub(crate) fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        match self.index.get(&id) {
            Some(slot) => self.people.get_mut(*slot),
            None => None,
        }
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn into_people(self) -> Vec<Person> {
        self.people
    }
}
