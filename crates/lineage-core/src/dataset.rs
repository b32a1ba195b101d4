use std::collections::{BTreeMap, HashMap};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::person::{Marriage, Person, PersonId};

/// The generated artifact: every person in creation order plus all marriages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    pub people: Vec<Person>,
    #[serde(default)]
    pub marriages: Vec<Marriage>,
}

/// Resolution of a weak parent reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParentRef<'a> {
    /// No parent recorded.
    Absent,
    /// A placeholder record standing in for an unrecorded parent.
    Placeholder(&'a Person),
    Known(&'a Person),
    /// The id does not resolve. Never produced by a valid dataset.
    Dangling(PersonId),
}

impl Dataset {
    pub fn index(&self) -> HashMap<PersonId, &Person> {
        self.people.iter().map(|person| (person.id, person)).collect()
    }

    pub fn resolve_parent<'a>(
        index: &HashMap<PersonId, &'a Person>,
        link: Option<PersonId>,
    ) -> ParentRef<'a> {
        match link {
            None => ParentRef::Absent,
            Some(id) => match index.get(&id) {
                Some(person) if person.is_placeholder() => ParentRef::Placeholder(person),
                Some(person) => ParentRef::Known(person),
                None => ParentRef::Dangling(id),
            },
        }
    }

    /// Parent to children mapping derived from parent pointers, children in
    /// dataset order.
    pub fn children_index(&self) -> BTreeMap<PersonId, Vec<PersonId>> {
        let mut children: BTreeMap<PersonId, Vec<PersonId>> = BTreeMap::new();
        for person in &self.people {
            for parent in [person.father_id, person.mother_id].into_iter().flatten() {
                children.entry(parent).or_default().push(person.id);
            }
        }
        children
    }
}
