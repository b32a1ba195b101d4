use std::fmt;

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    BloodType, CauseOfDeath, Education, Ethnicity, EyeColor, HairColor, Nationality, Religion, Sex,
};

/// Note attached to placeholder records standing in for an unrecorded parent.
pub const PLACEHOLDER_NOTE: &str = "Placeholder for unknown parent";

/// First and last name given to placeholder parents.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Stable identifier of a person. Assigned once by the registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PersonId(pub Uuid);

impl PersonId {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single person record as emitted in `family_tree.json`.
///
/// Every optional field serializes as an explicit `null`; consumers rely on
/// the full field set being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    /// Set only on women, at their first marriage.
    pub maiden_name: Option<String>,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub blood_type: BloodType,
    pub nationality: Nationality,
    pub ethnicity: Ethnicity,
    pub place_of_birth: String,
    pub date_of_death: Option<NaiveDate>,
    pub is_deceased: bool,
    pub cause_of_death: Option<CauseOfDeath>,
    pub height_cm: u16,
    pub eye_color: EyeColor,
    pub hair_color: HairColor,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<Education>,
    pub religion: Religion,
    pub notes: Option<String>,
    pub legacy_bucket_id: Option<Uuid>,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
}

impl Person {
    pub fn birth_year(&self) -> i32 {
        self.date_of_birth.year()
    }

    pub fn death_year(&self) -> Option<i32> {
        self.date_of_death.map(|date| date.year())
    }

    /// Age in whole calendar years at `year`.
    pub fn age_in(&self, year: i32) -> i32 {
        year - self.birth_year()
    }

    /// False only when the person died in a year strictly before `year`.
    pub fn alive_in(&self, year: i32) -> bool {
        match (self.is_deceased, self.death_year()) {
            (true, Some(death_year)) => death_year >= year,
            _ => true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.notes.as_deref() == Some(PLACEHOLDER_NOTE)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A marriage between two people. Never deleted; divorce only deactivates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Marriage {
    pub person1_id: PersonId,
    pub person2_id: PersonId,
    /// Year the marriage was formed.
    pub year: i32,
    pub current: bool,
    /// Year of the divorce that deactivated it, if any.
    pub ended_year: Option<i32>,
}

impl Marriage {
    pub fn new(person1_id: PersonId, person2_id: PersonId, year: i32) -> Self {
        Self {
            person1_id,
            person2_id,
            year,
            current: true,
            ended_year: None,
        }
    }

    pub fn involves(&self, id: PersonId) -> bool {
        self.person1_id == id || self.person2_id == id
    }

    pub fn spouse_of(&self, id: PersonId) -> Option<PersonId> {
        if self.person1_id == id {
            Some(self.person2_id)
        } else if self.person2_id == id {
            Some(self.person1_id)
        } else {
            None
        }
    }

    /// Whether the marriage had been formed and not yet dissolved at `year`.
    pub fn active_in(&self, year: i32) -> bool {
        self.year <= year && self.ended_year.is_none_or(|ended| year < ended)
    }

    pub fn dissolve(&mut self, year: i32) {
        self.current = false;
        self.ended_year = Some(year);
    }
}
