use chrono::NaiveDate;
use uuid::Uuid;

use lineage_core::{
    BloodType, CauseOfDeath, Education, Ethnicity, EyeColor, HairColor, Marriage, Nationality,
    Person, PersonId, Religion, Sex,
};

use crate::error::StoreError;

/// A `person` row as read back from the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersonRow {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub maiden_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub blood_type: Option<String>,
    pub nationality: Option<String>,
    pub ethnicity: Option<String>,
    pub place_of_birth: Option<String>,
    pub date_of_death: Option<NaiveDate>,
    pub is_deceased: Option<bool>,
    pub cause_of_death: Option<String>,
    pub height_cm: Option<i32>,
    pub eye_color: Option<String>,
    pub hair_color: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub religion: Option<String>,
    pub notes: Option<String>,
    pub legacy_bucket_id: Option<Uuid>,
    pub father_id: Option<Uuid>,
    pub mother_id: Option<Uuid>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MarriageRow {
    pub person1_id: Uuid,
    pub person2_id: Uuid,
    pub year: i32,
    pub current: bool,
    pub ended_year: Option<i32>,
}

impl TryFrom<PersonRow> for Person {
    type Error = StoreError;

    fn try_from(row: PersonRow) -> Result<Self, Self::Error> {
        let id = PersonId(row.id);
        let required = |value: Option<String>, column: &str| {
            value.ok_or_else(|| StoreError::invalid_row(id, format!("{column} is null")))
        };
        let height_cm = match row.height_cm {
            Some(height) => u16::try_from(height)
                .map_err(|_| StoreError::invalid_row(id, format!("height_cm {height} out of range")))?,
            None => return Err(StoreError::invalid_row(id, "height_cm is null")),
        };
        let date_of_birth = row
            .date_of_birth
            .ok_or_else(|| StoreError::invalid_row(id, "date_of_birth is null"))?;

        Ok(Person {
            id,
            first_name: row.first_name,
            middle_name: row.middle_name,
            last_name: row.last_name,
            maiden_name: row.maiden_name,
            date_of_birth,
            sex: label(id, "sex", required(row.sex, "sex")?, Sex::parse)?,
            blood_type: label(
                id,
                "blood_type",
                required(row.blood_type, "blood_type")?,
                BloodType::parse,
            )?,
            nationality: label(
                id,
                "nationality",
                required(row.nationality, "nationality")?,
                Nationality::parse,
            )?,
            ethnicity: label(
                id,
                "ethnicity",
                required(row.ethnicity, "ethnicity")?,
                Ethnicity::parse,
            )?,
            place_of_birth: row.place_of_birth.unwrap_or_default(),
            is_deceased: row.is_deceased.unwrap_or(row.date_of_death.is_some()),
            date_of_death: row.date_of_death,
            cause_of_death: optional_label(
                id,
                "cause_of_death",
                row.cause_of_death,
                CauseOfDeath::parse,
            )?,
            height_cm,
            eye_color: label(
                id,
                "eye_color",
                required(row.eye_color, "eye_color")?,
                EyeColor::parse,
            )?,
            hair_color: label(
                id,
                "hair_color",
                required(row.hair_color, "hair_color")?,
                HairColor::parse,
            )?,
            email: row.email,
            phone: row.phone,
            address: row.address,
            occupation: row.occupation,
            education: optional_label(id, "education", row.education, Education::parse)?,
            religion: label(
                id,
                "religion",
                required(row.religion, "religion")?,
                Religion::parse,
            )?,
            notes: row.notes,
            legacy_bucket_id: row.legacy_bucket_id,
            father_id: row.father_id.map(PersonId),
            mother_id: row.mother_id.map(PersonId),
        })
    }
}

impl From<MarriageRow> for Marriage {
    fn from(row: MarriageRow) -> Self {
        Marriage {
            person1_id: PersonId(row.person1_id),
            person2_id: PersonId(row.person2_id),
            year: row.year,
            current: row.current,
            ended_year: row.ended_year,
        }
    }
}

fn label<T>(
    id: PersonId,
    column: &str,
    value: String,
    parse: fn(&str) -> Option<T>,
) -> Result<T, StoreError> {
    parse(&value)
        .ok_or_else(|| StoreError::invalid_row(id, format!("unknown {column} label '{value}'")))
}

fn optional_label<T>(
    id: PersonId,
    column: &str,
    value: Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, StoreError> {
    value.map(|value| label(id, column, value, parse)).transpose()
}
