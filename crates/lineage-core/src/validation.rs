use std::collections::{HashMap, HashSet};

use crate::dataset::{Dataset, ParentRef};
use crate::error::{Error, Result};
use crate::person::{Person, PersonId};
use crate::types::Sex;

/// Minimum age of both parties in the year a marriage is formed.
pub const MARRIAGE_MIN_AGE: i32 = 18;

/// Validate internal consistency of a generated dataset.
///
/// This checks:
/// - duplicate person ids
/// - parent references resolve, have the expected sex and are not the person itself
/// - death date, deceased flag and cause of death agree
/// - maiden names appear on women only
/// - marriages join two known, opposite-sex adults and record divorces consistently
pub fn validate_dataset(dataset: &Dataset) -> Result<()> {
    let mut seen = HashSet::new();
    for person in &dataset.people {
        if !seen.insert(person.id) {
            return Err(Error::InvalidDataset(format!(
                "duplicate person id: {}",
                person.id
            )));
        }
    }

    let index = dataset.index();
    for person in &dataset.people {
        check_parent(&index, person, person.father_id, Sex::Male, "father")?;
        check_parent(&index, person, person.mother_id, Sex::Female, "mother")?;
        check_vitals(person)?;

        if person.maiden_name.is_some() && person.sex != Sex::Female {
            return Err(Error::InvalidDataset(format!(
                "maiden name set on non-female person: {}",
                person.id
            )));
        }
    }

    for marriage in &dataset.marriages {
        let first = lookup(&index, marriage.person1_id, "marriage party")?;
        let second = lookup(&index, marriage.person2_id, "marriage party")?;

        if first.sex == second.sex {
            return Err(Error::InvalidDataset(format!(
                "same-sex marriage between {} and {}",
                first.id, second.id
            )));
        }

        for party in [first, second] {
            if party.age_in(marriage.year) < MARRIAGE_MIN_AGE {
                return Err(Error::InvalidDataset(format!(
                    "underage marriage for {} in {}",
                    party.id, marriage.year
                )));
            }
        }

        if marriage.current != marriage.ended_year.is_none() {
            return Err(Error::InvalidDataset(format!(
                "marriage of {} and {} has inconsistent divorce state",
                first.id, second.id
            )));
        }
    }

    Ok(())
}

fn lookup<'a>(
    index: &HashMap<PersonId, &'a Person>,
    id: PersonId,
    role: &str,
) -> Result<&'a Person> {
    index
        .get(&id)
        .copied()
        .ok_or_else(|| Error::InvalidDataset(format!("{role} not found: {id}")))
}

fn check_parent(
    index: &HashMap<PersonId, &Person>,
    person: &Person,
    link: Option<PersonId>,
    expected: Sex,
    role: &str,
) -> Result<()> {
    let parent = match Dataset::resolve_parent(index, link) {
        ParentRef::Absent => return Ok(()),
        ParentRef::Dangling(id) => {
            return Err(Error::InvalidDataset(format!(
                "{role} {id} of {} not found",
                person.id
            )));
        }
        ParentRef::Placeholder(parent) | ParentRef::Known(parent) => parent,
    };

    if parent.id == person.id {
        return Err(Error::InvalidDataset(format!(
            "person {} is their own {role}",
            person.id
        )));
    }
    if parent.sex != expected {
        return Err(Error::InvalidDataset(format!(
            "{role} {} of {} has sex {}",
            parent.id, person.id, parent.sex
        )));
    }
    Ok(())
}

fn check_vitals(person: &Person) -> Result<()> {
    let has_date = person.date_of_death.is_some();
    let has_cause = person.cause_of_death.is_some();
    if person.is_deceased != has_date || person.is_deceased != has_cause {
        return Err(Error::InvalidDataset(format!(
            "death fields disagree for {}",
            person.id
        )));
    }

    if let Some(death) = person.date_of_death
        && death < person.date_of_birth
    {
        return Err(Error::InvalidDataset(format!(
            "death precedes birth for {}",
            person.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::person::Marriage;
    use crate::types::{BloodType, CauseOfDeath, Ethnicity, EyeColor, HairColor, Nationality, Religion};

    fn person(byte: u8, sex: Sex, birth_year: i32) -> Person {
        Person {
            id: PersonId::from_bytes([byte; 16]),
            first_name: "Test".to_string(),
            middle_name: None,
            last_name: "Person".to_string(),
            maiden_name: None,
            date_of_birth: NaiveDate::from_ymd_opt(birth_year, 6, 1).expect("valid date"),
            sex,
            blood_type: BloodType::OPos,
            nationality: Nationality::British,
            ethnicity: Ethnicity::Mixed,
            place_of_birth: "Leeds, United Kingdom".to_string(),
            date_of_death: None,
            is_deceased: false,
            cause_of_death: None,
            height_cm: 170,
            eye_color: EyeColor::Blue,
            hair_color: HairColor::Brown,
            email: None,
            phone: None,
            address: None,
            occupation: None,
            education: None,
            religion: Religion::NoReligion,
            notes: None,
            legacy_bucket_id: None,
            father_id: None,
            mother_id: None,
        }
    }

    #[test]
    fn accepts_consistent_family() {
        let father = person(1, Sex::Male, 1900);
        let mother = person(2, Sex::Female, 1902);
        let mut child = person(3, Sex::Female, 1925);
        child.father_id = Some(father.id);
        child.mother_id = Some(mother.id);
        let marriages = vec![Marriage::new(father.id, mother.id, 1922)];
        let dataset = Dataset {
            people: vec![father, mother, child],
            marriages,
        };
        validate_dataset(&dataset).expect("dataset should validate");
    }

    #[test]
    fn rejects_dangling_parent() {
        let mut child = person(3, Sex::Male, 1925);
        child.mother_id = Some(PersonId::from_bytes([9; 16]));
        let dataset = Dataset {
            people: vec![child],
            marriages: Vec::new(),
        };
        let err = validate_dataset(&dataset).expect_err("dangling parent");
        assert!(err.to_string().contains("mother"));
    }

    #[test]
    fn rejects_deceased_without_death_date() {
        let mut dead = person(4, Sex::Male, 1850);
        dead.is_deceased = true;
        dead.cause_of_death = Some(CauseOfDeath::Stroke);
        let dataset = Dataset {
            people: vec![dead],
            marriages: Vec::new(),
        };
        assert!(validate_dataset(&dataset).is_err());
    }

    #[test]
    fn rejects_underage_marriage() {
        let husband = person(1, Sex::Male, 1900);
        let wife = person(2, Sex::Female, 1905);
        let marriages = vec![Marriage::new(husband.id, wife.id, 1920)];
        let dataset = Dataset {
            people: vec![husband, wife],
            marriages,
        };
        let err = validate_dataset(&dataset).expect_err("underage");
        assert!(err.to_string().contains("underage"));
    }
}
