use chrono::Datelike;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use lineage_core::{
    BLOOD_TYPE_WEIGHTS, BloodType, Education, Ethnicity, EyeColor, HairColor, Nationality, Person,
    PersonId, Religion, Sex,
};

use crate::config::SimulationConfig;
use crate::faker_rs::{FakerCategory, FakerSource};
use crate::mortality::{MortalityModel, random_date};

/// Everything the caller pins down about a new person; the rest is drawn.
#[derive(Debug, Clone, Default)]
pub struct PersonSpec<'a> {
    pub birth_year: i32,
    pub sex: Option<Sex>,
    pub forced_deceased: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father: Option<&'a Person>,
    pub mother: Option<&'a Person>,
}

impl<'a> PersonSpec<'a> {
    pub fn born(birth_year: i32) -> Self {
        Self {
            birth_year,
            ..Self::default()
        }
    }

    pub fn sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn forced_deceased(mut self, deceased: bool) -> Self {
        self.forced_deceased = Some(deceased);
        self
    }

    pub fn named(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn parents(mut self, father: Option<&'a Person>, mother: Option<&'a Person>) -> Self {
        self.father = father;
        self.mother = mother;
        self
    }
}

/// Draws biological, cultural and contact attributes for new people.
///
/// Reads parent records but never touches the registry; the returned record
/// carries a nil id until the registry assigns one.
pub struct AttributeSynthesizer {
    config: SimulationConfig,
    mortality: MortalityModel,
    faker: Box<dyn FakerSource>,
}

impl AttributeSynthesizer {
    pub fn new(config: &SimulationConfig, faker: Box<dyn FakerSource>) -> Self {
        Self {
            config: config.clone(),
            mortality: MortalityModel::new(config),
            faker,
        }
    }

    pub fn mortality(&self) -> &MortalityModel {
        &self.mortality
    }

    pub fn synthesize(&self, spec: PersonSpec<'_>, rng: &mut dyn RngCore) -> Person {
        let config = &self.config;
        let PersonSpec {
            birth_year,
            sex,
            forced_deceased,
            first_name,
            last_name,
            father,
            mother,
        } = spec;
        let sex = sex.unwrap_or_else(|| {
            if rng.random_bool(0.5) {
                Sex::Male
            } else {
                Sex::Female
            }
        });

        let first_name = match first_name {
            Some(name) => name,
            None => self.faker.text(FakerCategory::GivenName, Some(sex), rng),
        };
        let last_name = match last_name.or_else(|| inherited_surname(father, mother)) {
            Some(name) => name,
            None => self.faker.text(FakerCategory::FamilyName, None, rng),
        };
        let middle_name = rng
            .random_bool(config.middle_name_probability)
            .then(|| self.faker.text(FakerCategory::GivenName, Some(sex), rng));

        let date_of_birth = random_date(birth_year, rng);
        let vitals = self.mortality.evaluate(birth_year, forced_deceased, rng);

        let blood_type = BLOOD_TYPE_WEIGHTS
            .choose_weighted(&mut *rng, |(_, weight)| *weight)
            .map(|(blood_type, _)| *blood_type)
            .unwrap_or(BloodType::OPos);

        let both_parents = father.zip(mother);

        let (eye_color, hair_color) = match both_parents {
            Some((father, mother)) if rng.random_bool(config.trait_inheritance_probability) => (
                either(father.eye_color, mother.eye_color, rng),
                either(father.hair_color, mother.hair_color, rng),
            ),
            _ => (uniform(EyeColor::ALL, rng), uniform(HairColor::ALL, rng)),
        };

        let height_cm = match sex {
            Sex::Male => rng.random_range(150..=200),
            Sex::Female => rng.random_range(145..=185),
        };

        let age = config.present_year - birth_year;

        let email = if (10..=90).contains(&age)
            && rng.random_bool((0.9 - f64::from(age) / 100.0).clamp(0.0, 1.0))
        {
            let domain = self.faker.text(FakerCategory::EmailDomain, None, rng);
            Some(format!(
                "{}.{}@{domain}",
                email_slug(&first_name),
                email_slug(&last_name)
            ))
        } else {
            None
        };

        let phone = if age >= 12 && rng.random_bool((0.95 - f64::from(age) / 200.0).clamp(0.0, 1.0))
        {
            Some(format!(
                "+1-{}-{}-{}",
                rng.random_range(200..=999),
                rng.random_range(100..=999),
                rng.random_range(1000..=9999)
            ))
        } else {
            None
        };

        let (nationality, ethnicity, religion) = match both_parents {
            Some((father, mother)) if rng.random_bool(config.nationality_inheritance_probability) => {
                let nationality = either(father.nationality, mother.nationality, rng);
                let ethnicity = either(father.ethnicity, mother.ethnicity, rng);
                let religion = if rng.random_bool(config.religion_inheritance_probability) {
                    either(father.religion, mother.religion, rng)
                } else {
                    uniform(Religion::ALL, rng)
                };
                (nationality, ethnicity, religion)
            }
            _ => (
                uniform(Nationality::ALL, rng),
                uniform(Ethnicity::ALL, rng),
                uniform(Religion::ALL, rng),
            ),
        };

        let city = self.faker.text(FakerCategory::City, None, rng);
        let country = self.faker.text(FakerCategory::Country, None, rng);
        let place_of_birth = format!("{city}, {country}");

        let address = (!vitals.is_deceased && age >= 18)
            .then(|| self.faker.text(FakerCategory::StreetAddress, None, rng));

        let died_young = vitals
            .date_of_death
            .is_some_and(|date| date.year() - birth_year < 22);
        let (education, occupation) = if age >= 18 && !died_young {
            (
                Some(uniform(Education::ALL, rng)),
                Some(self.faker.text(FakerCategory::JobTitle, None, rng)),
            )
        } else {
            (None, None)
        };

        let legacy_bucket_id = rng.random_bool(config.legacy_bucket_probability).then(|| {
            let mut bytes = [0_u8; 16];
            rng.fill_bytes(&mut bytes);
            uuid::Builder::from_random_bytes(bytes).into_uuid()
        });

        Person {
            id: PersonId(uuid::Uuid::nil()),
            first_name,
            middle_name,
            last_name,
            maiden_name: None,
            date_of_birth,
            sex,
            blood_type,
            nationality,
            ethnicity,
            place_of_birth,
            date_of_death: vitals.date_of_death,
            is_deceased: vitals.is_deceased,
            cause_of_death: vitals.cause,
            height_cm,
            eye_color,
            hair_color,
            email,
            phone,
            address,
            occupation,
            education,
            religion,
            notes: None,
            legacy_bucket_id,
            father_id: father.map(|father| father.id),
            mother_id: mother.map(|mother| mother.id),
        }
    }
}

/// Surname of the first recorded, non-placeholder parent (father first).
fn inherited_surname(father: Option<&Person>, mother: Option<&Person>) -> Option<String> {
    [father, mother]
        .into_iter()
        .flatten()
        .find(|parent| !parent.is_placeholder())
        .map(|parent| parent.last_name.clone())
}

fn either<T: Copy>(first: T, second: T, rng: &mut dyn RngCore) -> T {
    if rng.random_bool(0.5) { first } else { second }
}

fn uniform<T: Copy>(values: &'static [T], rng: &mut dyn RngCore) -> T {
    values[rng.random_range(0..values.len())]
}

fn email_slug(value: &str) -> String {
    let slug: String = value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    if slug.is_empty() {
        "user".to_string()
    } else {
        slug
    }
}
