use lineage_core::{BloodType, Sex};

pub const PERSON_TABLE: &str = "person";
pub const MARRIAGE_TABLE: &str = "marriage";

/// Person columns in `Person` field order, excluding the creation ordinal.
pub const PERSON_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "middle_name",
    "last_name",
    "maiden_name",
    "date_of_birth",
    "sex",
    "blood_type",
    "nationality",
    "ethnicity",
    "place_of_birth",
    "date_of_death",
    "is_deceased",
    "cause_of_death",
    "height_cm",
    "eye_color",
    "hair_color",
    "email",
    "phone",
    "address",
    "occupation",
    "education",
    "religion",
    "notes",
    "legacy_bucket_id",
    "father_id",
    "mother_id",
];

pub const MARRIAGE_COLUMNS: &[&str] = &["person1_id", "person2_id", "year", "current", "ended_year"];

/// Only identity and names are required; every other column tolerates nulls.
///
/// Rows loaded by other tools may therefore lack `date_of_birth`, `sex` or the
/// other fields a `Person` requires. Import accepts them, but export rejects
/// such a row with `StoreError::InvalidRow`.
pub fn person_table_ddl() -> String {
    format!(
        r#"
        create table if not exists {PERSON_TABLE} (
          id uuid primary key,
          seq bigint not null,
          first_name text not null,
          middle_name text,
          last_name text not null,
          maiden_name text,
          date_of_birth date,
          sex text check (sex in ({sexes})),
          blood_type text check (blood_type in ({blood_types})),
          nationality text,
          ethnicity text,
          place_of_birth text,
          date_of_death date,
          is_deceased boolean,
          cause_of_death text,
          height_cm integer,
          eye_color text,
          hair_color text,
          email text,
          phone text,
          address text,
          occupation text,
          education text,
          religion text,
          notes text,
          legacy_bucket_id uuid,
          father_id uuid,
          mother_id uuid
        )
        "#,
        sexes = sql_list(Sex::ALL.iter().map(|sex| sex.as_str())),
        blood_types = sql_list(BloodType::ALL.iter().map(|blood| blood.as_str())),
    )
}

pub fn marriage_table_ddl() -> String {
    format!(
        r#"
        create table if not exists {MARRIAGE_TABLE} (
          seq bigint primary key,
          person1_id uuid not null,
          person2_id uuid not null,
          year integer not null,
          current boolean not null,
          ended_year integer
        )
        "#
    )
}

/// Secondary indexes: weak parent references and common lookups.
pub fn index_ddl() -> Vec<String> {
    [
        ("person_seq_idx", "seq"),
        ("person_father_id_idx", "father_id"),
        ("person_mother_id_idx", "mother_id"),
        ("person_name_idx", "last_name, first_name"),
        ("person_date_of_birth_idx", "date_of_birth"),
        ("person_legacy_bucket_id_idx", "legacy_bucket_id"),
    ]
    .iter()
    .map(|(name, columns)| {
        format!("create index if not exists {name} on {PERSON_TABLE} ({columns})")
    })
    .collect()
}

fn sql_list<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels
        .map(|label| format!("'{}'", label.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_ddl_constrains_categoricals() {
        let ddl = person_table_ddl();
        assert!(ddl.contains("check (sex in ('M', 'F'))"));
        assert!(ddl.contains("'AB-'"));
        assert!(ddl.contains("first_name text not null"));
        assert!(ddl.contains("father_id uuid,"));
        assert!(ddl.contains("date_of_birth date,"));
        assert_eq!(PERSON_COLUMNS.len(), 27);
    }

    #[test]
    fn indexes_cover_parent_links() {
        let indexes = index_ddl();
        assert!(indexes.iter().any(|sql| sql.ends_with("(father_id)")));
        assert!(indexes.iter().any(|sql| sql.ends_with("(mother_id)")));
        assert!(indexes.iter().any(|sql| sql.contains("(last_name, first_name)")));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(sql_list(["Bachelor's"].into_iter()), "'Bachelor''s'");
    }
}
