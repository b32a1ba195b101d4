use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use lineage_core::{Marriage, PLACEHOLDER_NOTE, Person, PersonId};

use crate::analytics::{
    DecadeCount, LabelCount, ParentChildCount, UnknownParentCounts, order_age_buckets,
};
use crate::error::StoreError;

use super::rows::{MarriageRow, PersonRow};
use super::schema::{MARRIAGE_COLUMNS, MARRIAGE_TABLE, PERSON_COLUMNS, PERSON_TABLE};

/// Rows per multi-row insert; keeps bind parameters under the Postgres limit.
const INSERT_CHUNK: usize = 1000;

pub async fn clear(conn: &mut PgConnection) -> Result<(), StoreError> {
    sqlx::query(&format!("truncate table {MARRIAGE_TABLE}, {PERSON_TABLE}"))
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_people(conn: &mut PgConnection, people: &[Person]) -> Result<u64, StoreError> {
    let mut inserted = 0;
    for (chunk_index, chunk) in people.chunks(INSERT_CHUNK).enumerate() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "insert into {PERSON_TABLE} (seq, {}) ",
            PERSON_COLUMNS.join(", ")
        ));
        let base = chunk_index * INSERT_CHUNK;
        builder.push_values(chunk.iter().enumerate(), |mut row, (offset, person)| {
            row.push_bind((base + offset) as i64)
                .push_bind(person.id.as_uuid())
                .push_bind(person.first_name.as_str())
                .push_bind(person.middle_name.as_deref())
                .push_bind(person.last_name.as_str())
                .push_bind(person.maiden_name.as_deref())
                .push_bind(person.date_of_birth)
                .push_bind(person.sex.as_str())
                .push_bind(person.blood_type.as_str())
                .push_bind(person.nationality.as_str())
                .push_bind(person.ethnicity.as_str())
                .push_bind(person.place_of_birth.as_str())
                .push_bind(person.date_of_death)
                .push_bind(person.is_deceased)
                .push_bind(person.cause_of_death.map(|cause| cause.as_str()))
                .push_bind(i32::from(person.height_cm))
                .push_bind(person.eye_color.as_str())
                .push_bind(person.hair_color.as_str())
                .push_bind(person.email.as_deref())
                .push_bind(person.phone.as_deref())
                .push_bind(person.address.as_deref())
                .push_bind(person.occupation.as_deref())
                .push_bind(person.education.map(|education| education.as_str()))
                .push_bind(person.religion.as_str())
                .push_bind(person.notes.as_deref())
                .push_bind(person.legacy_bucket_id)
                .push_bind(person.father_id.map(|id| id.as_uuid()))
                .push_bind(person.mother_id.map(|id| id.as_uuid()));
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}

pub async fn insert_marriages(
    conn: &mut PgConnection,
    marriages: &[Marriage],
) -> Result<u64, StoreError> {
    let mut inserted = 0;
    for (chunk_index, chunk) in marriages.chunks(INSERT_CHUNK).enumerate() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "insert into {MARRIAGE_TABLE} (seq, {}) ",
            MARRIAGE_COLUMNS.join(", ")
        ));
        let base = chunk_index * INSERT_CHUNK;
        builder.push_values(chunk.iter().enumerate(), |mut row, (offset, marriage)| {
            row.push_bind((base + offset) as i64)
                .push_bind(marriage.person1_id.as_uuid())
                .push_bind(marriage.person2_id.as_uuid())
                .push_bind(marriage.year)
                .push_bind(marriage.current)
                .push_bind(marriage.ended_year);
        });
        inserted += builder.build().execute(&mut *conn).await?.rows_affected();
    }
    Ok(inserted)
}

pub async fn select_people(pool: &PgPool) -> Result<Vec<PersonRow>, StoreError> {
    let rows = sqlx::query_as::<_, PersonRow>(&format!(
        "select {} from {PERSON_TABLE} order by seq",
        PERSON_COLUMNS.join(", ")
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn select_marriages(pool: &PgPool) -> Result<Vec<MarriageRow>, StoreError> {
    let rows = sqlx::query_as::<_, MarriageRow>(&format!(
        "select {} from {MARRIAGE_TABLE} order by seq",
        MARRIAGE_COLUMNS.join(", ")
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_people(pool: &PgPool) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>(&format!("select count(*) from {PERSON_TABLE}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_placeholders(pool: &PgPool) -> Result<i64, StoreError> {
    let count = sqlx::query_scalar::<_, i64>(&format!(
        "select count(*) from {PERSON_TABLE} where notes = $1"
    ))
    .bind(PLACEHOLDER_NOTE)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn sex_distribution(pool: &PgPool) -> Result<Vec<LabelCount>, StoreError> {
    let rows = sqlx::query_as::<_, LabelCount>(&format!(
        r#"
        select coalesce(sex, 'unknown') as label, count(*) as count
        from {PERSON_TABLE}
        group by sex
        order by label
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn living_age_distribution(
    pool: &PgPool,
    as_of_year: i32,
) -> Result<Vec<LabelCount>, StoreError> {
    let rows = sqlx::query_as::<_, LabelCount>(&format!(
        r#"
        select
          case
            when age < 18 then 'Under 18'
            when age <= 30 then '18-30'
            when age <= 50 then '31-50'
            when age <= 70 then '51-70'
            else 'Over 70'
          end as label,
          count(*) as count
        from (
          select $1 - extract(year from date_of_birth)::int as age
          from {PERSON_TABLE}
          where not coalesce(is_deceased, false)
            and date_of_birth is not null
            and notes is distinct from $2
        ) ages
        group by label
        "#
    ))
    .bind(as_of_year)
    .bind(PLACEHOLDER_NOTE)
    .fetch_all(pool)
    .await?;
    Ok(order_age_buckets(rows))
}

pub async fn top_last_names(pool: &PgPool, limit: i64) -> Result<Vec<LabelCount>, StoreError> {
    let rows = sqlx::query_as::<_, LabelCount>(&format!(
        r#"
        select last_name as label, count(*) as count
        from {PERSON_TABLE}
        where notes is distinct from $1
        group by last_name
        order by count desc, last_name
        limit $2
        "#
    ))
    .bind(PLACEHOLDER_NOTE)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn unknown_parents(pool: &PgPool) -> Result<UnknownParentCounts, StoreError> {
    let counts = sqlx::query_as::<_, UnknownParentCounts>(&format!(
        r#"
        select
          count(*) filter (where f.id is null or f.notes = $1) as unknown_father,
          count(*) filter (where m.id is null or m.notes = $1) as unknown_mother,
          count(*) filter (
            where (f.id is null or f.notes = $1) and (m.id is null or m.notes = $1)
          ) as both_unknown
        from {PERSON_TABLE} p
        left join {PERSON_TABLE} f on f.id = p.father_id
        left join {PERSON_TABLE} m on m.id = p.mother_id
        where p.notes is distinct from $1
        "#
    ))
    .bind(PLACEHOLDER_NOTE)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

pub async fn births_by_decade(pool: &PgPool) -> Result<Vec<DecadeCount>, StoreError> {
    let rows = sqlx::query_as::<_, DecadeCount>(&format!(
        r#"
        select (extract(year from date_of_birth)::int / 10) * 10 as decade, count(*) as count
        from {PERSON_TABLE}
        where date_of_birth is not null
          and notes is distinct from $1
        group by decade
        order by decade
        "#
    ))
    .bind(PLACEHOLDER_NOTE)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn top_parents(pool: &PgPool, limit: i64) -> Result<Vec<ParentChildCount>, StoreError> {
    let rows = sqlx::query_as::<_, ParentChildCount>(&format!(
        r#"
        select p.id, p.first_name, p.last_name, count(c.id) as children
        from {PERSON_TABLE} p
        join {PERSON_TABLE} c on c.father_id = p.id or c.mother_id = p.id
        where p.notes is distinct from $1
        group by p.id, p.first_name, p.last_name
        order by children desc, p.last_name, p.first_name, p.id
        limit $2
        "#
    ))
    .bind(PLACEHOLDER_NOTE)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Ids referenced as parents that have no row of their own.
pub async fn dangling_parent_ids(pool: &PgPool) -> Result<Vec<PersonId>, StoreError> {
    let ids = sqlx::query_scalar::<_, uuid::Uuid>(&format!(
        r#"
        select distinct parent_id
        from (
          select father_id as parent_id from {PERSON_TABLE}
          union all
          select mother_id from {PERSON_TABLE}
        ) refs
        where parent_id is not null
          and not exists (select 1 from {PERSON_TABLE} p where p.id = refs.parent_id)
        order by parent_id
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().map(PersonId).collect())
}
