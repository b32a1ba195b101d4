use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use lineage_core::{Dataset, Person};

use crate::analytics::SampleReport;
use crate::error::StoreError;
use crate::store::{DatasetStore, ImportSummary};

mod queries;
mod rows;
pub mod schema;

pub use rows::{MarriageRow, PersonRow};

const TOP_LAST_NAMES: i64 = 10;
const TOP_PARENTS: i64 = 5;

/// Open a small pool against `url`.
pub async fn connect_pool(url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await?;
    Ok(pool)
}

/// Dataset store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(connect_pool(url).await?))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl DatasetStore for PostgresStore {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&schema::person_table_ddl())
            .execute(&mut *tx)
            .await?;
        sqlx::query(&schema::marriage_table_ddl())
            .execute(&mut *tx)
            .await?;
        for statement in schema::index_ddl() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn import(&self, dataset: &Dataset) -> Result<ImportSummary, StoreError> {
        self.ensure_schema().await?;

        let mut tx = self.pool.begin().await?;
        queries::clear(&mut tx).await?;
        let people = queries::insert_people(&mut tx, &dataset.people).await?;
        let marriages = queries::insert_marriages(&mut tx, &dataset.marriages).await?;
        tx.commit().await?;

        let dangling = queries::dangling_parent_ids(&self.pool).await?;
        if !dangling.is_empty() {
            warn!(
                dangling = dangling.len(),
                "imported parent references without a person row"
            );
        }

        info!(people, marriages, "dataset imported");
        Ok(ImportSummary { people, marriages })
    }

    async fn export(&self) -> Result<Dataset, StoreError> {
        let people = queries::select_people(&self.pool)
            .await?
            .into_iter()
            .map(Person::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let marriages = queries::select_marriages(&self.pool)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        info!(people = people.len(), "dataset exported");
        Ok(Dataset { people, marriages })
    }

    async fn sample_queries(&self, as_of_year: i32) -> Result<SampleReport, StoreError> {
        let pool = &self.pool;
        Ok(SampleReport {
            as_of_year,
            total_people: queries::count_people(pool).await?,
            placeholders: queries::count_placeholders(pool).await?,
            sex_distribution: queries::sex_distribution(pool).await?,
            living_age_distribution: queries::living_age_distribution(pool, as_of_year).await?,
            top_last_names: queries::top_last_names(pool, TOP_LAST_NAMES).await?,
            unknown_parents: queries::unknown_parents(pool).await?,
            births_by_decade: queries::births_by_decade(pool).await?,
            top_parents: queries::top_parents(pool, TOP_PARENTS).await?,
        })
    }
}
