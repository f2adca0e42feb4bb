use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tender::{NewTender, TenderRecord, TenderRow};
use crate::store::TenderStore;

const RETURNING_COLUMNS: &str = "id, name, origin, destination, transport_type, weight, \
    pallets, cubes, places, capacity, price, carrier_price, status, comment, tender_date, created_at";

/// PostgreSQL-backed store. Within one `created_at` instant (a batch import),
/// rows come back in insertion order.
#[derive(Clone)]
pub struct PgTenderStore {
    pool: PgPool,
}

impl PgTenderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// INSERTs one record inside whatever executor the caller provides.
async fn insert_record<'e, E>(executor: E, record: &TenderRecord) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO tenders
            (id, name, origin, destination, transport_type, weight, pallets, cubes,
             places, capacity, price, carrier_price, status, comment, tender_date, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.origin)
    .bind(&record.destination)
    .bind(&record.transport_type)
    .bind(&record.weight)
    .bind(&record.pallets)
    .bind(&record.cubes)
    .bind(&record.places)
    .bind(&record.capacity)
    .bind(record.price)
    .bind(record.carrier_price)
    .bind(record.status.as_str())
    .bind(&record.comment)
    .bind(record.date)
    .bind(record.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

fn new_record(draft: NewTender, created_at: DateTime<Utc>) -> TenderRecord {
    TenderRecord::from_new(Uuid::new_v4(), draft, created_at)
}

#[async_trait]
impl TenderStore for PgTenderStore {
    async fn create(&self, draft: NewTender) -> Result<TenderRecord, AppError> {
        let record = new_record(draft, Utc::now());
        insert_record(&self.pool, &record).await?;
        info!("Inserted tender {}", record.id);
        Ok(record)
    }

    async fn create_many(&self, drafts: Vec<NewTender>) -> Result<Vec<TenderRecord>, AppError> {
        let created_at = Utc::now();
        let records: Vec<TenderRecord> = drafts
            .into_iter()
            .map(|draft| new_record(draft, created_at))
            .collect();

        let mut tx = self.pool.begin().await?;
        for record in &records {
            insert_record(&mut *tx, record).await?;
        }
        tx.commit().await?;

        info!("Inserted batch of {} tenders", records.len());
        Ok(records)
    }

    async fn list(&self) -> Result<Vec<TenderRecord>, AppError> {
        let rows = sqlx::query_as::<_, TenderRow>(&format!(
            "SELECT {RETURNING_COLUMNS} FROM tenders ORDER BY created_at DESC, seq ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TenderRecord::from).collect())
    }

    async fn replace(
        &self,
        id: Uuid,
        draft: NewTender,
    ) -> Result<Option<TenderRecord>, AppError> {
        let created_at: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT created_at FROM tenders WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(created_at) = created_at else {
            return Ok(None);
        };

        let record = TenderRecord::from_new(id, draft, created_at);
        let row = sqlx::query_as::<_, TenderRow>(&format!(
            r#"
            UPDATE tenders SET
                name = $2, origin = $3, destination = $4, transport_type = $5, weight = $6,
                pallets = $7, cubes = $8, places = $9, capacity = $10, price = $11,
                carrier_price = $12, status = $13, comment = $14, tender_date = $15
            WHERE id = $1
            RETURNING {RETURNING_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.origin)
        .bind(&record.destination)
        .bind(&record.transport_type)
        .bind(&record.weight)
        .bind(&record.pallets)
        .bind(&record.cubes)
        .bind(&record.places)
        .bind(&record.capacity)
        .bind(record.price)
        .bind(record.carrier_price)
        .bind(record.status.as_str())
        .bind(&record.comment)
        .bind(record.date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TenderRecord::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tenders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tenders")
            .execute(&self.pool)
            .await?;
        info!("Cleared {} tenders", result.rows_affected());
        Ok(result.rows_affected())
    }
}
