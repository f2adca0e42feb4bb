//! Tender Store: the sole authority over tender records.
//!
//! `AppState` holds an `Arc<dyn TenderStore>`. The backend is picked at startup:
//! `PgTenderStore` when `DATABASE_URL` is set, `InMemoryTenderStore` otherwise.
//!
//! Records are never edited field by field. `replace` swaps the whole record
//! while keeping its id and creation time.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tender::{NewTender, TenderRecord};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTenderStore;
pub use postgres::PgTenderStore;

#[async_trait]
pub trait TenderStore: Send + Sync {
    /// Inserts one draft and returns it with its assigned id.
    async fn create(&self, draft: NewTender) -> Result<TenderRecord, AppError>;

    /// Inserts a batch. The batch keeps its own order and lands ahead of older records.
    async fn create_many(&self, drafts: Vec<NewTender>) -> Result<Vec<TenderRecord>, AppError>;

    /// All records, most recent first.
    async fn list(&self) -> Result<Vec<TenderRecord>, AppError>;

    /// Replaces a record wholesale. `None` when the id is unknown.
    async fn replace(&self, id: Uuid, draft: NewTender)
        -> Result<Option<TenderRecord>, AppError>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Removes every record and returns how many were removed.
    async fn clear(&self) -> Result<u64, AppError>;
}
