use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::tender::{NewTender, TenderRecord};
use crate::store::TenderStore;

/// Process-local store. Used when no database is configured, and in tests.
/// Records are kept most-recent-first so `list` is a plain clone.
#[derive(Default)]
pub struct InMemoryTenderStore {
    records: RwLock<Vec<TenderRecord>>,
}

impl InMemoryTenderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenderStore for InMemoryTenderStore {
    async fn create(&self, draft: NewTender) -> Result<TenderRecord, AppError> {
        let record = TenderRecord::from_new(Uuid::new_v4(), draft, Utc::now());
        self.records.write().await.insert(0, record.clone());
        Ok(record)
    }

    async fn create_many(&self, drafts: Vec<NewTender>) -> Result<Vec<TenderRecord>, AppError> {
        let created_at = Utc::now();
        let batch: Vec<TenderRecord> = drafts
            .into_iter()
            .map(|draft| TenderRecord::from_new(Uuid::new_v4(), draft, created_at))
            .collect();

        let mut records = self.records.write().await;
        records.splice(0..0, batch.iter().cloned());
        Ok(batch)
    }

    async fn list(&self) -> Result<Vec<TenderRecord>, AppError> {
        Ok(self.records.read().await.clone())
    }

    async fn replace(
        &self,
        id: Uuid,
        draft: NewTender,
    ) -> Result<Option<TenderRecord>, AppError> {
        let mut records = self.records.write().await;
        let Some(slot) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        *slot = TenderRecord::from_new(id, draft, slot.created_at);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() < before)
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let removed = records.len() as u64;
        records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tender::TenderStatus;

    fn draft(origin: &str, price: f64) -> NewTender {
        NewTender {
            origin: origin.to_string(),
            destination: "Алматы".to_string(),
            price: Some(price),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_list_delete_round_trip() {
        let store = InMemoryTenderStore::new();
        let created = store.create(draft("Астана", 250000.0)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert!(listed.iter().any(|r| r.id == created.id));

        assert!(store.delete(created.id).await.unwrap());
        let listed = store.list().await.unwrap();
        assert!(listed.iter().all(|r| r.id != created.id));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_returns_false() {
        let store = InMemoryTenderStore::new();
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first() {
        let store = InMemoryTenderStore::new();
        let first = store.create(draft("Шымкент", 1.0)).await.unwrap();
        let second = store.create(draft("Караганда", 2.0)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_ahead_of_older_records() {
        let store = InMemoryTenderStore::new();
        let older = store.create(draft("Актобе", 1.0)).await.unwrap();
        let batch = store
            .create_many(vec![draft("Тараз", 2.0), draft("Костанай", 3.0)])
            .await
            .unwrap();

        let origins: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.origin)
            .collect();
        assert_eq!(origins, vec!["Тараз", "Костанай", "Актобе"]);
        assert_eq!(batch.len(), 2);
        assert_ne!(batch[0].id, older.id);
    }

    #[tokio::test]
    async fn test_replace_keeps_identity() {
        let store = InMemoryTenderStore::new();
        let created = store.create(draft("Павлодар", 100.0)).await.unwrap();

        let mut updated = draft("Павлодар", 120.0);
        updated.status = TenderStatus::Won;
        let replaced = store.replace(created.id, updated).await.unwrap().unwrap();

        assert_eq!(replaced.id, created.id);
        assert_eq!(replaced.created_at, created.created_at);
        assert_eq!(replaced.price, Some(120.0));
        assert_eq!(replaced.status, TenderStatus::Won);
        assert!(store.replace(Uuid::new_v4(), draft("x", 1.0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_reports_removed_count() {
        let store = InMemoryTenderStore::new();
        store
            .create_many(vec![draft("a", 1.0), draft("b", 2.0), draft("c", 3.0)])
            .await
            .unwrap();
        assert_eq!(store.clear().await.unwrap(), 3);
        assert!(store.list().await.unwrap().is_empty());
    }
}
