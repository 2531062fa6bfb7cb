use crate::error::{AppError, Result};
use crate::models::{LeadId, LeadRecord, LeadUpdate, NewLead};
use crate::state::store::{not_found, sort_newest_first};
use crate::state::LeadStore;
use async_trait::async_trait;
use chrono::Utc;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

const NEXT_ID_KEY: &[u8] = b"next_id";

/// Persistent lead store using Sled embedded database
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    leads_tree: sled::Tree,
    meta_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(&path).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let leads_tree = db.open_tree("leads").map_err(|e| {
            AppError::Database(format!("Failed to open leads tree: {}", e))
        })?;

        let meta_tree = db.open_tree("meta").map_err(|e| {
            AppError::Database(format!("Failed to open meta tree: {}", e))
        })?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            leads_tree,
            meta_tree,
        })
    }

    /// Serialize lead to bytes
    fn serialize_lead(lead: &LeadRecord) -> Result<Vec<u8>> {
        bincode::serialize(lead).map_err(|e| {
            AppError::Serialization(format!("Failed to serialize lead: {}", e))
        })
    }

    /// Deserialize lead from bytes
    fn deserialize_lead(bytes: &[u8]) -> Result<LeadRecord> {
        bincode::deserialize(bytes).map_err(|e| {
            AppError::Serialization(format!("Failed to deserialize lead: {}", e))
        })
    }

    /// Big-endian keys keep the tree in id order
    fn lead_key(id: LeadId) -> [u8; 8] {
        id.to_be_bytes()
    }

    /// Atomically reserve the next auto-increment id, starting at 1
    fn reserve_id(&self) -> Result<LeadId> {
        let updated = self
            .meta_tree
            .update_and_fetch(NEXT_ID_KEY, |current| {
                let next = current.map(decode_counter).unwrap_or(1).saturating_add(1);
                Some(next.to_be_bytes().to_vec())
            })
            .map_err(|e| AppError::Database(format!("Failed to reserve lead id: {}", e)))?
            .ok_or_else(|| AppError::Internal("Lead id counter vanished".to_string()))?;

        Ok(decode_counter(&updated) - 1)
    }

    /// Insert a record verbatim, keeping its id and status
    pub fn insert_record(&self, record: &LeadRecord) -> Result<()> {
        let value = Self::serialize_lead(record)?;
        self.leads_tree.insert(Self::lead_key(record.id), value)?;

        let floor = record.id.saturating_add(1);
        self.meta_tree.fetch_and_update(NEXT_ID_KEY, |current| {
            let next = current.map(decode_counter).unwrap_or(1).max(floor);
            Some(next.to_be_bytes().to_vec())
        })?;

        self.flush_trees()
    }

    fn flush_trees(&self) -> Result<()> {
        self.leads_tree.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush leads tree: {}", e))
        })?;
        self.meta_tree.flush().map_err(|e| {
            AppError::Database(format!("Failed to flush meta tree: {}", e))
        })?;
        Ok(())
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await.map_err(|e| {
            AppError::Database(format!("Failed to flush database: {}", e))
        })?;
        Ok(())
    }

    /// Get database size in bytes
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db.size_on_disk().map_err(|e| {
            AppError::Database(format!("Failed to get database size: {}", e))
        })
    }
}

fn decode_counter(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = bytes.len().min(8);
    buf[8 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    u64::from_be_bytes(buf)
}

#[async_trait]
impl LeadStore for SledStore {
    async fn create_lead(&self, lead: NewLead) -> Result<LeadRecord> {
        let id = self.reserve_id()?;
        let record = LeadRecord::from_new(id, lead, Utc::now());
        let value = Self::serialize_lead(&record)?;

        self.leads_tree.insert(Self::lead_key(id), value).map_err(|e| {
            AppError::Database(format!("Failed to save lead: {}", e))
        })?;

        // Flush to ensure durability
        self.flush_trees()?;

        tracing::debug!(lead_id = id, "Lead saved to Sled");
        Ok(record)
    }

    async fn get_lead(&self, id: LeadId) -> Result<Option<LeadRecord>> {
        match self.leads_tree.get(Self::lead_key(id)) {
            Ok(Some(bytes)) => Ok(Some(Self::deserialize_lead(&bytes)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Database(format!("Failed to get lead: {}", e))),
        }
    }

    async fn update_lead(&self, id: LeadId, update: LeadUpdate) -> Result<LeadRecord> {
        let mut record = self.get_lead(id).await?.ok_or_else(|| not_found(id))?;
        record.apply(update);

        let value = Self::serialize_lead(&record)?;
        self.leads_tree.insert(Self::lead_key(id), value).map_err(|e| {
            AppError::Database(format!("Failed to update lead: {}", e))
        })?;

        self.flush_trees()?;

        tracing::debug!(lead_id = id, status = %record.status, "Lead updated in Sled");
        Ok(record)
    }

    async fn delete_lead(&self, id: LeadId) -> Result<()> {
        let removed = self.leads_tree.remove(Self::lead_key(id)).map_err(|e| {
            AppError::Database(format!("Failed to delete lead: {}", e))
        })?;

        if removed.is_none() {
            return Err(not_found(id));
        }

        self.flush_trees()?;

        tracing::debug!(lead_id = id, "Lead deleted from Sled");
        Ok(())
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>> {
        let mut leads = Vec::with_capacity(self.leads_tree.len());

        for result in self.leads_tree.iter() {
            let (_, value) = result.map_err(|e| {
                AppError::Database(format!("Failed to iterate leads: {}", e))
            })?;
            leads.push(Self::deserialize_lead(&value)?);
        }

        sort_newest_first(&mut leads);
        Ok(leads)
    }

    async fn count_leads(&self) -> Result<u64> {
        Ok(self.leads_tree.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadStatus, DEFAULT_SOURCE};
    use tempfile::TempDir;

    fn create_test_store() -> (SledStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SledStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get_lead() {
        let (store, _temp_dir) = create_test_store();

        let first = store
            .create_lead(NewLead::new("Ada", "ada@example.com", "Hi"))
            .await
            .unwrap();
        let second = store
            .create_lead(NewLead::new("Grace", "grace@example.com", ""))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.source, DEFAULT_SOURCE);

        let retrieved = store.get_lead(first.id).await.unwrap().unwrap();
        assert_eq!(retrieved, first);
    }

    #[tokio::test]
    async fn test_update_and_delete_lead() {
        let (store, _temp_dir) = create_test_store();
        let lead = store
            .create_lead(NewLead::new("Ada", "ada@example.com", ""))
            .await
            .unwrap();

        let updated = store
            .update_lead(
                lead.id,
                LeadUpdate {
                    status: LeadStatus::Converted,
                    notes: "closed".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), Some(LeadStatus::Converted));

        store.delete_lead(lead.id).await.unwrap();
        assert!(store.get_lead(lead.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_lead(lead.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ids_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let store = SledStore::new(temp_dir.path()).unwrap();
            store
                .create_lead(NewLead::new("Ada", "ada@example.com", ""))
                .await
                .unwrap();
            store.flush().await.unwrap();
        }

        let store = SledStore::new(temp_dir.path()).unwrap();
        assert_eq!(store.count_leads().await.unwrap(), 1);
        let next = store
            .create_lead(NewLead::new("Grace", "grace@example.com", ""))
            .await
            .unwrap();
        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_seeding_max_id() {
        let (store, _temp_dir) = create_test_store();
        let record = LeadRecord::from_new(
            u64::MAX,
            NewLead::new("Last", "last@example.com", ""),
            Utc::now(),
        );

        store.insert_record(&record).unwrap();
        assert_eq!(store.get_lead(u64::MAX).await.unwrap(), Some(record));
    }

    #[test]
    fn test_decode_counter() {
        assert_eq!(decode_counter(&7u64.to_be_bytes()), 7);
        assert_eq!(decode_counter(&[]), 0);
    }
}
