use crate::error::{AppError, Result};
use crate::models::{LeadId, LeadRecord, LeadUpdate, NewLead};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trait for lead storage operations
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Insert a new lead with status `New` and the default source
    async fn create_lead(&self, lead: NewLead) -> Result<LeadRecord>;

    /// Get a lead by ID
    async fn get_lead(&self, id: LeadId) -> Result<Option<LeadRecord>>;

    /// Replace status and notes of a lead
    async fn update_lead(&self, id: LeadId, update: LeadUpdate) -> Result<LeadRecord>;

    /// Delete a lead
    async fn delete_lead(&self, id: LeadId) -> Result<()>;

    /// Snapshot of every lead, newest first
    async fn list_leads(&self) -> Result<Vec<LeadRecord>>;

    /// Number of stored leads
    async fn count_leads(&self) -> Result<u64>;
}

/// Newest first; ties broken by descending id so the order is total
pub fn sort_newest_first(leads: &mut [LeadRecord]) {
    leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

pub(crate) fn not_found(id: LeadId) -> AppError {
    AppError::NotFound(format!("Lead {} not found", id))
}

/// In-memory lead store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    leads: Arc<DashMap<LeadId, LeadRecord>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            leads: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Insert a record verbatim, keeping its id and status.
    ///
    /// Used to seed snapshots, including rows that would fail aggregation.
    pub fn insert_record(&self, record: LeadRecord) {
        self.next_id
            .fetch_max(record.id.saturating_add(1), Ordering::SeqCst);
        self.leads.insert(record.id, record);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LeadStore for InMemoryStore {
    async fn create_lead(&self, lead: NewLead) -> Result<LeadRecord> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = LeadRecord::from_new(id, lead, Utc::now());
        self.leads.insert(id, record.clone());

        tracing::debug!(lead_id = id, "Lead created");
        Ok(record)
    }

    async fn get_lead(&self, id: LeadId) -> Result<Option<LeadRecord>> {
        Ok(self.leads.get(&id).map(|entry| entry.clone()))
    }

    async fn update_lead(&self, id: LeadId, update: LeadUpdate) -> Result<LeadRecord> {
        let mut entry = self.leads.get_mut(&id).ok_or_else(|| not_found(id))?;
        entry.apply(update);

        tracing::debug!(lead_id = id, status = %entry.status, "Lead updated");
        Ok(entry.clone())
    }

    async fn delete_lead(&self, id: LeadId) -> Result<()> {
        if self.leads.remove(&id).is_some() {
            tracing::debug!(lead_id = id, "Lead deleted");
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    async fn list_leads(&self) -> Result<Vec<LeadRecord>> {
        let mut leads: Vec<LeadRecord> = self
            .leads
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sort_newest_first(&mut leads);
        Ok(leads)
    }

    async fn count_leads(&self) -> Result<u64> {
        Ok(self.leads.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadStatus, DEFAULT_SOURCE};
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_create_and_get_lead() {
        let store = InMemoryStore::new();

        let created = store
            .create_lead(NewLead::new("Ada", "ada@example.com", "Hello"))
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.source, DEFAULT_SOURCE);
        assert_eq!(created.status(), Some(LeadStatus::New));

        let retrieved = store.get_lead(created.id).await.unwrap();
        assert_eq!(retrieved, Some(created));
    }

    #[tokio::test]
    async fn test_update_lead() {
        let store = InMemoryStore::new();
        let lead = store
            .create_lead(NewLead::new("Ada", "ada@example.com", ""))
            .await
            .unwrap();

        let updated = store
            .update_lead(
                lead.id,
                LeadUpdate {
                    status: LeadStatus::Contacted,
                    notes: "called back".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status(), Some(LeadStatus::Contacted));
        assert_eq!(updated.notes, "called back");
        assert_eq!(updated.created_at, lead.created_at);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = InMemoryStore::new();
        let update = LeadUpdate {
            status: LeadStatus::Converted,
            notes: String::new(),
        };
        assert!(matches!(
            store.update_lead(42, update).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(store.delete_lead(42).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_seeding_max_id() {
        let store = InMemoryStore::new();
        store.insert_record(LeadRecord {
            id: u64::MAX,
            name: "Last".to_string(),
            email: "last@example.com".to_string(),
            source: DEFAULT_SOURCE.to_string(),
            status: "New".to_string(),
            notes: String::new(),
            created_at: Utc::now(),
        });

        assert!(store.get_lead(u64::MAX).await.unwrap().is_some());
        assert_eq!(store.count_leads().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryStore::new();
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        for (id, offset) in [(1u64, 0i64), (2, 2), (3, 1)] {
            store.insert_record(LeadRecord {
                id,
                name: format!("Lead {}", id),
                email: format!("lead{}@example.com", id),
                source: DEFAULT_SOURCE.to_string(),
                status: "New".to_string(),
                notes: String::new(),
                created_at: base + Duration::hours(offset),
            });
        }

        let ids: Vec<_> = store.list_leads().await.unwrap().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        // seeded ids advance the counter
        let next = store
            .create_lead(NewLead::new("Next", "next@example.com", ""))
            .await
            .unwrap();
        assert_eq!(next.id, 4);
    }
}
