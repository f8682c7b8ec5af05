//! The plan registry: `(field, merchant, provider)` → plan entry, plus the
//! merchant-keyed reverse index, both maintained in lockstep.
//!
//! The registry sits behind [`PlanStore`] so a durable backend with real
//! conditional writes can replace the in-memory implementation without
//! touching the processing logic.

use std::collections::{HashMap, HashSet};

use error_stack::report;
use fieldpay_types::plans::{MerchantKey, PlanKey, PlanRegistryEntry};
use fieldpay_utils::errors::CustomResult;
use tokio::sync::Mutex;

/// Errors from the plan registry backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A conditional insert found an entry already present for the key.
    #[error("an entry already exists for the given plan key")]
    DuplicateEntry,
    /// The backend failed.
    #[error("plan store backend error")]
    Backend,
}

/// Keyed storage for plan registry entries.
///
/// Implementations must keep the reverse index consistent with the entry map:
/// every indexed plan id has an entry and vice versa.
#[async_trait::async_trait]
pub trait PlanStore: Send + Sync {
    /// Conditional write: stores the entry only if the key is vacant.
    async fn insert_if_absent(
        &self,
        key: &PlanKey,
        entry: PlanRegistryEntry,
    ) -> CustomResult<(), StorageError>;

    /// Stores the entry, replacing (and unlinking) any previous one.
    async fn upsert(&self, key: &PlanKey, entry: PlanRegistryEntry)
        -> CustomResult<(), StorageError>;

    /// Looks up the entry for a key.
    async fn find(&self, key: &PlanKey) -> CustomResult<Option<PlanRegistryEntry>, StorageError>;

    /// Removes the entry for a key, unlinking it from the reverse index.
    async fn delete(&self, key: &PlanKey)
        -> CustomResult<Option<PlanRegistryEntry>, StorageError>;

    /// All plan ids currently registered under a merchant.
    async fn plans_for_merchant(
        &self,
        key: &MerchantKey,
    ) -> CustomResult<Vec<String>, StorageError>;
}

#[derive(Debug, Default)]
struct PlanMaps {
    entries: HashMap<PlanKey, PlanRegistryEntry>,
    merchant_index: HashMap<MerchantKey, HashSet<String>>,
}

impl PlanMaps {
    fn link(&mut self, key: PlanKey, entry: PlanRegistryEntry) {
        self.merchant_index
            .entry(key.merchant_key())
            .or_default()
            .insert(entry.plan_id.clone());
        self.entries.insert(key, entry);
    }

    fn unlink(&mut self, key: &PlanKey) -> Option<PlanRegistryEntry> {
        let removed = self.entries.remove(key)?;
        let merchant_key = key.merchant_key();
        if let Some(plan_ids) = self.merchant_index.get_mut(&merchant_key) {
            plan_ids.remove(&removed.plan_id);
            if plan_ids.is_empty() {
                self.merchant_index.remove(&merchant_key);
            }
        }
        Some(removed)
    }
}

/// Process-local [`PlanStore`]: both maps under a single lock, so the
/// lockstep invariant holds across await points.
#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    inner: Mutex<PlanMaps>,
}

impl InMemoryPlanStore {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn insert_if_absent(
        &self,
        key: &PlanKey,
        entry: PlanRegistryEntry,
    ) -> CustomResult<(), StorageError> {
        let mut maps = self.inner.lock().await;
        if maps.entries.contains_key(key) {
            return Err(report!(StorageError::DuplicateEntry));
        }
        maps.link(key.clone(), entry);
        Ok(())
    }

    async fn upsert(
        &self,
        key: &PlanKey,
        entry: PlanRegistryEntry,
    ) -> CustomResult<(), StorageError> {
        let mut maps = self.inner.lock().await;
        maps.unlink(key);
        maps.link(key.clone(), entry);
        Ok(())
    }

    async fn find(&self, key: &PlanKey) -> CustomResult<Option<PlanRegistryEntry>, StorageError> {
        Ok(self.inner.lock().await.entries.get(key).cloned())
    }

    async fn delete(
        &self,
        key: &PlanKey,
    ) -> CustomResult<Option<PlanRegistryEntry>, StorageError> {
        Ok(self.inner.lock().await.unlink(key))
    }

    async fn plans_for_merchant(
        &self,
        key: &MerchantKey,
    ) -> CustomResult<Vec<String>, StorageError> {
        Ok(self
            .inner
            .lock()
            .await
            .merchant_index
            .get(key)
            .map(|plan_ids| plan_ids.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use fieldpay_types::enums::{PaymentProvider, PlanSource, PlanStatus};
    use time::OffsetDateTime;

    use super::*;

    fn entry(plan_id: &str) -> PlanRegistryEntry {
        PlanRegistryEntry {
            plan_id: plan_id.to_owned(),
            product_id: None,
            plan_name: "Pro".to_owned(),
            status: PlanStatus::Active,
            is_existing: false,
            source: PlanSource::FormCreated,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn key(field: &str, merchant: &str) -> PlanKey {
        PlanKey::new(field, merchant, PaymentProvider::Paypal)
    }

    #[tokio::test]
    async fn index_follows_inserts_and_deletes() {
        let store = InMemoryPlanStore::new();
        let merchant = MerchantKey::new("M-1", PaymentProvider::Paypal);

        store
            .insert_if_absent(&key("f1", "M-1"), entry("P-1"))
            .await
            .unwrap();
        store
            .insert_if_absent(&key("f2", "M-1"), entry("P-2"))
            .await
            .unwrap();
        let mut plans = store.plans_for_merchant(&merchant).await.unwrap();
        plans.sort();
        assert_eq!(plans, vec!["P-1".to_owned(), "P-2".to_owned()]);

        store.delete(&key("f1", "M-1")).await.unwrap();
        assert_eq!(
            store.plans_for_merchant(&merchant).await.unwrap(),
            vec!["P-2".to_owned()]
        );
    }

    #[tokio::test]
    async fn conditional_insert_rejects_occupied_keys() {
        let store = InMemoryPlanStore::new();
        store
            .insert_if_absent(&key("f1", "M-1"), entry("P-1"))
            .await
            .unwrap();
        assert!(store
            .insert_if_absent(&key("f1", "M-1"), entry("P-9"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn upsert_unlinks_the_replaced_plan() {
        let store = InMemoryPlanStore::new();
        let merchant = MerchantKey::new("M-1", PaymentProvider::Paypal);

        store.upsert(&key("f1", "M-1"), entry("P-1")).await.unwrap();
        store.upsert(&key("f1", "M-1"), entry("P-2")).await.unwrap();

        assert_eq!(
            store.plans_for_merchant(&merchant).await.unwrap(),
            vec!["P-2".to_owned()]
        );
    }
}
