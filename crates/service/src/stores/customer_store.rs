use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{Customer, CustomerPatch};
use tracing::{debug, info, instrument};

use crate::errors::StoreError;
use crate::pagination::Pagination;
use crate::ports::CustomerDirectory;
use crate::storage::{JsonFileSnapshot, Record, SnapshotPort, SnapshotTable};

impl Record for Customer {
    const ENTITY: &'static str = "customer";
    fn key(&self) -> &str { &self.customer_id }
}

/// Customer records, one snapshot per store.
pub struct CustomerStore {
    table: SnapshotTable<Customer>,
}

impl CustomerStore {
    pub fn new(port: Arc<dyn SnapshotPort<Customer>>) -> Self {
        Self { table: SnapshotTable::new(port) }
    }

    /// File-backed store; the file is created on first write.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(Arc::new(JsonFileSnapshot::new(path)))
    }

    /// Create and persist a new customer.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Customer;
    /// use service::{storage::InMemorySnapshot, stores::CustomerStore};
    /// let store = CustomerStore::new(Arc::new(InMemorySnapshot::<Customer>::new()));
    /// let c = tokio_test::block_on(store.create("C1", "Alice", "alice@mail.com", "123")).unwrap();
    /// assert_eq!(c.name, "Alice");
    /// assert!(tokio_test::block_on(store.create("C1", "Bob", "bob@mail.com", "456")).is_err());
    /// ```
    #[instrument(skip(self, name, email, phone))]
    pub async fn create(&self, customer_id: &str, name: &str, email: &str, phone: &str) -> Result<Customer, StoreError> {
        models::validate_id(Customer::ENTITY, customer_id)?;
        let customer = self
            .table
            .update_map(|map| {
                if map.contains_key(customer_id) {
                    debug!("customer exists");
                    return Err(StoreError::duplicate(Customer::ENTITY, customer_id));
                }
                let customer = Customer::new(customer_id, name, email, phone);
                map.insert(customer_id.to_string(), customer.clone());
                Ok(customer)
            })
            .await?;
        info!(%customer_id, "customer_created");
        Ok(customer)
    }

    /// Remove a customer. Reservations referencing it are left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, customer_id: &str) -> Result<Customer, StoreError> {
        let removed = self
            .table
            .update_map(|map| map.remove(customer_id).ok_or_else(|| StoreError::not_found(Customer::ENTITY, customer_id)))
            .await?;
        info!(%customer_id, "customer_deleted");
        Ok(removed)
    }

    pub async fn get(&self, customer_id: &str) -> Result<Customer, StoreError> {
        self.table
            .read(|map| map.get(customer_id).cloned())
            .await
            .ok_or_else(|| StoreError::not_found(Customer::ENTITY, customer_id))
    }

    /// Overwrite the fields present in `patch` and return the updated record.
    /// A patch that changes nothing is not written.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, customer_id: &str, patch: CustomerPatch) -> Result<Customer, StoreError> {
        let mut locked = self.table.begin().await;
        let existing = locked
            .data
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::not_found(Customer::ENTITY, customer_id))?;
        if !existing.apply(patch) {
            debug!("customer unchanged");
            return Ok(existing.clone());
        }
        let updated = existing.clone();
        let _ = locked.commit().await;
        info!(%customer_id, "customer_updated");
        Ok(updated)
    }

    pub async fn exists(&self, customer_id: &str) -> bool {
        self.table.read(|map| map.contains_key(customer_id)).await
    }

    /// One page of customers ordered by id.
    pub async fn list(&self, page: Pagination) -> Vec<Customer> {
        self.table.read(|map| page.apply(map.values().cloned())).await
    }

    pub async fn count(&self) -> usize {
        self.table.read(|map| map.len()).await
    }
}

#[async_trait]
impl CustomerDirectory for CustomerStore {
    async fn customer_exists(&self, customer_id: &str) -> bool { self.exists(customer_id).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySnapshot;

    fn store() -> (Arc<InMemorySnapshot<Customer>>, CustomerStore) {
        let port = Arc::new(InMemorySnapshot::<Customer>::new());
        (port.clone(), CustomerStore::new(port))
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() -> Result<(), anyhow::Error> {
        let (_, store) = store();
        let created = store.create("C1", "Alice", "alice@mail.com", "123").await?;
        assert_eq!(created, Customer::new("C1", "Alice", "alice@mail.com", "123"));
        assert_eq!(store.get("C1").await?, created);
        assert!(store.exists("C1").await);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_keeps_original() -> Result<(), anyhow::Error> {
        let (port, store) = store();
        store.create("C1", "Alice", "alice@mail.com", "123").await?;
        let err = store.create("C1", "Mallory", "m@mail.com", "999").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { entity: "customer", .. }));
        assert_eq!(store.get("C1").await?.name, "Alice");
        assert_eq!(port.writes(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn empty_id_is_rejected() {
        let (port, store) = store();
        let err = store.create(" ", "Alice", "alice@mail.com", "123").await.unwrap_err();
        assert!(matches!(err, StoreError::Model(_)));
        assert_eq!(port.writes(), 0);
    }

    #[tokio::test]
    async fn delete_removes_and_missing_id_fails_without_write() -> Result<(), anyhow::Error> {
        let (port, store) = store();
        store.create("C1", "Alice", "alice@mail.com", "123").await?;
        let removed = store.delete("C1").await?;
        assert_eq!(removed.customer_id, "C1");
        assert!(matches!(store.get("C1").await, Err(StoreError::NotFound { .. })));

        let writes = port.writes();
        assert!(matches!(store.delete("C1").await, Err(StoreError::NotFound { .. })));
        assert_eq!(port.writes(), writes);
        Ok(())
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() -> Result<(), anyhow::Error> {
        let (_, store) = store();
        store.create("C1", "Alice", "alice@mail.com", "123").await?;

        let updated = store.update("C1", CustomerPatch::from_form("Alicia", "", "")).await?;
        assert_eq!(updated.name, "Alicia");
        assert_eq!(updated.email, "alice@mail.com");

        store.update("C1", CustomerPatch { phone: Some("555".into()), ..Default::default() }).await?;
        let c = store.get("C1").await?;
        assert_eq!((c.name.as_str(), c.phone.as_str()), ("Alicia", "555"));

        let err = store.update("NOPE", CustomerPatch::from_form("x", "", "")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn unchanged_update_skips_the_write() -> Result<(), anyhow::Error> {
        let (port, store) = store();
        store.create("C1", "Alice", "alice@mail.com", "123").await?;
        assert_eq!(port.writes(), 1);

        let same = store.update("C1", CustomerPatch::from_form("Alice", "", "")).await?;
        assert_eq!(same.name, "Alice");
        store.update("C1", CustomerPatch::default()).await?;
        assert_eq!(port.writes(), 1);

        store.update("C1", CustomerPatch::from_form("", "", "999")).await?;
        assert_eq!(port.writes(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn list_is_ordered_and_paged() -> Result<(), anyhow::Error> {
        let (_, store) = store();
        for id in ["C3", "C1", "C2"] {
            store.create(id, "n", "e", "p").await?;
        }
        let ids: Vec<String> = store.list(Pagination::default()).await.into_iter().map(|c| c.customer_id).collect();
        assert_eq!(ids, ["C1", "C2", "C3"]);
        assert_eq!(store.list(Pagination { page: 2, per_page: 2 }).await.len(), 1);
        assert_eq!(store.count().await, 3);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_still_returns_created_record() -> Result<(), anyhow::Error> {
        let (port, store) = store();
        port.fail_writes(true);
        let created = store.create("C1", "Alice", "alice@mail.com", "123").await?;
        assert_eq!(created.customer_id, "C1");
        assert!(!store.exists("C1").await);
        Ok(())
    }
}
