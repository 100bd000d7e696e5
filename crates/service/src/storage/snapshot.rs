use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, warn};

use crate::errors::StoreError;

/// Whole dataset of one store, keyed by record id.
pub type Snapshot<V> = BTreeMap<String, V>;

/// A record kept in a snapshot.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Entity name used in errors and diagnostics ("customer", "hotel", ...).
    const ENTITY: &'static str;

    /// The key this record is stored under.
    fn key(&self) -> &str;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot read {resource}: {reason}")]
    Unreadable { resource: String, reason: String },
    #[error("{resource} has invalid format: {reason}")]
    InvalidFormat { resource: String, reason: String },
    #[error("cannot write {resource}: {reason}")]
    WriteFailed { resource: String, reason: String },
}

/// Persistence collaborator for one entity type.
///
/// `read` returns an empty snapshot when nothing has been stored yet.
/// `write` replaces the stored snapshot and creates whatever container it
/// needs (a directory for files).
#[async_trait]
pub trait SnapshotPort<V: Record>: Send + Sync {
    /// Human-readable location, used in diagnostics.
    fn resource(&self) -> String;
    async fn read(&self) -> Result<Snapshot<V>, StorageError>;
    async fn write(&self, snapshot: &Snapshot<V>) -> Result<(), StorageError>;
}

/// Load-mutate-save helper around a [`SnapshotPort`].
///
/// Holds a lock for the whole cycle so two operations on the same store in
/// one process never interleave.
pub struct SnapshotTable<V: Record> {
    port: Arc<dyn SnapshotPort<V>>,
    lock: Mutex<()>,
}

/// A loaded snapshot with the table lock held until it is committed or dropped.
pub struct LockedSnapshot<'a, V: Record> {
    table: &'a SnapshotTable<V>,
    _guard: MutexGuard<'a, ()>,
    pub data: Snapshot<V>,
}

impl<V: Record> SnapshotTable<V> {
    pub fn new(port: Arc<dyn SnapshotPort<V>>) -> Self {
        Self { port, lock: Mutex::new(()) }
    }

    pub fn resource(&self) -> String {
        self.port.resource()
    }

    /// Read the current snapshot. Unreadable or malformed data is reported
    /// and treated as an empty dataset.
    async fn load(&self) -> Snapshot<V> {
        match self.port.read().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(entity = V::ENTITY, error = %e, "snapshot unusable; starting fresh");
                Snapshot::new()
            }
        }
    }

    /// Lock the table and load the snapshot for mutation.
    pub async fn begin(&self) -> LockedSnapshot<'_, V> {
        let guard = self.lock.lock().await;
        let data = self.load().await;
        LockedSnapshot { table: self, _guard: guard, data }
    }

    /// Run `f` against a freshly loaded snapshot without writing anything back.
    pub async fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&Snapshot<V>) -> T,
    {
        let locked = self.begin().await;
        f(&locked.data)
    }

    /// Load, apply `f`, save. If `f` fails nothing is written. A failed save
    /// is logged and the result of `f` is still returned.
    pub async fn update_map<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Snapshot<V>) -> Result<T, StoreError>,
    {
        let mut locked = self.begin().await;
        let out = f(&mut locked.data)?;
        let _ = locked.commit().await;
        Ok(out)
    }

    /// Like [`update_map`](Self::update_map) but a failed save is returned
    /// as [`StoreError::StorageWriteFailed`].
    pub async fn try_update_map<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Snapshot<V>) -> Result<T, StoreError>,
    {
        let mut locked = self.begin().await;
        let out = f(&mut locked.data)?;
        locked.commit().await?;
        Ok(out)
    }
}

impl<V: Record> LockedSnapshot<'_, V> {
    /// Write the snapshot back and release the lock. Failures are logged
    /// here; callers choose whether to escalate them.
    pub async fn commit(self) -> Result<(), StorageError> {
        match self.table.port.write(&self.data).await {
            Ok(()) => {
                debug!(entity = V::ENTITY, records = self.data.len(), "snapshot saved");
                Ok(())
            }
            Err(e) => {
                error!(entity = V::ENTITY, error = %e, "snapshot save failed; change not persisted");
                Err(e)
            }
        }
    }
}
