use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;

use super::snapshot::{Record, Snapshot, SnapshotPort, StorageError};

/// Snapshot held in process memory, for tests and throwaway setups.
///
/// Reads and writes can be made to fail on demand to exercise the
/// recovery and compensation paths of the stores.
pub struct InMemorySnapshot<V> {
    data: Mutex<Snapshot<V>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl<V: Record> InMemorySnapshot<V> {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Snapshot::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Start with `records` already stored, keyed by [`Record::key`].
    pub fn with_records(records: impl IntoIterator<Item = V>) -> Self {
        let port = Self::new();
        if let Ok(mut data) = port.data.lock() {
            data.extend(records.into_iter().map(|r| (r.key().to_string(), r)));
        }
        port
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of what is currently stored, bypassing the failure switches.
    pub fn stored(&self) -> Snapshot<V> {
        self.data.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl<V: Record> Default for InMemorySnapshot<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V: Record> SnapshotPort<V> for InMemorySnapshot<V> {
    fn resource(&self) -> String {
        format!("memory:{}", V::ENTITY)
    }

    async fn read(&self) -> Result<Snapshot<V>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unreadable { resource: self.resource(), reason: "injected read failure".into() });
        }
        self.data
            .lock()
            .map(|d| d.clone())
            .map_err(|_| StorageError::Unreadable { resource: self.resource(), reason: "lock poisoned".into() })
    }

    async fn write(&self, snapshot: &Snapshot<V>) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed { resource: self.resource(), reason: "injected write failure".into() });
        }
        let mut data = self
            .data
            .lock()
            .map_err(|_| StorageError::WriteFailed { resource: self.resource(), reason: "lock poisoned".into() })?;
        *data = snapshot.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
