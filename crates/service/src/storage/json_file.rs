use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::snapshot::{Record, Snapshot, SnapshotPort, StorageError};

/// Entries kept verbatim, keyed by id.
type RawEntries = BTreeMap<String, Value>;

/// One entry of the file as written: a decoded record or a raw value that
/// could not be decoded on the last read.
#[derive(Serialize)]
#[serde(untagged)]
enum Entry<'a, V> {
    Record(&'a V),
    Raw(&'a Value),
}

/// JSON file holding one object keyed by record id.
///
/// Output is indented with four spaces so files stay diff-friendly.
/// Entries that do not decode as records are skipped on read and written
/// back unchanged, so one bad entry never costs the others.
#[derive(Debug)]
pub struct JsonFileSnapshot {
    file_path: PathBuf,
    rejected: Mutex<RawEntries>,
}

impl JsonFileSnapshot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { file_path: path.into(), rejected: Mutex::new(RawEntries::new()) }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    /// Ids of entries skipped by the last read.
    pub fn rejected_ids(&self) -> Vec<String> {
        self.rejected.lock().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }

    fn resource_name(&self) -> String {
        self.file_path.display().to_string()
    }

    fn encode<T: Serialize>(&self, entries: &T) -> Result<Vec<u8>, StorageError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        entries
            .serialize(&mut ser)
            .map_err(|e| StorageError::WriteFailed { resource: self.resource_name(), reason: e.to_string() })?;
        Ok(buf)
    }
}

#[async_trait]
impl<V: Record> SnapshotPort<V> for JsonFileSnapshot {
    fn resource(&self) -> String {
        self.resource_name()
    }

    async fn read(&self) -> Result<Snapshot<V>, StorageError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "snapshot file missing; empty dataset");
                return Ok(Snapshot::new());
            }
            Err(e) => {
                return Err(StorageError::Unreadable { resource: self.resource_name(), reason: e.to_string() })
            }
        };

        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Unreadable { resource: self.resource_name(), reason: e.to_string() })?;
        let Value::Object(entries) = value else {
            return Err(StorageError::InvalidFormat {
                resource: self.resource_name(),
                reason: "expected a JSON object keyed by id".into(),
            });
        };

        let mut snapshot = Snapshot::new();
        let mut rejected = RawEntries::new();
        for (id, raw) in entries {
            match serde_json::from_value::<V>(raw.clone()) {
                Ok(record) => {
                    snapshot.insert(id, record);
                }
                Err(e) => {
                    warn!(path = %self.file_path.display(), %id, error = %e, "entry skipped; kept as-is in file");
                    rejected.insert(id, raw);
                }
            }
        }
        *self.rejected.lock().unwrap_or_else(PoisonError::into_inner) = rejected;
        Ok(snapshot)
    }

    async fn write(&self, snapshot: &Snapshot<V>) -> Result<(), StorageError> {
        let data = {
            let rejected = self.rejected.lock().unwrap_or_else(PoisonError::into_inner);
            let mut entries: BTreeMap<&str, Entry<'_, V>> =
                rejected.iter().map(|(id, raw)| (id.as_str(), Entry::Raw(raw))).collect();
            entries.extend(snapshot.iter().map(|(id, record)| (id.as_str(), Entry::Record(record))));
            self.encode(&entries)?
        };
        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::WriteFailed { resource: self.resource_name(), reason: e.to_string() })?;
        }
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| StorageError::WriteFailed { resource: self.resource_name(), reason: e.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        note_id: String,
        body: String,
    }

    impl Record for Note {
        const ENTITY: &'static str = "note";
        fn key(&self) -> &str { &self.note_id }
    }

    fn tmp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("json_snapshot_{}", Uuid::new_v4())).join(name)
    }

    async fn read_notes(port: &JsonFileSnapshot) -> Result<Snapshot<Note>, StorageError> {
        SnapshotPort::<Note>::read(port).await
    }

    #[tokio::test]
    async fn missing_file_reads_empty_and_write_creates_directory() -> Result<(), anyhow::Error> {
        let path = tmp_path("notes.json");
        let port = JsonFileSnapshot::new(&path);
        assert!(read_notes(&port).await?.is_empty());

        let mut snap = Snapshot::new();
        snap.insert("n1".to_string(), Note { note_id: "n1".into(), body: "hi".into() });
        port.write(&snap).await?;

        let text = tokio::fs::read_to_string(&path).await?;
        assert!(text.contains("\n    \"n1\": {"));
        assert_eq!(read_notes(&port).await?, snap);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_or_non_object_file_is_reported() -> Result<(), anyhow::Error> {
        let path = tmp_path("notes.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        let port = JsonFileSnapshot::new(&path);

        tokio::fs::write(&path, b"{ not json").await?;
        assert!(matches!(read_notes(&port).await, Err(StorageError::Unreadable { .. })));

        tokio::fs::write(&path, b"[1, 2, 3]").await?;
        assert!(matches!(read_notes(&port).await, Err(StorageError::InvalidFormat { .. })));

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn bad_entry_is_skipped_and_written_back() -> Result<(), anyhow::Error> {
        let path = tmp_path("notes.json");
        tokio::fs::create_dir_all(path.parent().unwrap()).await?;
        tokio::fs::write(
            &path,
            br#"{"n1": {"note_id": "n1", "body": "hi"}, "n2": {"note_id": "n2"}, "n3": 7}"#,
        )
        .await?;
        let port = JsonFileSnapshot::new(&path);

        let mut snap = read_notes(&port).await?;
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["n1"]);
        assert_eq!(port.rejected_ids(), vec!["n2".to_string(), "n3".to_string()]);

        snap.insert("n4".to_string(), Note { note_id: "n4".into(), body: "new".into() });
        port.write(&snap).await?;

        let on_disk: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&path).await?)?;
        assert_eq!(on_disk["n1"]["body"], "hi");
        assert_eq!(on_disk["n2"], serde_json::json!({"note_id": "n2"}));
        assert_eq!(on_disk["n3"], 7);
        assert_eq!(on_disk["n4"]["body"], "new");

        // a record written under a skipped id replaces the raw entry
        snap.insert("n2".to_string(), Note { note_id: "n2".into(), body: "fixed".into() });
        port.write(&snap).await?;
        let reread = read_notes(&port).await?;
        assert_eq!(reread["n2"].body, "fixed");
        assert_eq!(port.rejected_ids(), vec!["n3".to_string()]);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_into_unwritable_location_fails() -> Result<(), anyhow::Error> {
        // parent "directory" is a regular file
        let blocker = std::env::temp_dir().join(format!("json_snapshot_blocker_{}", Uuid::new_v4()));
        tokio::fs::write(&blocker, b"x").await?;
        let port = JsonFileSnapshot::new(blocker.join("notes.json"));

        let err = port.write(&Snapshot::<Note>::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed { .. }));

        let _ = tokio::fs::remove_file(&blocker).await;
        Ok(())
    }
}
