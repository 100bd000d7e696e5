//! Environment/runtime helpers
//!
//! Sanity checks to ensure the snapshot directory exists at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the data directory exists, creating it (and parents) if needed.
///
/// A path that exists but is not a directory is an error: snapshot files
/// could never be written below it.
pub async fn ensure_data_dir<P: AsRef<Path>>(data_dir: P) -> anyhow::Result<()> {
    let data_dir = data_dir.as_ref();
    match tokio::fs::metadata(data_dir).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(anyhow::anyhow!("{} exists but is not a directory", data_dir.display()));
        }
        Err(_) => warn!(data_dir = %data_dir.display(), "data directory missing; creating it"),
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), "data directory created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directory() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("common_env_{}", uuid::Uuid::new_v4())).join("data");
        ensure_data_dir(&dir).await?;
        assert!(tokio::fs::metadata(&dir).await?.is_dir());

        // second call is a no-op
        ensure_data_dir(&dir).await?;
        let _ = tokio::fs::remove_dir_all(dir.parent().unwrap()).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_regular_file() -> anyhow::Result<()> {
        let file = std::env::temp_dir().join(format!("common_env_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&file, b"{}").await?;
        assert!(ensure_data_dir(&file).await.is_err());
        let _ = tokio::fs::remove_file(&file).await;
        Ok(())
    }
}
