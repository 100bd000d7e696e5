use async_trait::async_trait;

/// Read-only customer lookup used for referential checks.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn customer_exists(&self, customer_id: &str) -> bool;
}
