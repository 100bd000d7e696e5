use thiserror::Error;

use crate::storage::StorageError;

/// Failures reported by the record stores.
///
/// Lookup, duplicate and availability failures are ordinary results so the
/// reservation flow can branch on them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} '{id}' already exists")]
    DuplicateKey { entity: &'static str, id: String },
    #[error("no available rooms in hotel '{0}'")]
    NoAvailability(String),
    #[error("all rooms already available in hotel '{0}'")]
    AlreadyFull(String),
    #[error("customer '{0}' not found")]
    CustomerNotFound(String),
    #[error("hotel '{0}' not found")]
    HotelNotFound(String),
    #[error("no unused reservation id after {0} attempts")]
    IdExhausted(u32),
    #[error("storage write failed: {0}")]
    StorageWriteFailed(#[from] StorageError),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    pub fn duplicate(entity: &'static str, id: &str) -> Self {
        Self::DuplicateKey { entity, id: id.to_string() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StoreError::NotFound { .. } => 2001,
            StoreError::DuplicateKey { .. } => 2002,
            StoreError::NoAvailability(_) => 2101,
            StoreError::AlreadyFull(_) => 2102,
            StoreError::CustomerNotFound(_) => 2201,
            StoreError::HotelNotFound(_) => 2202,
            StoreError::IdExhausted(_) => 2203,
            StoreError::StorageWriteFailed(_) => 2300,
            StoreError::Model(_) => 2400,
        }
    }
}
