//! Record stores for a small hotel booking system.
//! - Customers, hotels and reservations each live in one JSON snapshot.
//! - Reservation creation and cancellation keep hotel room counts in step.
//! - Persistence sits behind `storage::SnapshotPort` so tests run in memory.

pub mod errors;
pub mod ids;
pub mod pagination;
pub mod ports;
pub mod runtime;
pub mod storage;
pub mod stores;
