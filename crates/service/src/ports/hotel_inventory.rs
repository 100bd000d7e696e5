use async_trait::async_trait;

use crate::errors::StoreError;

/// Trait abstraction for room inventory.
///
/// `reserve_room` fails with `NoAvailability` when no room is free and
/// `cancel_room` with `AlreadyFull` when every room is already free; both
/// fail with `NotFound` for an unknown hotel.
#[async_trait]
pub trait HotelInventory: Send + Sync {
    async fn hotel_exists(&self, hotel_id: &str) -> bool;
    async fn reserve_room(&self, hotel_id: &str) -> Result<(), StoreError>;
    async fn cancel_room(&self, hotel_id: &str) -> Result<(), StoreError>;
}
