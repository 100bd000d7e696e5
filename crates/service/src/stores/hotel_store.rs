use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::{Hotel, HotelPatch};
use tracing::{debug, info, instrument};

use crate::errors::StoreError;
use crate::pagination::Pagination;
use crate::ports::HotelInventory;
use crate::storage::{JsonFileSnapshot, Record, SnapshotPort, SnapshotTable};

impl Record for Hotel {
    const ENTITY: &'static str = "hotel";
    fn key(&self) -> &str { &self.hotel_id }
}

/// Hotel records and their room counters.
///
/// `reserve_room` is the only place a room is taken, so it is the single
/// gate against overbooking.
pub struct HotelStore {
    table: SnapshotTable<Hotel>,
}

impl HotelStore {
    pub fn new(port: Arc<dyn SnapshotPort<Hotel>>) -> Self {
        Self { table: SnapshotTable::new(port) }
    }

    /// File-backed store; the file is created on first write.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(Arc::new(JsonFileSnapshot::new(path)))
    }

    /// Create a hotel with every room available.
    #[instrument(skip(self, name, location))]
    pub async fn create(&self, hotel_id: &str, name: &str, location: &str, total_rooms: u32) -> Result<Hotel, StoreError> {
        models::validate_id(Hotel::ENTITY, hotel_id)?;
        let hotel = self
            .table
            .update_map(|map| {
                if map.contains_key(hotel_id) {
                    debug!("hotel exists");
                    return Err(StoreError::duplicate(Hotel::ENTITY, hotel_id));
                }
                let hotel = Hotel::new(hotel_id, name, location, total_rooms);
                map.insert(hotel_id.to_string(), hotel.clone());
                Ok(hotel)
            })
            .await?;
        info!(%hotel_id, total_rooms, "hotel_created");
        Ok(hotel)
    }

    /// Remove a hotel. Reservations referencing it are left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, hotel_id: &str) -> Result<Hotel, StoreError> {
        let removed = self
            .table
            .update_map(|map| map.remove(hotel_id).ok_or_else(|| StoreError::not_found(Hotel::ENTITY, hotel_id)))
            .await?;
        info!(%hotel_id, booked = removed.booked_rooms(), "hotel_deleted");
        Ok(removed)
    }

    pub async fn get(&self, hotel_id: &str) -> Result<Hotel, StoreError> {
        self.table
            .read(|map| map.get(hotel_id).cloned())
            .await
            .ok_or_else(|| StoreError::not_found(Hotel::ENTITY, hotel_id))
    }

    /// Apply `patch`. A new `total_rooms` shifts `available_rooms` by the same
    /// delta, never below zero. A patch that changes nothing is not written.
    #[instrument(skip(self, patch), fields(total_rooms = ?patch.total_rooms))]
    pub async fn update(&self, hotel_id: &str, patch: HotelPatch) -> Result<Hotel, StoreError> {
        let mut locked = self.table.begin().await;
        let existing = locked
            .data
            .get_mut(hotel_id)
            .ok_or_else(|| StoreError::not_found(Hotel::ENTITY, hotel_id))?;
        if !existing.apply(patch) {
            debug!("hotel unchanged");
            return Ok(existing.clone());
        }
        let updated = existing.clone();
        let _ = locked.commit().await;
        info!(%hotel_id, total_rooms = updated.total_rooms, available_rooms = updated.available_rooms, "hotel_updated");
        Ok(updated)
    }

    /// Take one room. Fails with `NoAvailability` when none is free.
    #[instrument(skip(self))]
    pub async fn reserve_room(&self, hotel_id: &str) -> Result<Hotel, StoreError> {
        let hotel = self
            .table
            .update_map(|map| {
                let hotel = map
                    .get_mut(hotel_id)
                    .ok_or_else(|| StoreError::not_found(Hotel::ENTITY, hotel_id))?;
                if !hotel.reserve_one() {
                    debug!("no rooms left");
                    return Err(StoreError::NoAvailability(hotel_id.to_string()));
                }
                Ok(hotel.clone())
            })
            .await?;
        info!(%hotel_id, available_rooms = hotel.available_rooms, "room_reserved");
        Ok(hotel)
    }

    /// Give one room back. Fails with `AlreadyFull` when every room is free,
    /// which keeps a double cancel from inflating the inventory.
    #[instrument(skip(self))]
    pub async fn cancel_room(&self, hotel_id: &str) -> Result<Hotel, StoreError> {
        let hotel = self
            .table
            .update_map(|map| {
                let hotel = map
                    .get_mut(hotel_id)
                    .ok_or_else(|| StoreError::not_found(Hotel::ENTITY, hotel_id))?;
                if !hotel.release_one() {
                    debug!("all rooms already available");
                    return Err(StoreError::AlreadyFull(hotel_id.to_string()));
                }
                Ok(hotel.clone())
            })
            .await?;
        info!(%hotel_id, available_rooms = hotel.available_rooms, "room_released");
        Ok(hotel)
    }

    pub async fn exists(&self, hotel_id: &str) -> bool {
        self.table.read(|map| map.contains_key(hotel_id)).await
    }

    /// One page of hotels ordered by id.
    pub async fn list(&self, page: Pagination) -> Vec<Hotel> {
        self.table.read(|map| page.apply(map.values().cloned())).await
    }

    pub async fn count(&self) -> usize {
        self.table.read(|map| map.len()).await
    }
}

#[async_trait]
impl HotelInventory for HotelStore {
    async fn hotel_exists(&self, hotel_id: &str) -> bool { self.exists(hotel_id).await }
    async fn reserve_room(&self, hotel_id: &str) -> Result<(), StoreError> { self.reserve_room(hotel_id).await.map(|_| ()) }
    async fn cancel_room(&self, hotel_id: &str) -> Result<(), StoreError> { self.cancel_room(hotel_id).await.map(|_| ()) }
}
