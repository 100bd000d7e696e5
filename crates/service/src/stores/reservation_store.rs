use std::{path::PathBuf, sync::Arc};

use configs::ReservationConfig;
use models::{Reservation, StayDates};
use tracing::{debug, error, info, instrument, warn};

use crate::errors::StoreError;
use crate::ids::{IdSource, UuidIdSource};
use crate::pagination::Pagination;
use crate::ports::{CustomerDirectory, HotelInventory};
use crate::storage::{JsonFileSnapshot, LockedSnapshot, Record, SnapshotPort, SnapshotTable};

impl Record for Reservation {
    const ENTITY: &'static str = "reservation";
    fn key(&self) -> &str { &self.reservation_id }
}

/// Reservations plus the booking protocol that keeps hotel room counts in
/// step with them.
///
/// The reservation table lock is held for the whole of `create` and
/// `cancel`, and the hotel inventory is only called while holding it.
pub struct ReservationStore {
    table: SnapshotTable<Reservation>,
    customers: Arc<dyn CustomerDirectory>,
    hotels: Arc<dyn HotelInventory>,
    ids: Arc<dyn IdSource>,
    config: ReservationConfig,
}

impl ReservationStore {
    pub fn new(
        port: Arc<dyn SnapshotPort<Reservation>>,
        customers: Arc<dyn CustomerDirectory>,
        hotels: Arc<dyn HotelInventory>,
        config: ReservationConfig,
    ) -> Self {
        Self { table: SnapshotTable::new(port), customers, hotels, ids: Arc::new(UuidIdSource), config }
    }

    /// File-backed store; the file is created on first write.
    pub fn open<P: Into<PathBuf>>(
        path: P,
        customers: Arc<dyn CustomerDirectory>,
        hotels: Arc<dyn HotelInventory>,
        config: ReservationConfig,
    ) -> Self {
        Self::new(Arc::new(JsonFileSnapshot::new(path)), customers, hotels, config)
    }

    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Book one room at `hotel_id` for `customer_id`.
    ///
    /// The room is taken before the reservation is written. If the
    /// reservation cannot be saved, or no unused id turns up, the room is
    /// handed back before the error is returned.
    ///
    /// # Examples
    /// ```
    /// use service::runtime::Stores;
    /// let stores = Stores::in_memory(Default::default());
    /// tokio_test::block_on(async {
    ///     stores.customers.create("C1", "Alice", "alice@mail.com", "123").await.unwrap();
    ///     stores.hotels.create("H1", "Grand", "NYC", 1).await.unwrap();
    ///     let r = stores.reservations.create("C1", "H1", "2024-01-01", "2024-01-05").await.unwrap();
    ///     assert_eq!(r.reservation_id.len(), 8);
    ///     assert!(stores.reservations.create("C1", "H1", "2024-02-01", "2024-02-02").await.is_err());
    /// });
    /// ```
    #[instrument(skip(self, check_in, check_out))]
    pub async fn create(&self, customer_id: &str, hotel_id: &str, check_in: &str, check_out: &str) -> Result<Reservation, StoreError> {
        if self.config.validate_stay_dates {
            let nights = StayDates::parse(check_in, check_out)?.nights();
            debug!(nights, "stay dates valid");
        }
        if !self.customers.customer_exists(customer_id).await {
            debug!("unknown customer");
            return Err(StoreError::CustomerNotFound(customer_id.to_string()));
        }
        if !self.hotels.hotel_exists(hotel_id).await {
            debug!("unknown hotel");
            return Err(StoreError::HotelNotFound(hotel_id.to_string()));
        }

        let mut locked = self.table.begin().await;
        self.hotels.reserve_room(hotel_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => StoreError::HotelNotFound(hotel_id.to_string()),
            other => other,
        })?;

        let reservation_id = match self.fresh_id(&locked) {
            Ok(id) => id,
            Err(e) => {
                self.release_room(hotel_id).await;
                return Err(e);
            }
        };
        let reservation = Reservation::new(reservation_id, customer_id, hotel_id, check_in, check_out);
        locked.data.insert(reservation.reservation_id.clone(), reservation.clone());
        if let Err(e) = locked.commit().await {
            self.release_room(hotel_id).await;
            return Err(e.into());
        }

        info!(reservation_id = %reservation.reservation_id, %customer_id, %hotel_id, "reservation_created");
        Ok(reservation)
    }

    /// Draw ids until one is not taken in the loaded snapshot.
    fn fresh_id(&self, locked: &LockedSnapshot<'_, Reservation>) -> Result<String, StoreError> {
        for attempt in 1..=self.config.id_max_attempts {
            let candidate = self.ids.next_id(self.config.id_length);
            if !locked.data.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(attempt, %candidate, "reservation id collision");
        }
        Err(StoreError::IdExhausted(self.config.id_max_attempts))
    }

    /// Compensation for a room taken by a create that did not complete.
    async fn release_room(&self, hotel_id: &str) {
        match self.hotels.cancel_room(hotel_id).await {
            Ok(()) => info!(%hotel_id, "room_reservation_compensated"),
            Err(e) => error!(%hotel_id, error = %e, "compensation failed; room count may be low by one"),
        }
    }

    /// Remove a reservation and give its room back.
    ///
    /// Returning the room is best-effort: a hotel that no longer exists or is
    /// already at capacity is logged and the reservation is removed anyway.
    /// If the removal cannot be saved, a returned room is taken again so a
    /// retried cancel does not free it twice.
    #[instrument(skip(self))]
    pub async fn cancel(&self, reservation_id: &str) -> Result<Reservation, StoreError> {
        let mut locked = self.table.begin().await;
        let Some(removed) = locked.data.remove(reservation_id) else {
            debug!("unknown reservation");
            return Err(StoreError::not_found(Reservation::ENTITY, reservation_id));
        };

        let hotel_id = removed.hotel_id.as_str();
        let returned = match self.hotels.cancel_room(hotel_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(%reservation_id, %hotel_id, error = %e, "room not returned to inventory");
                false
            }
        };
        if let Err(e) = locked.commit().await {
            if returned {
                self.retake_room(hotel_id).await;
            }
            return Err(e.into());
        }
        info!(%reservation_id, %hotel_id, "reservation_cancelled");
        Ok(removed)
    }

    /// Compensation for a room returned by a cancel that did not complete.
    async fn retake_room(&self, hotel_id: &str) {
        match self.hotels.reserve_room(hotel_id).await {
            Ok(()) => info!(%hotel_id, "room_release_compensated"),
            Err(e) => error!(%hotel_id, error = %e, "compensation failed; room count may be high by one"),
        }
    }

    pub async fn get(&self, reservation_id: &str) -> Result<Reservation, StoreError> {
        self.table
            .read(|map| map.get(reservation_id).cloned())
            .await
            .ok_or_else(|| StoreError::not_found(Reservation::ENTITY, reservation_id))
    }

    /// One page of reservations ordered by id.
    pub async fn list(&self, page: Pagination) -> Vec<Reservation> {
        self.table.read(|map| page.apply(map.values().cloned())).await
    }

    pub async fn list_for_hotel(&self, hotel_id: &str) -> Vec<Reservation> {
        self.table
            .read(|map| map.values().filter(|r| r.hotel_id == hotel_id).cloned().collect())
            .await
    }

    pub async fn list_for_customer(&self, customer_id: &str) -> Vec<Reservation> {
        self.table
            .read(|map| map.values().filter(|r| r.customer_id == customer_id).cloned().collect())
            .await
    }

    pub async fn count(&self) -> usize {
        self.table.read(|map| map.len()).await
    }
}
