//! Record stores: customers, hotels and the reservations that tie them together.

pub mod customer_store;
pub mod hotel_store;
pub mod reservation_store;

pub use customer_store::CustomerStore;
pub use hotel_store::HotelStore;
pub use reservation_store::ReservationStore;
