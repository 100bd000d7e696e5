//! Contracts the reservation flow depends on.
//!
//! `ReservationStore` never touches customer or hotel snapshots directly; it
//! goes through these traits, which the concrete stores implement.

pub mod customer_directory;
pub mod hotel_inventory;

pub use customer_directory::CustomerDirectory;
pub use hotel_inventory::HotelInventory;
