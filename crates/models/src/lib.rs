//! Record types persisted by the hotel reservation stores.
//!
//! Field names are part of the on-disk format; renaming one breaks
//! existing snapshot files.

pub mod errors;
pub mod customer;
pub mod hotel;
pub mod reservation;

pub use customer::{Customer, CustomerPatch};
pub use hotel::{Hotel, HotelPatch};
pub use reservation::{Reservation, StayDates};

/// Returns `None` for empty input so form-style callers can leave a field unchanged.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Ids are map keys on disk; an empty one would be unaddressable.
pub fn validate_id(kind: &str, id: &str) -> Result<(), errors::ModelError> {
    if id.trim().is_empty() {
        return Err(errors::ModelError::Validation(format!("{kind} id required")));
    }
    Ok(())
}
