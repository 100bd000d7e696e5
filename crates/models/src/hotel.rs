use serde::{Deserialize, Serialize};

use crate::non_empty;

/// A hotel and its room counter.
///
/// `available_rooms` is meant to stay within `0..=total_rooms`. Resizing only
/// clamps the lower bound, so after shrinking `total_rooms` the counter may
/// sit above it until enough reservations are made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HotelRecord")]
pub struct Hotel {
    pub hotel_id: String,
    pub name: String,
    pub location: String,
    pub total_rooms: u32,
    pub available_rooms: u32,
}

/// On-disk shape; older files may lack `available_rooms`.
#[derive(Deserialize)]
struct HotelRecord {
    hotel_id: String,
    name: String,
    location: String,
    total_rooms: u32,
    #[serde(default)]
    available_rooms: Option<u32>,
}

impl From<HotelRecord> for Hotel {
    fn from(r: HotelRecord) -> Self {
        Self {
            available_rooms: r.available_rooms.unwrap_or(r.total_rooms),
            hotel_id: r.hotel_id,
            name: r.name,
            location: r.location,
            total_rooms: r.total_rooms,
        }
    }
}

impl Hotel {
    /// New hotels start with every room available.
    pub fn new(hotel_id: &str, name: &str, location: &str, total_rooms: u32) -> Self {
        Self {
            hotel_id: hotel_id.to_string(),
            name: name.to_string(),
            location: location.to_string(),
            total_rooms,
            available_rooms: total_rooms,
        }
    }

    pub fn can_reserve(&self) -> bool {
        self.available_rooms > 0
    }

    pub fn is_fully_available(&self) -> bool {
        self.available_rooms >= self.total_rooms
    }

    /// Rooms currently held by reservations.
    pub fn booked_rooms(&self) -> u32 {
        self.total_rooms.saturating_sub(self.available_rooms)
    }

    /// Take one room. Returns false (and changes nothing) when none is free.
    pub fn reserve_one(&mut self) -> bool {
        if !self.can_reserve() {
            return false;
        }
        self.available_rooms -= 1;
        true
    }

    /// Give one room back. Returns false when the hotel is already at capacity.
    pub fn release_one(&mut self) -> bool {
        if self.is_fully_available() {
            return false;
        }
        self.available_rooms += 1;
        true
    }

    /// Set a new capacity, shifting `available_rooms` by the same delta and
    /// clamping it at zero.
    pub fn resize(&mut self, total_rooms: u32) {
        let delta = i64::from(total_rooms) - i64::from(self.total_rooms);
        let shifted = (i64::from(self.available_rooms) + delta).max(0);
        self.available_rooms = u32::try_from(shifted).unwrap_or(u32::MAX);
        self.total_rooms = total_rooms;
    }

    /// Overwrite the fields present in `patch`. Returns whether anything changed.
    pub fn apply(&mut self, patch: HotelPatch) -> bool {
        let before = self.clone();
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(total) = patch.total_rooms {
            self.resize(total);
        }
        before != *self
    }
}

/// Partial update for a hotel; `None` leaves the field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HotelPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub total_rooms: Option<u32>,
}

impl HotelPatch {
    /// Build a patch from raw form values where an empty string means "no change".
    pub fn from_form(name: &str, location: &str, total_rooms: Option<u32>) -> Self {
        Self { name: non_empty(name), location: non_empty(location), total_rooms }
    }
}
