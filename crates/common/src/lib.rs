//! Shared infrastructure for the hotel reservation crates.
//!
//! Nothing in here knows about customers, hotels or reservations; it only
//! covers process-level concerns (log output, data directory checks).

pub mod env;
pub mod utils;
