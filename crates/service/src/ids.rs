//! Reservation id generation.

use uuid::Uuid;

/// Source of candidate reservation ids.
pub trait IdSource: Send + Sync {
    /// A fresh candidate of exactly `len` characters (at most 32).
    fn next_id(&self, len: usize) -> String;
}

/// Prefix of a random v4 uuid in hex. Not unique by construction; callers
/// check candidates against existing ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self, len: usize) -> String {
        let mut id = Uuid::new_v4().simple().to_string();
        id.truncate(len);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_have_requested_length() {
        let id = UuidIdSource.next_id(8);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(UuidIdSource.next_id(8), UuidIdSource.next_id(8));
        assert_eq!(UuidIdSource.next_id(40).len(), 32);
    }
}
