//! ID and code generation utilities.

use rand::Rng;
use ulid::Ulid;

/// Alphabet used for room, admin and voter codes.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the short code participants type to join a room.
pub const ROOM_CODE_LENGTH: usize = 6;

/// Length of admin secrets.
pub const ADMIN_CODE_LENGTH: usize = 16;

/// Length of voter codes synthesized for anonymous ballots.
pub const VOTER_CODE_LENGTH: usize = 12;

/// Generate a random code of `length` characters from [`CODE_ALPHABET`].
///
/// Each character is drawn uniformly and independently. Uniqueness is not
/// guaranteed; callers that need unique codes must check the store and retry.
#[must_use]
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs sort by creation millisecond; ties within the same millisecond
    /// are broken by the random component, not insertion order.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}
