//! ID generation utilities.

use ulid::Ulid;

/// ID generator for entities.
///
/// IDs are lower-cased ULIDs, so ordering rows by primary key orders them by
/// creation time.
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
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_ids_from_later_milliseconds_sort_after() {
        let id_gen = IdGenerator::new();
        let earlier = id_gen.generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let later = id_gen.generate();

        assert!(earlier < later);
    }
}
