// Generic record trait for any storable type

use serde::{Deserialize, Serialize};

/// Prefix shared by every key this crate writes to a key-value backend
pub const KEY_PREFIX: &str = "focusflow";

/// Core trait that any storable record must implement
///
/// A collection of records is persisted as one JSON array under
/// [`Record::storage_key`].
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Collection name for this record type (e.g., "tasks")
    fn collection_name() -> &'static str
    where
        Self: Sized;

    /// Key the whole collection is stored under: `focusflow.{collection}.v1`
    fn storage_key() -> String
    where
        Self: Sized,
    {
        format!("{}.{}.v1", KEY_PREFIX, Self::collection_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct TestRecord {
        id: String,
        name: String,
    }

    impl Record for TestRecord {
        fn id(&self) -> &str {
            &self.id
        }

        fn collection_name() -> &'static str {
            "test"
        }
    }

    #[test]
    fn test_record_trait_implementation() {
        let record = TestRecord {
            id: "test-1".to_string(),
            name: "Test".to_string(),
        };

        assert_eq!(record.id(), "test-1");
        assert_eq!(TestRecord::collection_name(), "test");
        assert_eq!(TestRecord::storage_key(), "focusflow.test.v1");
    }
}
