// Recognised error kinds for the task store

use thiserror::Error;

/// Errors the store distinguishes from plain backend failures.
///
/// Callers holding an `eyre::Report` can tell these apart with
/// `report.downcast_ref::<StoreError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Persisted data could not be parsed. Recovered as an empty collection.
    #[error("persisted task data is malformed: {0}")]
    MalformedPersistedState(String),

    /// Import payload is not JSON, not an array, or holds records that are not tasks.
    #[error("invalid import payload: {0}")]
    InvalidImportPayload(String),

    #[error("unknown filter chip: {0} (expected all, completed, pending, today or overdue)")]
    UnknownChip(String),

    #[error(
        "unknown sort key: {0} (expected order, createdDesc, createdAsc, dueAsc, dueDesc, priorityDesc or priorityAsc)"
    )]
    UnknownSort(String),

    /// Due date input that is neither a date, a local date-time nor RFC 3339.
    #[error("invalid due date: {0}")]
    InvalidDue(String),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::InvalidImportPayload("expected a JSON array".to_string());
        assert_eq!(err.to_string(), "invalid import payload: expected a JSON array");

        let err = StoreError::UnknownChip("later".to_string());
        assert!(err.to_string().starts_with("unknown filter chip: later"));
    }

    #[test]
    fn test_downcast_from_report() {
        let report = eyre::Report::new(StoreError::InvalidDue("tomorrow-ish".to_string()));
        assert_eq!(
            report.downcast_ref::<StoreError>(),
            Some(&StoreError::InvalidDue("tomorrow-ish".to_string()))
        );
    }
}
