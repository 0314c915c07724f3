// Whole-collection JSON persistence, export and import

use crate::error::StoreError;
use crate::kv::KeyValue;
use crate::record::Record;
use eyre::{Context, Result};
use fs2::FileExt;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// File name used for exports when none is given
pub const DEFAULT_EXPORT_FILE: &str = "focusflow-tasks.json";

/// Load a collection from the backend
///
/// An absent key or malformed data yields an empty collection; the fault is
/// logged, never returned. Only backend failures are errors.
pub fn load_collection<T: Record>(kv: &impl KeyValue) -> Result<Vec<T>> {
    let key = T::storage_key();

    let raw = match kv.get(&key)? {
        Some(raw) => raw,
        None => {
            debug!(key, "No persisted collection");
            return Ok(Vec::new());
        }
    };

    match parse_persisted(&raw) {
        Ok(records) => {
            debug!(key, count = records.len(), "Loaded collection");
            Ok(records)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding malformed persisted state");
            Ok(Vec::new())
        }
    }
}

/// Decode a persisted collection value
pub fn parse_persisted<T: Record>(raw: &str) -> Result<Vec<T>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::MalformedPersistedState(e.to_string()))
}

/// Serialize the full collection and overwrite the persisted value
pub fn save_collection<T: Record>(kv: &mut impl KeyValue, records: &[T]) -> Result<()> {
    let key = T::storage_key();
    let json = serde_json::to_string(records).context("Failed to serialize collection")?;
    kv.set(&key, &json)?;

    debug!(key, count = records.len(), "Saved collection");
    Ok(())
}

/// Pretty-printed JSON array of `records`, as written by [`export_to_file`]
pub fn export_json<T: Record>(records: &[T]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize export")
}

/// Write the collection to `path` as a pretty-printed JSON array
pub fn export_to_file<T: Record>(path: &Path, records: &[T]) -> Result<()> {
    let json = export_json(records)?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open export file {}", path.display()))?;

    // Acquire exclusive lock before truncating and writing
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.set_len(0)?;

    writeln!(file, "{}", json)?;
    file.sync_all()?;

    info!(file = ?path, count = records.len(), "Exported collection");
    Ok(())
}

/// Validate an import payload and decode it
///
/// The payload must be a JSON array of record-shaped objects with unique ids.
/// Nothing is committed here; callers replace their collection only on `Ok`.
pub fn parse_import<T: Record>(payload: &str) -> Result<Vec<T>, StoreError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| StoreError::InvalidImportPayload(format!("failed to parse JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(StoreError::InvalidImportPayload(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let record: T = serde_json::from_value(item).map_err(|e| {
            StoreError::InvalidImportPayload(format!("item {} is not a {} record: {}", index, T::collection_name(), e))
        })?;

        if !seen.insert(record.id().to_string()) {
            return Err(StoreError::InvalidImportPayload(format!(
                "duplicate id {} at item {}",
                record.id(),
                index
            )));
        }

        records.push(record);
    }

    Ok(records)
}

/// Read and validate an import file
pub fn read_import_file<T: Record>(path: &Path) -> Result<Vec<T>> {
    let payload =
        fs::read_to_string(path).with_context(|| format!("Failed to read import file {}", path.display()))?;
    Ok(parse_import(&payload)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
