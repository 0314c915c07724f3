// Command dispatch: one user action, one store operation

use crate::kv::KeyValue;
use crate::models::{NewTask, TaskUpdate};
use crate::store::TaskStore;
use eyre::Result;
use std::path::PathBuf;
use tracing::debug;

/// A user action against the task store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(NewTask),
    Update { id: String, changes: TaskUpdate },
    Delete { id: String },
    Reorder { id_a: String, id_b: String },
    /// Replace the collection with a JSON array payload
    Import { payload: String },
    ImportFile { path: PathBuf },
    ExportFile { path: PathBuf },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create(_) => "create",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Reorder { .. } => "reorder",
            Command::Import { .. } => "import",
            Command::ImportFile { .. } => "import-file",
            Command::ExportFile { .. } => "export-file",
        }
    }
}

/// Result of a dispatched command
///
/// The bool variants report whether the target task(s) existed; unknown ids
/// and blank titles are no-ops rather than errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(Option<String>),
    Updated(bool),
    Deleted(bool),
    Reordered(bool),
    Imported(usize),
    Exported { path: PathBuf, count: usize },
}

impl Outcome {
    /// Whether the collection may have changed and views should be refreshed
    pub fn changed(&self) -> bool {
        match self {
            Outcome::Created(id) => id.is_some(),
            Outcome::Updated(found) | Outcome::Deleted(found) | Outcome::Reordered(found) => *found,
            Outcome::Imported(_) => true,
            Outcome::Exported { .. } => false,
        }
    }
}

impl<K: KeyValue> TaskStore<K> {
    /// Run one command against the store
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        debug!(command = command.name(), "Dispatching");

        let outcome = match command {
            Command::Create(new) => Outcome::Created(self.create(new)?),
            Command::Update { id, changes } => Outcome::Updated(self.update(&id, &changes)?),
            Command::Delete { id } => Outcome::Deleted(self.delete(&id)?),
            Command::Reorder { id_a, id_b } => Outcome::Reordered(self.reorder(&id_a, &id_b)?),
            Command::Import { payload } => Outcome::Imported(self.import_json(&payload)?),
            Command::ImportFile { path } => Outcome::Imported(self.import_file(&path)?),
            Command::ExportFile { path } => {
                let count = self.export_file(&path)?;
                Outcome::Exported { path, count }
            }
        };

        Ok(outcome)
    }
}
