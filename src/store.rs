// TaskStore: owned task collection with persistence and view queries

use crate::dates;
use crate::error::StoreError;
use crate::filter::{Stats, View, ViewQuery, compute_view};
use crate::json;
use crate::kv::{KeyValue, SqliteKv};
use crate::models::{self, NewTask, Task, TaskUpdate};
use crate::record::Record;
use chrono::NaiveDate;
use eyre::{Result, eyre};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Options applied when a store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Write the example tasks when nothing usable has been persisted
    pub seed_examples: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { seed_examples: true }
    }
}

/// Ordered task collection persisted whole to a key-value backend
///
/// Every mutation that changes the collection rewrites the persisted value
/// before returning. Raw storage order is most-recent-first; display order
/// comes from [`TaskStore::view`].
pub struct TaskStore<K: KeyValue = SqliteKv> {
    kv: K,
    tasks: Vec<Task>,
}

impl TaskStore<SqliteKv> {
    /// Open or create an on-disk store in the given directory
    pub fn open<P: AsRef<Path>>(path: P, options: OpenOptions) -> Result<Self> {
        let kv = SqliteKv::open(path)?;
        Self::with_backend(kv, options)
    }
}

impl<K: KeyValue> TaskStore<K> {
    /// Load the collection from `kv`, seeding it if enabled
    ///
    /// Seeds when nothing has been persisted yet or the persisted value was
    /// malformed and discarded. An explicitly emptied collection stays empty.
    pub fn with_backend(kv: K, options: OpenOptions) -> Result<Self> {
        let key = Task::storage_key();
        let (tasks, needs_seed) = match kv.get(&key)? {
            None => (Vec::new(), true),
            Some(raw) => match json::parse_persisted(&raw) {
                Ok(tasks) => (tasks, false),
                Err(e) => {
                    warn!(key, error = %e, "Discarding malformed persisted state");
                    (Vec::new(), true)
                }
            },
        };

        let mut store = Self { kv, tasks };

        if needs_seed && options.seed_examples {
            info!("Seeding example tasks");
            store.tasks = models::seed_tasks(dates::today());
            store.save()?;
        }

        debug!(count = store.tasks.len(), "Opened task store");
        Ok(store)
    }

    /// Tasks in raw storage order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn backend(&self) -> &K {
        &self.kv
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve_id(&self, prefix: &str) -> Result<String> {
        if let Some(task) = self.get(prefix) {
            return Ok(task.id.clone());
        }

        let mut matches = self.tasks.iter().filter(|t| !prefix.is_empty() && t.id.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task.id.clone()),
            (Some(_), Some(_)) => Err(eyre!("Ambiguous task id prefix: {}", prefix)),
            _ => Err(eyre!("No task with id: {}", prefix)),
        }
    }

    /// Re-read the persisted collection, replacing the in-memory one
    pub fn load(&mut self) -> Result<()> {
        self.tasks = json::load_collection(&self.kv)?;
        Ok(())
    }

    /// Persist the full collection
    pub fn save(&mut self) -> Result<()> {
        json::save_collection(&mut self.kv, &self.tasks)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a task at the front of the collection
    ///
    /// Returns the new id, or `None` when the trimmed title is empty. The due
    /// value is normalised to UTC ISO-8601; an invalid one is an
    /// [`StoreError::InvalidDue`] error and nothing is created.
    pub fn create(&mut self, new: NewTask) -> Result<Option<String>> {
        let title = new.title.trim();
        if title.is_empty() {
            debug!("Ignoring create with blank title");
            return Ok(None);
        }

        let title = title.to_string();
        let due = dates::normalize_due(&new.due)?;
        let order = self.next_order();

        let task = Task {
            id: models::new_id(),
            title,
            due,
            category: new.category,
            priority: models::clamp_priority(new.priority),
            done: false,
            created_at: dates::now_iso(),
            order,
        };
        let id = task.id.clone();

        self.tasks.insert(0, task);
        self.save()?;

        debug!(id, order, "Created task");
        Ok(Some(id))
    }

    /// `max(order) + 1`, or 1 when empty
    ///
    /// Renumbers densely first if the maximum cannot be incremented.
    fn next_order(&mut self) -> i64 {
        let Some(max) = self.tasks.iter().map(|t| t.order).max() else {
            return 1;
        };

        match max.checked_add(1) {
            Some(order) => order,
            None => {
                warn!(max, "Order values exhausted, renumbering");
                self.renumber();
                self.tasks.len() as i64 + 1
            }
        }
    }

    /// Apply `changes` to the task with `id`
    ///
    /// A due value is normalised to UTC ISO-8601 before anything changes; an
    /// invalid one is an [`StoreError::InvalidDue`] error. Returns false when
    /// no such task exists.
    pub fn update(&mut self, id: &str, changes: &TaskUpdate) -> Result<bool> {
        let Some(position) = self.position(id) else {
            debug!(id, "Ignoring update of unknown task");
            return Ok(false);
        };

        let mut changes = changes.clone();
        if let Some(due) = changes.due.take() {
            changes.due = Some(dates::normalize_due(&due)?);
        }

        if changes.apply(&mut self.tasks[position]) {
            self.save()?;
            debug!(id, "Updated task");
        }
        Ok(true)
    }

    /// Remove the task with `id`, returning whether it existed
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);

        if self.tasks.len() == before {
            debug!(id, "Ignoring delete of unknown task");
            return Ok(false);
        }

        self.save()?;
        debug!(id, "Deleted task");
        Ok(true)
    }

    /// Make two tasks trade places in manual order
    ///
    /// Swaps their `order` values, then renumbers every task densely from 1
    /// in (order, storage position) sequence. Storage order is unchanged.
    /// Returns false when either id is unknown or both are the same task.
    pub fn reorder(&mut self, id_a: &str, id_b: &str) -> Result<bool> {
        if id_a == id_b {
            return Ok(false);
        }

        let (Some(a), Some(b)) = (self.position(id_a), self.position(id_b)) else {
            debug!(id_a, id_b, "Ignoring reorder of unknown task");
            return Ok(false);
        };

        let order_a = self.tasks[a].order;
        self.tasks[a].order = self.tasks[b].order;
        self.tasks[b].order = order_a;

        self.renumber();
        self.save()?;

        debug!(id_a, id_b, "Reordered tasks");
        Ok(true)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn renumber(&mut self) {
        let mut positions: Vec<usize> = (0..self.tasks.len()).collect();
        positions.sort_by_key(|&i| self.tasks[i].order);

        for (rank, i) in positions.into_iter().enumerate() {
            self.tasks[i].order = rank as i64 + 1;
        }
    }

    /// Replace the whole collection with already-validated tasks
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<usize> {
        self.tasks = tasks;
        self.save()?;

        info!(count = self.tasks.len(), "Replaced collection");
        Ok(self.tasks.len())
    }

    /// Validate a JSON payload and replace the collection with it
    ///
    /// On any validation error the collection is left untouched and the
    /// error downcasts to [`StoreError::InvalidImportPayload`].
    pub fn import_json(&mut self, payload: &str) -> Result<usize> {
        let tasks: Vec<Task> = json::parse_import(payload)?;
        self.replace_all(tasks)
    }

    pub fn import_file(&mut self, path: &Path) -> Result<usize> {
        let tasks: Vec<Task> = json::read_import_file(path)?;
        self.replace_all(tasks)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Pretty-printed JSON of the full collection
    pub fn export_json(&self) -> Result<String> {
        json::export_json(&self.tasks)
    }

    pub fn export_file(&self, path: &Path) -> Result<usize> {
        json::export_to_file(path, &self.tasks)?;
        Ok(self.tasks.len())
    }

    /// View for `query` as of the local calendar day
    pub fn view(&self, query: &ViewQuery) -> View {
        self.view_at(query, dates::today())
    }

    pub fn view_at(&self, query: &ViewQuery, today: NaiveDate) -> View {
        compute_view(&self.tasks, query, today)
    }

    pub fn stats_at(&self, today: NaiveDate) -> Stats {
        Stats::compute(&self.tasks, today)
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| !t.category.is_empty())
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Whether an error is a rejected import payload
pub fn is_invalid_import(err: &eyre::Report) -> bool {
    matches!(err.downcast_ref::<StoreError>(), Some(StoreError::InvalidImportPayload(_)))
}
