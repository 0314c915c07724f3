// Data models for FocusFlow

use crate::dates;
use crate::record::Record;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PRIORITY_LOW: u8 = 1;
pub const PRIORITY_MEDIUM: u8 = 2;
pub const PRIORITY_HIGH: u8 = 3;

/// One to-do item
///
/// Field names follow the persisted JSON (`createdAt`, not `created_at`).
/// Optional fields default when absent so older or hand-edited exports still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    /// ISO-8601 date-time, or empty for "no due date"
    #[serde(default)]
    pub due: String,
    #[serde(default)]
    pub category: String,
    /// 3 = High, 2 = Medium, 1 = Low; 0 when absent
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub created_at: String,
    /// Manual sort position
    #[serde(default)]
    pub order: i64,
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "tasks"
    }
}

impl Task {
    /// Calendar day of `due` in local time, if any
    pub fn due_day(&self) -> Option<NaiveDate> {
        dates::due_day(&self.due)
    }

    pub fn due_status(&self, today: NaiveDate) -> DueStatus {
        match self.due_day() {
            None => DueStatus::NoDue,
            Some(day) if day < today && !self.done => DueStatus::Overdue,
            Some(day) if day == today => DueStatus::Today,
            Some(_) => DueStatus::Scheduled,
        }
    }

    pub fn priority_label(&self) -> &'static str {
        priority_label(self.priority)
    }
}

/// Human label for a priority value
pub fn priority_label(priority: u8) -> &'static str {
    match priority {
        PRIORITY_LOW => "Low",
        PRIORITY_MEDIUM => "Medium",
        PRIORITY_HIGH => "High",
        _ => "—",
    }
}

/// How a task's due date relates to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Today,
    Scheduled,
    NoDue,
}

/// Input for creating a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub due: String,
    pub category: String,
    pub priority: u8,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: PRIORITY_MEDIUM,
            ..Default::default()
        }
    }

    pub fn due(mut self, due: impl Into<String>) -> Self {
        self.due = due.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial edit of a task; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub priority: Option<u8>,
    pub done: Option<bool>,
}

impl TaskUpdate {
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `task`, returning whether anything changed
    ///
    /// Titles are trimmed and a blank title is ignored. Priorities are
    /// clamped to 1..=3.
    pub fn apply(&self, task: &mut Task) -> bool {
        let before = task.clone();

        if let Some(title) = &self.title {
            let title = title.trim();
            if !title.is_empty() {
                task.title = title.to_string();
            }
        }
        if let Some(due) = &self.due {
            task.due = due.clone();
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = clamp_priority(priority);
        }
        if let Some(done) = self.done {
            task.done = done;
        }

        *task != before
    }
}

pub fn clamp_priority(priority: u8) -> u8 {
    priority.clamp(PRIORITY_LOW, PRIORITY_HIGH)
}

/// Fresh unique task id
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Example tasks written on first run
pub fn seed_tasks(today: NaiveDate) -> Vec<Task> {
    let created_at = dates::now_iso();
    let tomorrow = today + Duration::days(1);

    let seed = |title: &str, due: String, category: &str, priority: u8, order: i64| Task {
        id: new_id(),
        title: title.to_string(),
        due,
        category: category.to_string(),
        priority,
        done: false,
        created_at: created_at.clone(),
        order,
    };

    vec![
        seed(
            "Finish DSA assignment",
            dates::local_midnight_iso(today),
            "Study",
            PRIORITY_HIGH,
            1,
        ),
        seed(
            "Push portfolio update to GitHub",
            dates::local_midnight_iso(tomorrow),
            "Work",
            PRIORITY_MEDIUM,
            2,
        ),
        seed("Gym session", String::new(), "Personal", PRIORITY_LOW, 3),
    ]
}
