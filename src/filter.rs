// View derivation: chip, category and search filters, sorting and stats

use crate::dates;
use crate::error::StoreError;
use crate::models::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Coarse single-selection filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chip {
    #[default]
    All,
    Completed,
    Pending,
    Today,
    Overdue,
}

impl Chip {
    pub const ALL: [Chip; 5] = [Chip::All, Chip::Completed, Chip::Pending, Chip::Today, Chip::Overdue];

    fn as_str(self) -> &'static str {
        match self {
            Chip::All => "all",
            Chip::Completed => "completed",
            Chip::Pending => "pending",
            Chip::Today => "today",
            Chip::Overdue => "overdue",
        }
    }

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Chip::All => true,
            Chip::Completed => task.done,
            Chip::Pending => !task.done,
            Chip::Today => task.due_day() == Some(today),
            Chip::Overdue => !task.done && task.due_day().is_some_and(|day| day < today),
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chip {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chip::ALL
            .into_iter()
            .find(|chip| chip.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::UnknownChip(s.to_string()))
    }
}

/// Category selection; `Only("")` matches uncategorised tasks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => task.category == *category,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(value.to_string())
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(category) => write!(f, "{}", category),
        }
    }
}

/// Ordering applied to the filtered view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Manual `order` ascending
    #[default]
    Order,
    CreatedDesc,
    CreatedAsc,
    DueAsc,
    DueDesc,
    PriorityDesc,
    PriorityAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Order,
        SortKey::CreatedDesc,
        SortKey::CreatedAsc,
        SortKey::DueAsc,
        SortKey::DueDesc,
        SortKey::PriorityDesc,
        SortKey::PriorityAsc,
    ];

    fn as_str(self) -> &'static str {
        match self {
            SortKey::Order => "order",
            SortKey::CreatedDesc => "createdDesc",
            SortKey::CreatedAsc => "createdAsc",
            SortKey::DueAsc => "dueAsc",
            SortKey::DueDesc => "dueDesc",
            SortKey::PriorityDesc => "priorityDesc",
            SortKey::PriorityAsc => "priorityAsc",
        }
    }

    /// Primary comparison only; ties are broken by [`compare`]
    fn primary(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortKey::Order => Ordering::Equal,
            SortKey::CreatedDesc => created(b).cmp(&created(a)),
            SortKey::CreatedAsc => created(a).cmp(&created(b)),
            // Empty due sorts as the smallest value
            SortKey::DueAsc => a.due.cmp(&b.due),
            SortKey::DueDesc => b.due.cmp(&a.due),
            SortKey::PriorityDesc => b.priority.cmp(&a.priority),
            SortKey::PriorityAsc => a.priority.cmp(&b.priority),
        }
    }

    /// Full comparison: primary key, then `order` ascending
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        self.primary(a, b).then_with(|| a.order.cmp(&b.order))
    }
}

// Malformed timestamps sort before every valid one
fn created(task: &Task) -> Option<i64> {
    dates::parse_created(&task.created_at).map(|at| at.timestamp_millis())
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::UnknownSort(s.to_string()))
    }
}

/// The user's current filter, search and sort selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub chip: Chip,
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortKey,
}

impl ViewQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chip(mut self, chip: Chip) -> Self {
        self.chip = chip;
        self
    }

    pub fn category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Aggregate counts over the whole collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    /// Pending tasks due today
    pub today_count: usize,
}

impl Stats {
    pub fn compute(tasks: &[Task], today: NaiveDate) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.done).count();
        let today_count = tasks
            .iter()
            .filter(|t| !t.done && t.due_day() == Some(today))
            .count();

        Self {
            total,
            pending: total - completed,
            completed,
            today_count,
        }
    }
}

/// Filtered, searched and sorted tasks plus collection-wide stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub tasks: Vec<Task>,
    pub stats: Stats,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Derive the view for `query` from `tasks` as of `today`
///
/// Pure: the same inputs always give the same output. Stats cover the whole
/// collection, not the filtered view. The sort is stable, with ties broken by
/// `order` and then by position in `tasks`.
pub fn compute_view(tasks: &[Task], query: &ViewQuery, today: NaiveDate) -> View {
    let needle = query.search.trim().to_lowercase();

    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|t| query.chip.matches(t, today))
        .filter(|t| query.category.matches(t))
        .filter(|t| needle.is_empty() || t.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    view.sort_by(|a, b| query.sort.compare(a, b));

    View {
        tasks: view,
        stats: Stats::compute(tasks, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            due: String::new(),
            category: String::new(),
            priority: 2,
            done: false,
            created_at: "2024-05-01T08:00:00.000Z".to_string(),
            order: 0,
        }
    }

    fn ids(view: &View) -> Vec<&str> {
        view.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    fn sample() -> Vec<Task> {
        let mut a = task("a", "Finish DSA");
        a.due = "2024-06-01".to_string();
        a.category = "Study".to_string();
        a.priority = 3;
        a.order = 1;

        let mut b = task("b", "Gym session");
        b.category = "Personal".to_string();
        b.priority = 1;
        b.order = 2;

        let mut c = task("c", "Pay rent");
        c.due = "2024-05-20T09:00".to_string();
        c.priority = 2;
        c.order = 3;

        let mut d = task("d", "Old report");
        d.due = "2024-05-01".to_string();
        d.category = "Work".to_string();
        d.done = true;
        d.order = 4;

        vec![a, b, c, d]
    }

    #[test]
    fn test_chip_parse_and_display() {
        assert_eq!("overdue".parse::<Chip>().unwrap(), Chip::Overdue);
        assert_eq!("Today".parse::<Chip>().unwrap(), Chip::Today);
        assert_eq!(Chip::Completed.to_string(), "completed");
        assert_eq!(
            "later".parse::<Chip>(),
            Err(StoreError::UnknownChip("later".to_string()))
        );
    }

    #[test]
    fn test_sort_key_parse_and_display() {
        assert_eq!("priorityDesc".parse::<SortKey>().unwrap(), SortKey::PriorityDesc);
        assert_eq!("duedesc".parse::<SortKey>().unwrap(), SortKey::DueDesc);
        assert_eq!(SortKey::CreatedAsc.to_string(), "createdAsc");
        assert!("random".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_chip_filters() {
        let tasks = sample();
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().chip(Chip::Completed), today);
        assert_eq!(ids(&view), vec!["d"]);

        let view = compute_view(&tasks, &ViewQuery::new().chip(Chip::Pending), today);
        assert_eq!(ids(&view), vec!["a", "b", "c"]);

        let view = compute_view(&tasks, &ViewQuery::new().chip(Chip::Today), today);
        assert_eq!(ids(&view), vec!["a"]);

        // Done tasks are never overdue
        let view = compute_view(&tasks, &ViewQuery::new().chip(Chip::Overdue), today);
        assert_eq!(ids(&view), vec!["c"]);

        let view = compute_view(&tasks, &ViewQuery::new(), today);
        assert_eq!(view.tasks.len(), 4);
    }

    #[test]
    fn test_overdue_scenario() {
        let mut t = task("x", "Late");
        t.due = "2024-01-01".to_string();

        let view = compute_view(&[t], &ViewQuery::new().chip(Chip::Overdue), day(2024, 6, 1));
        assert_eq!(ids(&view), vec!["x"]);
    }

    #[test]
    fn test_malformed_due_never_matches_date_chips() {
        let mut t = task("x", "Broken");
        t.due = "whenever".to_string();
        let tasks = vec![t];
        let today = day(2024, 6, 1);

        assert!(compute_view(&tasks, &ViewQuery::new().chip(Chip::Today), today).is_empty());
        assert!(compute_view(&tasks, &ViewQuery::new().chip(Chip::Overdue), today).is_empty());
    }

    #[test]
    fn test_category_filter() {
        let tasks = sample();
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().category("Work"), today);
        assert_eq!(ids(&view), vec!["d"]);

        // Empty category matches only the empty filter value
        let view = compute_view(&tasks, &ViewQuery::new().category(""), today);
        assert_eq!(ids(&view), vec!["c"]);

        let view = compute_view(&tasks, &ViewQuery::new().category("all"), today);
        assert_eq!(view.tasks.len(), 4);
    }

    #[test]
    fn test_search_is_trimmed_and_case_insensitive() {
        let tasks = vec![task("g", "Gym session"), task("f", "Finish DSA")];
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().search("gym"), today);
        assert_eq!(ids(&view), vec!["g"]);

        let view = compute_view(&tasks, &ViewQuery::new().search("  DSA "), today);
        assert_eq!(ids(&view), vec!["f"]);

        let view = compute_view(&tasks, &ViewQuery::new().search("   "), today);
        assert_eq!(view.tasks.len(), 2);
    }

    #[test]
    fn test_sort_priority_desc() {
        let mut tasks = Vec::new();
        for (i, p) in [1u8, 3, 2].into_iter().enumerate() {
            let mut t = task(&format!("t{}", i), "x");
            t.priority = p;
            tasks.push(t);
        }

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::PriorityDesc), day(2024, 6, 1));
        let priorities: Vec<u8> = view.tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![3, 2, 1]);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::PriorityAsc), day(2024, 6, 1));
        let priorities: Vec<u8> = view.tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_due_empty_is_smallest() {
        let tasks = sample();
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::DueAsc), today);
        assert_eq!(ids(&view), vec!["b", "d", "c", "a"]);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::DueDesc), today);
        assert_eq!(ids(&view), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_sort_created() {
        let mut early = task("early", "x");
        early.created_at = "2024-01-01T00:00:00.000Z".to_string();
        let mut late = task("late", "x");
        late.created_at = "2024-03-01T00:00:00.000Z".to_string();
        let mut broken = task("broken", "x");
        broken.created_at = "not a time".to_string();
        let tasks = vec![early, late, broken];
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::CreatedDesc), today);
        assert_eq!(ids(&view), vec!["late", "early", "broken"]);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::CreatedAsc), today);
        assert_eq!(ids(&view), vec!["broken", "early", "late"]);
    }

    #[test]
    fn test_sort_ties_fall_back_to_order_then_position() {
        let mut tasks = Vec::new();
        for (id, order) in [("a", 3), ("b", 1), ("c", 2), ("d", 1)] {
            let mut t = task(id, "same");
            t.order = order;
            tasks.push(t);
        }
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().sort(SortKey::PriorityDesc), today);
        assert_eq!(ids(&view), vec!["b", "d", "c", "a"]);

        let view = compute_view(&tasks, &ViewQuery::new(), today);
        assert_eq!(ids(&view), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_stats_cover_whole_collection() {
        let tasks = sample();
        let today = day(2024, 6, 1);

        let view = compute_view(&tasks, &ViewQuery::new().chip(Chip::Completed), today);
        assert_eq!(
            view.stats,
            Stats {
                total: 4,
                pending: 3,
                completed: 1,
                today_count: 1,
            }
        );
        assert_eq!(view.stats.pending + view.stats.completed, view.stats.total);
    }

    #[test]
    fn test_stats_today_excludes_done() {
        let mut t = task("x", "Done today");
        t.due = "2024-06-01".to_string();
        t.done = true;

        let stats = Stats::compute(&[t], day(2024, 6, 1));
        assert_eq!(stats.today_count, 0);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_compute_view_is_idempotent() {
        let tasks = sample();
        let query = ViewQuery::new().chip(Chip::Pending).search("a").sort(SortKey::DueDesc);
        let today = day(2024, 6, 1);

        assert_eq!(compute_view(&tasks, &query, today), compute_view(&tasks, &query, today));
    }

    #[test]
    fn test_combined_filters() {
        let tasks = sample();
        let query = ViewQuery::new().chip(Chip::Pending).category("Study").search("dsa");

        let view = compute_view(&tasks, &query, day(2024, 6, 1));
        assert_eq!(ids(&view), vec!["a"]);
    }
}
