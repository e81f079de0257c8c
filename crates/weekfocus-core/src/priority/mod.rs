//! Weekly priorities and their tasks.
//!
//! A [`Priority`] is one of at most three weekly focus areas. It owns an
//! ordered list of [`Task`]s whose `order` values are kept dense (`0..n`).
//! Completion and urgency are derived from the tasks and the deadline, never
//! stored.

mod import;
mod store;

pub use import::{parse_initial_data, sample_data, ImportDocument, ImportedPriority, ImportedTask};
pub use store::{PriorityStore, MAX_PRIORITIES};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PriorityId = Uuid;
pub type TaskId = Uuid;

/// Color tag attached to a priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityColor {
    Blue,
    Green,
    Orange,
    Red,
    Purple,
    Pink,
}

impl PriorityColor {
    pub const ALL: [PriorityColor; 6] = [
        PriorityColor::Blue,
        PriorityColor::Green,
        PriorityColor::Orange,
        PriorityColor::Red,
        PriorityColor::Purple,
        PriorityColor::Pink,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            PriorityColor::Blue => "Blue",
            PriorityColor::Green => "Green",
            PriorityColor::Orange => "Orange",
            PriorityColor::Red => "Red",
            PriorityColor::Purple => "Purple",
            PriorityColor::Pink => "Pink",
        }
    }

    /// Color for the `index`-th imported record, cycling through [`Self::ALL`].
    pub fn cycled(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

impl Default for PriorityColor {
    fn default() -> Self {
        PriorityColor::Blue
    }
}

impl std::str::FromStr for PriorityColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(PriorityColor::Blue),
            "green" => Ok(PriorityColor::Green),
            "orange" => Ok(PriorityColor::Orange),
            "red" => Ok(PriorityColor::Red),
            "purple" => Ok(PriorityColor::Purple),
            "pink" => Ok(PriorityColor::Pink),
            other => Err(format!("unknown color: {other}")),
        }
    }
}

/// How pressing a priority's deadline is, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Overdue,
    Critical,
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Carried for front ends; no core logic reads it.
    #[serde(default)]
    pub reminder_date: Option<DateTime<Utc>>,
    pub order: usize,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_completed: false,
            completed_at: None,
            reminder_date: None,
            order: 0,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Build a task that is already marked done at `at`.
    pub fn completed(mut self, at: DateTime<Utc>) -> Self {
        self.is_completed = true;
        self.completed_at = Some(at);
        self
    }

    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.completed_at = if self.is_completed { Some(now) } else { None };
    }

    pub fn clear_completion(&mut self) {
        self.is_completed = false;
        self.completed_at = None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub id: PriorityId,
    pub title: String,
    /// 1..=5 stars.
    pub importance: u8,
    pub deadline: DateTime<Utc>,
    pub color: PriorityColor,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    /// Reserved: persisted for compatibility but never assigned. Completion
    /// is always derived from the tasks.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Priority {
    pub const DEFAULT_IMPORTANCE: u8 = 3;
    pub const DEFAULT_DEADLINE_DAYS: i64 = 5;

    /// A priority with default importance, a deadline five days out and no tasks.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            importance: Self::DEFAULT_IMPORTANCE,
            deadline: now + Duration::days(Self::DEFAULT_DEADLINE_DAYS),
            color: PriorityColor::default(),
            tasks: Vec::new(),
            created_at: now,
            completed_at: None,
        }
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance.clamp(1, 5);
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_color(mut self, color: PriorityColor) -> Self {
        self.color = color;
        self
    }

    /// Replace the task list, renumbering `order` by position.
    pub fn with_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.tasks = tasks;
        self.renumber_tasks();
        self
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    /// Fraction of tasks completed, 0.0 when there are none.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_task_count() as f64 / self.tasks.len() as f64
    }

    pub fn is_completed(&self) -> bool {
        !self.tasks.is_empty() && self.progress() >= 1.0
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline && !self.is_completed()
    }

    /// Whole days left until the deadline, truncated toward zero.
    pub fn days_until_deadline(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_days()
    }

    pub fn urgency_level(&self, now: DateTime<Utc>) -> UrgencyLevel {
        let days = self.days_until_deadline(now);
        if self.is_overdue(now) {
            UrgencyLevel::Overdue
        } else if days <= 1 {
            UrgencyLevel::Critical
        } else if days <= 3 {
            UrgencyLevel::High
        } else {
            UrgencyLevel::Normal
        }
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub(crate) fn renumber_tasks(&mut self) {
        for (index, task) in self.tasks.iter_mut().enumerate() {
            task.order = index;
        }
    }
}

/// Aggregate snapshot of the week, recomputed in full from the priorities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completed_priorities: usize,
    pub last_updated: DateTime<Utc>,
}

impl WeeklyStats {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            total_tasks: 0,
            completed_tasks: 0,
            completed_priorities: 0,
            last_updated: now,
        }
    }

    pub fn compute(priorities: &[Priority], now: DateTime<Utc>) -> Self {
        Self {
            total_tasks: priorities.iter().map(|p| p.tasks.len()).sum(),
            completed_tasks: priorities.iter().map(Priority::completed_task_count).sum(),
            completed_priorities: priorities.iter().filter(|p| p.is_completed()).count(),
            last_updated: now,
        }
    }

    pub fn completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        self.completed_tasks as f64 / self.total_tasks as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
    }

    fn priority_with(done: usize, total: usize) -> Priority {
        let tasks = (0..total)
            .map(|i| {
                let task = Task::new(format!("task {i}"));
                if i < done {
                    task.completed(now())
                } else {
                    task
                }
            })
            .collect();
        Priority::new("Ship it", now()).with_tasks(tasks)
    }

    #[test]
    fn progress_is_zero_without_tasks() {
        let p = Priority::new("Empty", now());
        assert_eq!(p.progress(), 0.0);
        assert!(!p.is_completed());
    }

    #[test]
    fn three_of_four_tasks_is_not_complete() {
        let p = priority_with(3, 4);
        assert_eq!(p.progress(), 0.75);
        assert!(!p.is_completed());
    }

    #[test]
    fn all_tasks_done_completes_priority() {
        let p = priority_with(2, 2);
        assert!(p.is_completed());
        assert!(!p.is_overdue(now() + Duration::days(30)));
        assert_eq!(p.urgency_level(now() + Duration::days(30)), UrgencyLevel::Critical);
    }

    #[test]
    fn urgency_follows_deadline_math() {
        let base = priority_with(0, 1);
        let at = |days: i64, hours: i64| {
            base.clone()
                .with_deadline(now() + Duration::days(days) + Duration::hours(hours))
                .urgency_level(now())
        };
        assert_eq!(at(-1, 0), UrgencyLevel::Overdue);
        assert_eq!(at(0, 5), UrgencyLevel::Critical);
        assert_eq!(at(1, 23), UrgencyLevel::Critical);
        assert_eq!(at(2, 0), UrgencyLevel::High);
        assert_eq!(at(3, 12), UrgencyLevel::High);
        assert_eq!(at(4, 0), UrgencyLevel::Normal);
    }

    #[test]
    fn new_priority_defaults() {
        let p = Priority::new("Defaults", now());
        assert_eq!(p.importance, 3);
        assert_eq!(p.color, PriorityColor::Blue);
        assert_eq!(p.deadline, now() + Duration::days(5));
        assert_eq!(p.created_at, now());
        assert!(p.completed_at.is_none());
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let mut task = Task::new("Write");
        task.toggle(now());
        assert!(task.is_completed);
        assert_eq!(task.completed_at, Some(now()));
        task.toggle(now());
        assert!(!task.is_completed);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn importance_is_clamped() {
        let p = Priority::new("Clamp", now()).with_importance(9);
        assert_eq!(p.importance, 5);
        let p = Priority::new("Clamp", now()).with_importance(0);
        assert_eq!(p.importance, 1);
    }

    #[test]
    fn weekly_stats_completion_rate() {
        let priorities = vec![priority_with(2, 2), priority_with(1, 3)];
        let stats = WeeklyStats::compute(&priorities, now());
        assert_eq!(stats.total_tasks, 5);
        assert_eq!(stats.completed_tasks, 3);
        assert_eq!(stats.completed_priorities, 1);
        assert!((stats.completion_rate() - 0.6).abs() < f64::EPSILON);
        assert_eq!(WeeklyStats::empty(now()).completion_rate(), 0.0);
    }

    #[test]
    fn color_parses_case_insensitively() {
        assert_eq!("Purple".parse::<PriorityColor>(), Ok(PriorityColor::Purple));
        assert!("teal".parse::<PriorityColor>().is_err());
        assert_eq!(PriorityColor::cycled(7), PriorityColor::Green);
    }

    #[test]
    fn priority_list_survives_json() {
        let mut reminder = Task::new("call back");
        reminder.reminder_date = Some(now() + Duration::hours(4));
        let list = vec![
            priority_with(2, 3).with_color(PriorityColor::Pink),
            Priority::new("empty", now()).with_importance(1),
            Priority::new("reminders", now()).with_tasks(vec![reminder]),
        ];
        let json = serde_json::to_string(&list).unwrap();
        let back: Vec<Priority> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
