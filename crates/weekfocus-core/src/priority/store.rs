//! Owner of the weekly priorities.
//!
//! Every operation is an id lookup. A miss is a silent no-op; the boolean
//! results only tell the caller whether anything changed. Each mutation is
//! written through to the key-value store immediately.

use std::rc::Rc;

use super::import::{parse_initial_data, sample_data};
use super::{Priority, PriorityId, Task, TaskId, WeeklyStats};
use crate::clock::Clock;
use crate::error::ImportError;
use crate::events::Event;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// A store never holds more than this many priorities.
pub const MAX_PRIORITIES: usize = 3;

pub struct PriorityStore {
    priorities: Vec<Priority>,
    weekly_stats: WeeklyStats,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
}

impl PriorityStore {
    /// Load priorities and weekly stats, falling back to empty state.
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let priorities: Vec<Priority> = load_json(store.as_ref(), keys::PRIORITIES).unwrap_or_default();
        let weekly_stats = load_json(store.as_ref(), keys::WEEKLY_STATS)
            .unwrap_or_else(|| WeeklyStats::empty(clock.now()));
        tracing::debug!(count = priorities.len(), "loaded priorities");
        Self {
            priorities,
            weekly_stats,
            store,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn priorities(&self) -> &[Priority] {
        &self.priorities
    }

    pub fn priority(&self, id: PriorityId) -> Option<&Priority> {
        self.priorities.iter().find(|p| p.id == id)
    }

    pub fn weekly_stats(&self) -> &WeeklyStats {
        &self.weekly_stats
    }

    pub fn len(&self) -> usize {
        self.priorities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.priorities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.priorities.len() >= MAX_PRIORITIES
    }

    pub fn completed_priorities(&self) -> usize {
        self.priorities.iter().filter(|p| p.is_completed()).count()
    }

    // ── Priorities ───────────────────────────────────────────────────

    /// Append `priority` unless the store is already full.
    pub fn add(&mut self, priority: Priority) -> bool {
        if self.is_full() {
            tracing::debug!(title = %priority.title, "store full, ignoring new priority");
            return false;
        }
        self.priorities.push(priority);
        self.save_priorities();
        true
    }

    /// Replace the priority with the same id and recompute weekly stats.
    pub fn update(&mut self, priority: Priority) -> Vec<Event> {
        let Some(index) = self.index_of(priority.id) else {
            return Vec::new();
        };
        let now = self.clock.now();
        let mut events = completion_changes(&self.priorities[index], &priority, now);
        self.priorities[index] = priority;
        self.save_priorities();
        events.push(self.update_weekly_stats());
        events
    }

    pub fn delete(&mut self, id: PriorityId) -> bool {
        let before = self.priorities.len();
        self.priorities.retain(|p| p.id != id);
        let removed = self.priorities.len() != before;
        if removed {
            self.save_priorities();
        }
        removed
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Append `task` at the end of the priority's list.
    pub fn add_task(&mut self, priority_id: PriorityId, mut task: Task) -> bool {
        let Some(index) = self.index_of(priority_id) else {
            return false;
        };
        let tasks = &mut self.priorities[index].tasks;
        task.order = tasks.len();
        tasks.push(task);
        self.save_priorities();
        true
    }

    /// Replace the task with the same id and recompute weekly stats.
    pub fn update_task(&mut self, priority_id: PriorityId, task: Task) -> Vec<Event> {
        let Some(p_index) = self.index_of(priority_id) else {
            return Vec::new();
        };
        let Some(t_index) = self.priorities[p_index].tasks.iter().position(|t| t.id == task.id) else {
            return Vec::new();
        };

        let now = self.clock.now();
        let mut events = Vec::new();
        let previous = &self.priorities[p_index].tasks[t_index];
        if let Some(event) = completion_change(priority_id, previous, &task, now) {
            events.push(event);
        }
        self.priorities[p_index].tasks[t_index] = task;
        self.save_priorities();
        events.push(self.update_weekly_stats());
        events
    }

    /// Flip a task's completion.
    pub fn toggle_task(&mut self, priority_id: PriorityId, task_id: TaskId) -> Vec<Event> {
        let Some(mut task) = self.priority(priority_id).and_then(|p| p.task(task_id)).cloned() else {
            return Vec::new();
        };
        task.toggle(self.clock.now());
        self.update_task(priority_id, task)
    }

    /// Remove a task; the remaining tasks are renumbered densely.
    pub fn delete_task(&mut self, priority_id: PriorityId, task_id: TaskId) -> bool {
        let Some(index) = self.index_of(priority_id) else {
            return false;
        };
        let priority = &mut self.priorities[index];
        let before = priority.tasks.len();
        priority.tasks.retain(|t| t.id != task_id);
        if priority.tasks.len() == before {
            return false;
        }
        priority.renumber_tasks();
        self.save_priorities();
        true
    }

    /// Move the tasks at `from` (positions before the move) so they land in
    /// their original relative order in front of the task currently at `to`.
    /// Out-of-range sources are ignored and `to` is clamped to the list end.
    pub fn reorder_tasks(&mut self, priority_id: PriorityId, from: &[usize], to: usize) -> bool {
        let Some(index) = self.index_of(priority_id) else {
            return false;
        };
        let priority = &mut self.priorities[index];
        move_offsets(&mut priority.tasks, from, to);
        priority.renumber_tasks();
        self.save_priorities();
        true
    }

    // ── Week ─────────────────────────────────────────────────────────

    /// Clear every task's completion and zero the weekly stats.
    pub fn reset_weekly_data(&mut self) {
        for priority in &mut self.priorities {
            for task in &mut priority.tasks {
                task.clear_completion();
            }
        }
        self.weekly_stats = WeeklyStats::empty(self.clock.now());
        self.save_priorities();
        self.save_weekly_stats();
        tracing::info!("weekly data reset");
    }

    /// Recompute the weekly stats from the current priorities.
    pub fn update_weekly_stats(&mut self) -> Event {
        let now = self.clock.now();
        self.weekly_stats = WeeklyStats::compute(&self.priorities, now);
        self.save_weekly_stats();
        Event::WeeklyStatsUpdated {
            total_tasks: self.weekly_stats.total_tasks,
            completed_tasks: self.weekly_stats.completed_tasks,
            completed_priorities: self.weekly_stats.completed_priorities,
            at: now,
        }
    }

    // ── Initial data ─────────────────────────────────────────────────

    /// Install the built-in sample priorities if nothing has been saved yet.
    pub fn load_initial_data(&mut self) -> bool {
        if !self.priorities.is_empty() {
            return false;
        }
        self.priorities = sample_data(self.clock.now());
        self.save_priorities();
        true
    }

    /// Replace the priorities with an imported document.
    ///
    /// # Errors
    /// Returns the parse error after falling back to [`Self::load_initial_data`].
    pub fn load_from_json(&mut self, text: &str) -> Result<(), ImportError> {
        match parse_initial_data(text, self.clock.now()) {
            Ok(priorities) => {
                tracing::info!(count = priorities.len(), "imported priorities");
                self.priorities = priorities;
                self.save_priorities();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "import failed, falling back to sample data");
                self.load_initial_data();
                Err(e)
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn index_of(&self, id: PriorityId) -> Option<usize> {
        self.priorities.iter().position(|p| p.id == id)
    }

    fn save_priorities(&self) {
        save_json(self.store.as_ref(), keys::PRIORITIES, &self.priorities);
    }

    fn save_weekly_stats(&self) {
        save_json(self.store.as_ref(), keys::WEEKLY_STATS, &self.weekly_stats);
    }
}

fn completion_change(
    priority_id: PriorityId,
    before: &Task,
    after: &Task,
    at: chrono::DateTime<chrono::Utc>,
) -> Option<Event> {
    match (before.is_completed, after.is_completed) {
        (false, true) => Some(Event::TaskCompleted {
            priority_id,
            task_id: after.id,
            at,
        }),
        (true, false) => Some(Event::TaskReopened {
            priority_id,
            task_id: after.id,
            at,
        }),
        _ => None,
    }
}

fn completion_changes(before: &Priority, after: &Priority, at: chrono::DateTime<chrono::Utc>) -> Vec<Event> {
    after
        .tasks
        .iter()
        .filter_map(|task| {
            let previous = before.task(task.id)?;
            completion_change(after.id, previous, task, at)
        })
        .collect()
}

/// List move with "offsets" semantics: `to` is a position in the list
/// before the selected items are removed.
fn move_offsets<T>(items: &mut Vec<T>, from: &[usize], to: usize) {
    let mut selected: Vec<usize> = from.iter().copied().filter(|&i| i < items.len()).collect();
    selected.sort_unstable();
    selected.dedup();
    if selected.is_empty() {
        return;
    }

    let to = to.min(items.len());
    let before_destination = selected.iter().filter(|&&i| i < to).count();

    let mut moved = Vec::with_capacity(selected.len());
    for &i in selected.iter().rev() {
        moved.push(items.remove(i));
    }
    moved.reverse();

    let insert_at = (to - before_destination).min(items.len());
    items.splice(insert_at..insert_at, moved);
}
