use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::focus::FocusPhase;
use crate::gamification::{Badge, UserLevel};
use crate::priority::{PriorityId, TaskId};

/// Every qualifying state change produces an Event.
///
/// The priority store, focus timer and check-in log emit them; the
/// gamification engine subscribes to them and answers with `LevelUp` and
/// `BadgeUnlocked`. Front ends receive the full list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskCompleted {
        priority_id: PriorityId,
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    TaskReopened {
        priority_id: PriorityId,
        task_id: TaskId,
        at: DateTime<Utc>,
    },
    WeeklyStatsUpdated {
        total_tasks: usize,
        completed_tasks: usize,
        completed_priorities: usize,
        at: DateTime<Utc>,
    },
    TimerStarted {
        phase: FocusPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: FocusPhase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        completed: FocusPhase,
        next: FocusPhase,
        sessions_today: u32,
        skipped: bool,
        at: DateTime<Utc>,
    },
    FocusTaskCompleted {
        completed_today: u32,
        at: DateTime<Utc>,
    },
    CheckInCompleted {
        at: DateTime<Utc>,
    },
    WeekCompleted {
        completion_rate: f64,
        at: DateTime<Utc>,
    },
    LevelUp {
        level: UserLevel,
        experience: u64,
        at: DateTime<Utc>,
    },
    BadgeUnlocked {
        badge: Badge,
        at: DateTime<Utc>,
    },
}
