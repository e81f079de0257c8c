//! Notification requests handed to the platform.
//!
//! The core only asks for notifications to be scheduled; delivery,
//! permissions and acknowledgment belong to the platform implementation.

use std::cell::RefCell;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::focus::FocusPhase;
use crate::gamification::{Badge, UserLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A focus phase ended; `next_phase` is ready to start.
    PhaseComplete { next_phase: FocusPhase },
    LevelUp { level: UserLevel },
    BadgeUnlocked { badge: Badge },
    /// Recurring every day at the given local time.
    DailyCheckInReminder { hour: u32, minute: u32 },
    /// Recurring every week on the given local weekday and time.
    WeeklyWrapUpReminder { weekday: Weekday, hour: u32, minute: u32 },
}

impl Notification {
    /// Stable identifier; scheduling the same id again replaces the request.
    pub fn identifier(&self) -> String {
        match self {
            Notification::PhaseComplete { .. } => "phase-complete".to_string(),
            Notification::LevelUp { level } => format!("level-up-{}", level.display_name().to_lowercase()),
            Notification::BadgeUnlocked { badge } => {
                format!("badge-{}", badge.title().to_lowercase().replace(' ', "-"))
            }
            Notification::DailyCheckInReminder { .. } => "daily-checkin".to_string(),
            Notification::WeeklyWrapUpReminder { .. } => "weekly-wrapup".to_string(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Notification::PhaseComplete { .. } => "Phase complete".to_string(),
            Notification::LevelUp { .. } => "New level".to_string(),
            Notification::BadgeUnlocked { .. } => "Badge unlocked".to_string(),
            Notification::DailyCheckInReminder { .. } => "Daily check-in".to_string(),
            Notification::WeeklyWrapUpReminder { .. } => "Weekly wrap-up".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notification::PhaseComplete { next_phase } => {
                format!("Ready for {}?", next_phase.display_name().to_lowercase())
            }
            Notification::LevelUp { level } => format!("You are now {}", level.display_name()),
            Notification::BadgeUnlocked { badge } => {
                format!("{}: {}", badge.title(), badge.description())
            }
            Notification::DailyCheckInReminder { .. } => {
                "How did your priorities move forward yesterday?".to_string()
            }
            Notification::WeeklyWrapUpReminder { .. } => {
                "Time to review your week.".to_string()
            }
        }
    }
}

/// Fire-and-forget notification scheduling.
pub trait Notifier {
    fn schedule(&self, notification: Notification);
}

/// Writes each request to the log instead of a platform notification center.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Notifier for LogNotifier {
    fn schedule(&self, notification: Notification) {
        if !self.enabled {
            tracing::debug!(id = %notification.identifier(), "notifications disabled, dropping");
            return;
        }
        tracing::info!(
            id = %notification.identifier(),
            title = %notification.title(),
            body = %notification.body(),
            "notification scheduled"
        );
    }
}

/// Keeps every request in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        self.sent.take()
    }
}

impl Notifier for RecordingNotifier {
    fn schedule(&self, notification: Notification) {
        self.sent.borrow_mut().push(notification);
    }
}
