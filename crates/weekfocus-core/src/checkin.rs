//! Daily check-in journal.
//!
//! Each morning the user answers three short questions about their
//! priorities. Entries are kept for a rolling month.

use std::rc::Rc;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::events::Event;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Number of entries retained; the oldest are dropped first.
pub const MAX_CHECK_INS: usize = 30;

/// Local hour before which a check-in counts as early.
pub const EARLY_CHECK_IN_HOUR: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCheckIn {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub progress_response: String,
    pub blocker_response: String,
    pub next_step_response: String,
}

pub struct CheckInLog {
    entries: Vec<DailyCheckIn>,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
}

impl CheckInLog {
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let entries = load_json(store.as_ref(), keys::DAILY_CHECKINS).unwrap_or_default();
        Self { entries, store, clock }
    }

    /// Oldest first.
    pub fn entries(&self) -> &[DailyCheckIn] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&DailyCheckIn> {
        self.entries.last()
    }

    pub fn record(
        &mut self,
        progress: impl Into<String>,
        blockers: impl Into<String>,
        next_step: impl Into<String>,
    ) -> Event {
        let at = self.clock.now();
        self.entries.push(DailyCheckIn {
            id: Uuid::new_v4(),
            date: at,
            progress_response: progress.into(),
            blocker_response: blockers.into(),
            next_step_response: next_step.into(),
        });
        if self.entries.len() > MAX_CHECK_INS {
            let excess = self.entries.len() - MAX_CHECK_INS;
            self.entries.drain(..excess);
        }
        save_json(self.store.as_ref(), keys::DAILY_CHECKINS, &self.entries);
        tracing::debug!(count = self.entries.len(), "check-in recorded");
        Event::CheckInCompleted { at }
    }

    /// Whether any check-in falls on the given local date.
    pub fn completed_on(&self, date: NaiveDate) -> bool {
        self.on(date).next().is_some()
    }

    /// Whether a check-in on the given local date was made before 09:00.
    pub fn early_check_in_on(&self, date: NaiveDate) -> bool {
        let offset = self.clock.local_offset();
        self.on(date)
            .any(|c| c.date.with_timezone(&offset).hour() < EARLY_CHECK_IN_HOUR)
    }

    pub fn completed_today(&self) -> bool {
        self.completed_on(self.clock.today())
    }

    pub fn early_check_in_today(&self) -> bool {
        self.early_check_in_on(self.clock.today())
    }

    fn on(&self, date: NaiveDate) -> impl Iterator<Item = &DailyCheckIn> {
        let offset = self.clock.local_offset();
        self.entries
            .iter()
            .filter(move |c| c.date.with_timezone(&offset).date_naive() == date)
    }
}
