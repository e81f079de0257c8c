//! Pomodoro focus timer.
//!
//! ## Phase cycle
//!
//! ```text
//! Work -> ShortBreak -> Work -> ShortBreak -> Work -> ShortBreak -> Work -> LongBreak -> Work ...
//! ```
//!
//! Every fourth completed work session of the day is followed by a long break.

mod ticker;
mod timer;

pub use ticker::{ManualTicks, TickHandle, TickScheduler, TokioTicker};
pub use timer::{FocusTimer, TimerSnapshot};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl FocusPhase {
    pub const SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

    pub fn duration_secs(self) -> u64 {
        match self {
            FocusPhase::Work => 25 * 60,
            FocusPhase::ShortBreak => 5 * 60,
            FocusPhase::LongBreak => 15 * 60,
        }
    }

    pub fn duration_min(self) -> u64 {
        self.duration_secs() / 60
    }

    /// Phase that follows `self`, given the number of work sessions completed
    /// today including the one that just ended.
    pub fn successor(self, sessions_today: u32) -> FocusPhase {
        match self {
            FocusPhase::Work => {
                if sessions_today % Self::SESSIONS_BEFORE_LONG_BREAK == 0 {
                    FocusPhase::LongBreak
                } else {
                    FocusPhase::ShortBreak
                }
            }
            FocusPhase::ShortBreak | FocusPhase::LongBreak => FocusPhase::Work,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FocusPhase::Work => "Work",
            FocusPhase::ShortBreak => "Short break",
            FocusPhase::LongBreak => "Long break",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            FocusPhase::Work => "Work",
            FocusPhase::ShortBreak => "Break",
            FocusPhase::LongBreak => "Rest",
        }
    }
}

/// Per-day focus counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusStats {
    pub sessions_today: u32,
    pub focus_minutes_today: u64,
    pub completed_tasks_today: u32,
    pub last_updated: DateTime<Utc>,
}

impl FocusStats {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            sessions_today: 0,
            focus_minutes_today: 0,
            completed_tasks_today: 0,
            last_updated: now,
        }
    }
}

/// Whether counters saved at `last_saved` belong to an earlier local day
/// than `now`.
pub fn should_rollover(last_saved: DateTime<Utc>, now: DateTime<Utc>, offset: &FixedOffset) -> bool {
    last_saved.with_timezone(offset).date_naive() != now.with_timezone(offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn durations_are_fixed() {
        assert_eq!(FocusPhase::Work.duration_min(), 25);
        assert_eq!(FocusPhase::ShortBreak.duration_min(), 5);
        assert_eq!(FocusPhase::LongBreak.duration_min(), 15);
    }

    #[test]
    fn every_fourth_session_earns_long_break() {
        let next: Vec<_> = (1..=8).map(|n| FocusPhase::Work.successor(n)).collect();
        assert_eq!(
            next,
            vec![
                FocusPhase::ShortBreak,
                FocusPhase::ShortBreak,
                FocusPhase::ShortBreak,
                FocusPhase::LongBreak,
                FocusPhase::ShortBreak,
                FocusPhase::ShortBreak,
                FocusPhase::ShortBreak,
                FocusPhase::LongBreak,
            ]
        );
        assert_eq!(FocusPhase::LongBreak.successor(4), FocusPhase::Work);
        assert_eq!(FocusPhase::ShortBreak.successor(1), FocusPhase::Work);
    }

    #[test]
    fn rollover_compares_local_calendar_days() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap();

        assert!(!should_rollover(evening, later, &utc));
        // 23:00 and 01:00 the next day in Tokyo.
        assert!(should_rollover(evening, later, &tokyo));
        assert!(!should_rollover(later, later, &tokyo));
    }
}
