//! Focus timer state machine.
//!
//! The timer counts down whole seconds. It owns no thread: a
//! [`TickScheduler`] delivers ticks and the caller forwards them to
//! [`FocusTimer::on_tick`] (or calls [`FocusTimer::tick`] directly).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Idle
//! Running --tick(0s left)--> next phase, Idle (or Running with auto-continue)
//! any --skip--> next phase, Idle (or Running with auto-continue)
//! any --reset--> Work, Idle
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::ticker::{TickHandle, TickScheduler};
use super::{should_rollover, FocusPhase, FocusStats};
use crate::clock::Clock;
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Persisted position of the countdown. A restored timer is never running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: FocusPhase,
    pub remaining_secs: u64,
}

pub struct FocusTimer {
    is_active: bool,
    phase: FocusPhase,
    remaining_secs: u64,
    handle: Option<TickHandle>,
    stats: FocusStats,
    auto_continue: bool,
    scheduler: Box<dyn TickScheduler>,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
}

impl FocusTimer {
    /// Load daily stats (rolling them over on a new local day) and the last
    /// countdown position.
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        notifier: Rc<dyn Notifier>,
        scheduler: Box<dyn TickScheduler>,
        auto_continue: bool,
    ) -> Self {
        let now = clock.now();
        let (stats, fresh) = match load_json::<FocusStats>(store.as_ref(), keys::FOCUS_STATS) {
            Some(stats) if !should_rollover(stats.last_updated, now, &clock.local_offset()) => (stats, false),
            Some(_) => {
                tracing::info!("new day, resetting focus stats");
                (FocusStats::empty(now), true)
            }
            None => (FocusStats::empty(now), true),
        };

        let snapshot = load_json::<TimerSnapshot>(store.as_ref(), keys::FOCUS_TIMER)
            .filter(|s| s.remaining_secs > 0 && s.remaining_secs <= s.phase.duration_secs())
            .unwrap_or(TimerSnapshot {
                phase: FocusPhase::Work,
                remaining_secs: FocusPhase::Work.duration_secs(),
            });

        let timer = Self {
            is_active: false,
            phase: snapshot.phase,
            remaining_secs: snapshot.remaining_secs,
            handle: None,
            stats,
            auto_continue,
            scheduler,
            store,
            clock,
            notifier,
        };
        if fresh {
            timer.save_stats();
        }
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn current_phase(&self) -> FocusPhase {
        self.phase
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn stats(&self) -> &FocusStats {
        &self.stats
    }

    pub fn auto_continue(&self) -> bool {
        self.auto_continue
    }

    pub fn set_auto_continue(&mut self, auto_continue: bool) {
        self.auto_continue = auto_continue;
    }

    /// Handle of the tick source currently driving the timer.
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.handle
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.phase.duration_secs();
        1.0 - self.remaining_secs as f64 / total as f64
    }

    /// Remaining time as `MM:SS`.
    pub fn time_display(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn can_reset(&self) -> bool {
        self.remaining_secs < self.phase.duration_secs() || self.is_active
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.is_active {
            return None;
        }
        self.is_active = true;
        self.handle = Some(self.scheduler.schedule());
        tracing::debug!(phase = ?self.phase, remaining = self.remaining_secs, "timer started");
        Some(Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        })
    }

    /// Stop ticking. Cancels the tick source; idempotent.
    pub fn pause(&mut self) -> Option<Event> {
        let was_active = self.stop();
        if !was_active {
            return None;
        }
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.stop();
        self.phase = FocusPhase::Work;
        self.remaining_secs = FocusPhase::Work.duration_secs();
        self.save_snapshot();
        Event::TimerReset { at: self.clock.now() }
    }

    /// Stop and complete the current phase immediately.
    pub fn skip(&mut self) -> Event {
        self.stop();
        self.complete_phase(true)
    }

    /// Deliver a tick from the scheduler. Ticks from a cancelled source are dropped.
    pub fn on_tick(&mut self, handle: TickHandle) -> Option<Event> {
        if self.handle != Some(handle) {
            tracing::trace!(?handle, "dropping stale tick");
            return None;
        }
        self.tick()
    }

    /// Advance one second. Returns `Some(Event::PhaseCompleted)` when the phase ends.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_active {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.complete_phase(false));
        }
        None
    }

    /// Count a task finished during focus mode.
    pub fn complete_task(&mut self) -> Event {
        self.stats.completed_tasks_today += 1;
        self.stats.last_updated = self.clock.now();
        self.save_stats();
        Event::FocusTaskCompleted {
            completed_today: self.stats.completed_tasks_today,
            at: self.stats.last_updated,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn stop(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            self.scheduler.cancel(handle);
        }
        let was_active = self.is_active;
        self.is_active = false;
        if was_active {
            self.save_snapshot();
        }
        was_active
    }

    fn complete_phase(&mut self, skipped: bool) -> Event {
        let completed = self.phase;
        if completed == FocusPhase::Work {
            self.stats.sessions_today += 1;
            self.stats.focus_minutes_today += completed.duration_min();
        }

        let next = completed.successor(self.stats.sessions_today);
        self.phase = next;
        self.remaining_secs = next.duration_secs();
        self.stats.last_updated = self.clock.now();
        self.save_stats();
        tracing::info!(?completed, ?next, sessions = self.stats.sessions_today, skipped, "phase completed");

        self.notifier.schedule(Notification::PhaseComplete { next_phase: next });

        if self.auto_continue {
            self.start();
        } else {
            self.stop();
        }
        self.save_snapshot();

        Event::PhaseCompleted {
            completed,
            next,
            sessions_today: self.stats.sessions_today,
            skipped,
            at: self.stats.last_updated,
        }
    }

    fn save_stats(&self) {
        save_json(self.store.as_ref(), keys::FOCUS_STATS, &self.stats);
    }

    fn save_snapshot(&self) {
        save_json(self.store.as_ref(), keys::FOCUS_TIMER, &self.snapshot());
    }
}
