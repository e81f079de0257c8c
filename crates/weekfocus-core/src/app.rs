//! Composition root.
//!
//! [`App`] owns one instance of every service and forwards each event they
//! return to the gamification engine. Callers receive the full event list,
//! including any `LevelUp` and `BadgeUnlocked` produced along the way.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::checkin::CheckInLog;
use crate::clock::{Clock, SystemClock};
use crate::error::{ImportError, Result};
use crate::events::Event;
use crate::focus::{FocusTimer, TickHandle, TickScheduler};
use crate::gamification::{BadgeContext, GamificationEngine};
use crate::notify::{LogNotifier, Notification, Notifier};
use crate::priority::{Priority, PriorityId, PriorityStore, Task, TaskId, WeeklyStats};
use crate::storage::{Config, Database, KeyValueStore};

/// Headline for the weekly wrap-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekTier {
    Perfect,
    Excellent,
    Good,
    KeepGoing,
}

impl WeekTier {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 1.0 {
            WeekTier::Perfect
        } else if rate >= 0.8 {
            WeekTier::Excellent
        } else if rate >= 0.6 {
            WeekTier::Good
        } else {
            WeekTier::KeepGoing
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            WeekTier::Perfect => "Perfect week! Every priority is done",
            WeekTier::Excellent => "Excellent week! Most goals reached",
            WeekTier::Good => "Good work, you are on track",
            WeekTier::KeepGoing => "Next week will be better",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub completion_rate: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completed_priorities: usize,
    pub tier: WeekTier,
    pub headline: String,
    pub insight: String,
}

impl WeekSummary {
    fn from_stats(stats: &WeeklyStats) -> Self {
        let rate = stats.completion_rate();
        let tier = WeekTier::for_rate(rate);
        let insight = match stats.completed_priorities {
            n if n >= 3 => "All priorities done. Your planning is spot on.",
            2 => "Main priorities done. Focus on the last one.",
            _ => "Try splitting priorities into smaller tasks.",
        };
        Self {
            completion_rate: rate,
            total_tasks: stats.total_tasks,
            completed_tasks: stats.completed_tasks,
            completed_priorities: stats.completed_priorities,
            tier,
            headline: tier.headline().to_string(),
            insight: insight.to_string(),
        }
    }
}

pub struct App {
    config: Config,
    priorities: PriorityStore,
    timer: FocusTimer,
    gamification: GamificationEngine,
    check_ins: CheckInLog,
    notifier: Rc<dyn Notifier>,
}

impl App {
    pub fn new(
        config: Config,
        store: Rc<dyn KeyValueStore>,
        notifier: Rc<dyn Notifier>,
        scheduler: Box<dyn TickScheduler>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let priorities = PriorityStore::new(store.clone(), clock.clone());
        let timer = FocusTimer::new(
            store.clone(),
            clock.clone(),
            notifier.clone(),
            scheduler,
            config.focus.auto_continue,
        );
        let gamification = GamificationEngine::new(store.clone(), clock.clone(), notifier.clone());
        let check_ins = CheckInLog::new(store, clock);
        Self {
            config,
            priorities,
            timer,
            gamification,
            check_ins,
            notifier,
        }
    }

    /// Open the on-disk database with the wall clock and a logging notifier.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open(config: Config, scheduler: Box<dyn TickScheduler>) -> Result<Self> {
        let store: Rc<dyn KeyValueStore> = Rc::new(Database::open()?);
        let notifier: Rc<dyn Notifier> = Rc::new(LogNotifier::new(config.notifications.enabled));
        Ok(Self::new(config, store, notifier, scheduler, Rc::new(SystemClock)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn priorities(&self) -> &PriorityStore {
        &self.priorities
    }

    pub fn timer(&self) -> &FocusTimer {
        &self.timer
    }

    pub fn gamification(&self) -> &GamificationEngine {
        &self.gamification
    }

    pub fn check_ins(&self) -> &CheckInLog {
        &self.check_ins
    }

    // ── Priorities ───────────────────────────────────────────────────

    pub fn add_priority(&mut self, priority: Priority) -> bool {
        self.priorities.add(priority)
    }

    pub fn update_priority(&mut self, priority: Priority) -> Vec<Event> {
        let events = self.priorities.update(priority);
        self.dispatch(events)
    }

    pub fn delete_priority(&mut self, id: PriorityId) -> bool {
        self.priorities.delete(id)
    }

    pub fn add_task(&mut self, priority_id: PriorityId, task: Task) -> bool {
        self.priorities.add_task(priority_id, task)
    }

    pub fn update_task(&mut self, priority_id: PriorityId, task: Task) -> Vec<Event> {
        let events = self.priorities.update_task(priority_id, task);
        self.dispatch(events)
    }

    pub fn toggle_task(&mut self, priority_id: PriorityId, task_id: TaskId) -> Vec<Event> {
        let events = self.priorities.toggle_task(priority_id, task_id);
        self.dispatch(events)
    }

    pub fn delete_task(&mut self, priority_id: PriorityId, task_id: TaskId) -> bool {
        self.priorities.delete_task(priority_id, task_id)
    }

    pub fn reorder_tasks(&mut self, priority_id: PriorityId, from: &[usize], to: usize) -> bool {
        self.priorities.reorder_tasks(priority_id, from, to)
    }

    pub fn load_initial_data(&mut self) -> bool {
        self.priorities.load_initial_data()
    }

    /// # Errors
    /// Returns the parse error; sample data is installed if nothing was saved.
    pub fn import(&mut self, text: &str) -> std::result::Result<(), ImportError> {
        self.priorities.load_from_json(text)
    }

    // ── Focus ────────────────────────────────────────────────────────

    pub fn start_focus(&mut self) -> Vec<Event> {
        let events = self.timer.start().into_iter().collect();
        self.dispatch(events)
    }

    pub fn pause_focus(&mut self) -> Vec<Event> {
        let events = self.timer.pause().into_iter().collect();
        self.dispatch(events)
    }

    pub fn reset_focus(&mut self) -> Vec<Event> {
        let event = self.timer.reset();
        self.dispatch(vec![event])
    }

    pub fn skip_focus(&mut self) -> Vec<Event> {
        let event = self.timer.skip();
        self.dispatch(vec![event])
    }

    pub fn on_tick(&mut self, handle: TickHandle) -> Vec<Event> {
        let events = self.timer.on_tick(handle).into_iter().collect();
        self.dispatch(events)
    }

    pub fn tick(&mut self) -> Vec<Event> {
        let events = self.timer.tick().into_iter().collect();
        self.dispatch(events)
    }

    pub fn complete_focus_task(&mut self) -> Vec<Event> {
        let event = self.timer.complete_task();
        self.dispatch(vec![event])
    }

    // ── Check-in ─────────────────────────────────────────────────────

    pub fn check_in(&mut self, progress: &str, blockers: &str, next_step: &str) -> Vec<Event> {
        let event = self.check_ins.record(progress, blockers, next_step);
        self.dispatch(vec![event])
    }

    // ── Week ─────────────────────────────────────────────────────────

    pub fn week_summary(&self) -> WeekSummary {
        WeekSummary::from_stats(self.priorities.weekly_stats())
    }

    /// Close the week using the current weekly completion rate.
    pub fn complete_week(&mut self) -> Vec<Event> {
        let stats_event = self.priorities.update_weekly_stats();
        let completion_rate = self.priorities.weekly_stats().completion_rate();
        let at = match &stats_event {
            Event::WeeklyStatsUpdated { at, .. } => *at,
            _ => self.priorities.weekly_stats().last_updated,
        };
        self.dispatch(vec![stats_event, Event::WeekCompleted { completion_rate, at }])
    }

    pub fn start_new_week(&mut self) {
        self.priorities.reset_weekly_data();
    }

    /// Request the recurring daily check-in and weekly wrap-up reminders.
    pub fn schedule_reminders(&self) -> Vec<Notification> {
        let daily = self.config.notifications.daily_checkin;
        let weekly = self.config.notifications.weekly_wrapup;
        let reminders = vec![
            Notification::DailyCheckInReminder {
                hour: daily.hour,
                minute: daily.minute,
            },
            Notification::WeeklyWrapUpReminder {
                weekday: weekly.weekday,
                hour: weekly.hour,
                minute: weekly.minute,
            },
        ];
        for reminder in &reminders {
            self.notifier.schedule(reminder.clone());
        }
        reminders
    }

    // ── Routing ──────────────────────────────────────────────────────

    fn badge_context(&self) -> BadgeContext {
        BadgeContext {
            completed_priorities: self.priorities.completed_priorities(),
            early_check_in_today: self.check_ins.early_check_in_today(),
            focus_tasks_today: self.timer.stats().completed_tasks_today,
        }
    }

    fn dispatch(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let ctx = self.badge_context();
            let reactions = self.gamification.handle(&event, &ctx);
            out.push(event);
            out.extend(reactions);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::focus::ManualTicks;
    use crate::gamification::Badge;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn app_at(hour: u32) -> (App, Rc<RecordingNotifier>) {
        let clock = Rc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 3, hour, 0, 0).unwrap()));
        let notifier = Rc::new(RecordingNotifier::new());
        let app = App::new(
            Config::default(),
            Rc::new(MemoryStore::new()),
            notifier.clone(),
            Box::new(ManualTicks::new()),
            clock,
        );
        (app, notifier)
    }

    #[test]
    fn week_tiers() {
        assert_eq!(WeekTier::for_rate(1.0), WeekTier::Perfect);
        assert_eq!(WeekTier::for_rate(0.8), WeekTier::Excellent);
        assert_eq!(WeekTier::for_rate(0.6), WeekTier::Good);
        assert_eq!(WeekTier::for_rate(0.59), WeekTier::KeepGoing);
    }

    #[test]
    fn toggling_task_routes_experience() {
        let (mut app, _) = app_at(10);
        app.load_initial_data();
        let p = app.priorities().priorities()[0].clone();
        let events = app.toggle_task(p.id, p.tasks[0].id);
        assert!(matches!(events[0], Event::TaskCompleted { .. }));
        assert!(matches!(events[1], Event::WeeklyStatsUpdated { completed_tasks: 1, .. }));
        assert_eq!(app.gamification().experience_points(), 10);
    }

    #[test]
    fn early_check_in_unlocks_early_bird() {
        let (mut app, notifier) = app_at(7);
        let events = app.check_in("done", "none", "ship");
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::BadgeUnlocked { badge: Badge::EarlyBird, .. })));
        assert_eq!(app.gamification().experience_points(), 10 + 25);
        assert!(notifier
            .sent()
            .contains(&Notification::BadgeUnlocked { badge: Badge::EarlyBird }));
    }

    #[test]
    fn fifth_focus_task_unlocks_productive() {
        let (mut app, _) = app_at(10);
        for _ in 0..4 {
            app.complete_focus_task();
        }
        assert!(!app.gamification().has_badge(Badge::Productive));
        app.complete_focus_task();
        assert!(app.gamification().has_badge(Badge::Productive));
    }

    #[test]
    fn reminders_follow_config() {
        let (app, notifier) = app_at(10);
        let reminders = app.schedule_reminders();
        assert_eq!(
            reminders[0],
            Notification::DailyCheckInReminder { hour: 8, minute: 0 }
        );
        assert_eq!(
            reminders[1],
            Notification::WeeklyWrapUpReminder {
                weekday: chrono::Weekday::Fri,
                hour: 17,
                minute: 0
            }
        );
        assert_eq!(notifier.sent(), reminders);
    }

    #[test]
    fn empty_week_completes_without_streak() {
        let (mut app, _) = app_at(10);
        let events = app.complete_week();
        assert!(matches!(events[1], Event::WeekCompleted { completion_rate, .. } if completion_rate == 0.0));
        assert_eq!(app.gamification().state().weekly_streak, 0);
        assert_eq!(app.gamification().state().total_completed_weeks, 1);
        assert_eq!(app.week_summary().tier, WeekTier::KeepGoing);
    }
}
