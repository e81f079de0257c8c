//! Experience bookkeeping and badge rules.
//!
//! The engine reacts to domain events. It never looks into the priority
//! store or the timer; whatever it needs about them arrives in a
//! [`BadgeContext`] assembled by the caller.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{Badge, UserLevel};
use crate::clock::Clock;
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Experience granted per completed task (and withdrawn when reopened).
pub const TASK_EXPERIENCE: i64 = 10;
/// Experience granted per daily check-in.
pub const CHECK_IN_EXPERIENCE: i64 = 10;
/// Experience granted for a successful week.
pub const SUCCESSFUL_WEEK_EXPERIENCE: i64 = 100;
/// Completion rate at which a week counts toward the streak.
pub const SUCCESSFUL_WEEK_RATE: f64 = 0.8;

const HAT_TRICK_PRIORITIES: usize = 3;
const PRODUCTIVE_FOCUS_TASKS: u32 = 5;
const SPEEDSTER_FOCUS_TASKS: u32 = 10;
const CONSISTENT_STREAK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamificationState {
    pub current_level: UserLevel,
    pub experience_points: u64,
    pub unlocked_badges: BTreeSet<Badge>,
    pub weekly_streak: u32,
    pub total_completed_weeks: u32,
}

impl Default for GamificationState {
    fn default() -> Self {
        Self {
            current_level: UserLevel::Rookie,
            experience_points: 0,
            unlocked_badges: BTreeSet::new(),
            weekly_streak: 0,
            total_completed_weeks: 0,
        }
    }
}

/// Aggregates the badge rules read from other services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BadgeContext {
    pub completed_priorities: usize,
    pub early_check_in_today: bool,
    pub focus_tasks_today: u32,
}

pub struct GamificationEngine {
    state: GamificationState,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
}

impl GamificationEngine {
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>, notifier: Rc<dyn Notifier>) -> Self {
        let state = load_json(store.as_ref(), keys::GAMIFICATION).unwrap_or_default();
        Self {
            state,
            store,
            clock,
            notifier,
        }
    }

    pub fn state(&self) -> &GamificationState {
        &self.state
    }

    pub fn current_level(&self) -> UserLevel {
        self.state.current_level
    }

    pub fn experience_points(&self) -> u64 {
        self.state.experience_points
    }

    pub fn has_badge(&self, badge: Badge) -> bool {
        self.state.unlocked_badges.contains(&badge)
    }

    /// Fraction of the way from the current level floor to the next one.
    pub fn progress_to_next_level(&self) -> f64 {
        let floor = self.state.current_level.experience_floor();
        let next = self.state.current_level.next().experience_floor();
        if next <= floor {
            return 1.0;
        }
        let gained = self.state.experience_points.saturating_sub(floor);
        (gained as f64 / (next - floor) as f64).min(1.0)
    }

    pub fn experience_to_next_level(&self) -> u64 {
        self.state
            .current_level
            .next()
            .experience_floor()
            .saturating_sub(self.state.experience_points)
    }

    /// Apply a signed experience delta. Experience never goes below zero.
    pub fn add_experience(&mut self, points: i64) -> Vec<Event> {
        let before = self.state.current_level;
        self.state.experience_points = if points >= 0 {
            self.state.experience_points.saturating_add(points.unsigned_abs())
        } else {
            self.state.experience_points.saturating_sub(points.unsigned_abs())
        };
        self.state.current_level = UserLevel::for_experience(self.state.experience_points);
        self.save();

        if self.state.current_level <= before {
            if self.state.current_level < before {
                tracing::debug!(level = ?self.state.current_level, "level dropped");
            }
            return Vec::new();
        }

        let level = self.state.current_level;
        tracing::info!(?level, xp = self.state.experience_points, "level up");
        self.notifier.schedule(Notification::LevelUp { level });
        vec![Event::LevelUp {
            level,
            experience: self.state.experience_points,
            at: self.clock.now(),
        }]
    }

    /// Grant a badge once. Later calls for the same badge change nothing.
    pub fn unlock_badge(&mut self, badge: Badge) -> Vec<Event> {
        if !self.state.unlocked_badges.insert(badge) {
            return Vec::new();
        }
        tracing::info!(?badge, "badge unlocked");
        self.notifier.schedule(Notification::BadgeUnlocked { badge });
        let mut events = vec![Event::BadgeUnlocked {
            badge,
            at: self.clock.now(),
        }];
        // add_experience persists the new badge set along with the points.
        events.extend(self.add_experience(badge.experience_reward() as i64));
        events
    }

    pub fn check_badge_progress(&mut self, ctx: &BadgeContext) -> Vec<Event> {
        let mut events = Vec::new();
        if ctx.completed_priorities >= HAT_TRICK_PRIORITIES {
            events.extend(self.unlock_badge(Badge::HatTrick));
        }
        if ctx.early_check_in_today {
            events.extend(self.unlock_badge(Badge::EarlyBird));
        }
        if ctx.focus_tasks_today >= PRODUCTIVE_FOCUS_TASKS {
            events.extend(self.unlock_badge(Badge::Productive));
        }
        if self.state.weekly_streak >= CONSISTENT_STREAK {
            events.extend(self.unlock_badge(Badge::Consistent));
        }
        events
    }

    /// Close a week with its task completion rate (0.0 ..= 1.0).
    pub fn complete_week(&mut self, completion_rate: f64, ctx: &BadgeContext) -> Vec<Event> {
        self.state.total_completed_weeks += 1;
        let mut events = Vec::new();
        if completion_rate >= SUCCESSFUL_WEEK_RATE {
            self.state.weekly_streak += 1;
            events.extend(self.add_experience(SUCCESSFUL_WEEK_EXPERIENCE));
        } else {
            self.state.weekly_streak = 0;
        }
        self.save();
        tracing::info!(
            completion_rate,
            streak = self.state.weekly_streak,
            weeks = self.state.total_completed_weeks,
            "week completed"
        );

        if completion_rate >= 1.0 {
            events.extend(self.unlock_badge(Badge::PerfectWeek));
        }
        events.extend(self.check_badge_progress(ctx));
        events
    }

    /// React to an event from another service. Returns the events this produced.
    pub fn handle(&mut self, event: &Event, ctx: &BadgeContext) -> Vec<Event> {
        match event {
            Event::TaskCompleted { .. } => self.add_experience(TASK_EXPERIENCE),
            Event::TaskReopened { .. } => self.add_experience(-TASK_EXPERIENCE),
            Event::WeeklyStatsUpdated {
                completed_priorities, ..
            } if *completed_priorities >= HAT_TRICK_PRIORITIES => self.unlock_badge(Badge::HatTrick),
            Event::FocusTaskCompleted { completed_today, .. } => {
                let mut events = Vec::new();
                if *completed_today > 0 && completed_today % PRODUCTIVE_FOCUS_TASKS == 0 {
                    events.extend(self.unlock_badge(Badge::Productive));
                }
                if *completed_today >= SPEEDSTER_FOCUS_TASKS {
                    events.extend(self.unlock_badge(Badge::Speedster));
                }
                events
            }
            Event::CheckInCompleted { .. } => {
                let mut events = self.add_experience(CHECK_IN_EXPERIENCE);
                events.extend(self.check_badge_progress(ctx));
                events
            }
            Event::WeekCompleted { completion_rate, .. } => self.complete_week(*completion_rate, ctx),
            _ => Vec::new(),
        }
    }

    fn save(&self) {
        save_json(self.store.as_ref(), keys::GAMIFICATION, &self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    struct Fixture {
        engine: GamificationEngine,
        kv: Rc<MemoryStore>,
        clock: Rc<FixedClock>,
        notifier: Rc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let kv = Rc::new(MemoryStore::new());
        let clock = Rc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 7, 17, 0, 0).unwrap()));
        let notifier = Rc::new(RecordingNotifier::new());
        let engine = GamificationEngine::new(kv.clone(), clock.clone(), notifier.clone());
        Fixture {
            engine,
            kv,
            clock,
            notifier,
        }
    }

    fn task_completed() -> Event {
        Event::TaskCompleted {
            priority_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            at: Utc.with_ymd_and_hms(2024, 6, 7, 17, 0, 0).unwrap(),
        }
    }

    #[test]
    fn starts_as_rookie() {
        let f = fixture();
        assert_eq!(f.engine.current_level(), UserLevel::Rookie);
        assert_eq!(f.engine.experience_points(), 0);
        assert_eq!(f.engine.experience_to_next_level(), 200);
        assert_eq!(f.engine.progress_to_next_level(), 0.0);
    }

    #[test]
    fn level_up_fires_once_when_crossing_floor() {
        let mut f = fixture();
        assert!(f.engine.add_experience(199).is_empty());
        let events = f.engine.add_experience(1);
        assert!(matches!(
            events.as_slice(),
            [Event::LevelUp { level: UserLevel::Explorer, experience: 200, .. }]
        ));
        assert_eq!(
            f.notifier.sent(),
            vec![Notification::LevelUp {
                level: UserLevel::Explorer
            }]
        );
        assert!((f.engine.progress_to_next_level() - 0.0).abs() < f64::EPSILON);
        f.engine.add_experience(200);
        assert!((f.engine.progress_to_next_level() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_experience_saturates_and_drops_level_silently() {
        let mut f = fixture();
        f.engine.add_experience(205);
        f.notifier.take();
        assert!(f.engine.add_experience(-10).is_empty());
        assert_eq!(f.engine.current_level(), UserLevel::Rookie);
        assert!(f.engine.add_experience(-1000).is_empty());
        assert_eq!(f.engine.experience_points(), 0);
        assert!(f.notifier.sent().is_empty());
    }

    #[test]
    fn wizard_progress_is_full() {
        let mut f = fixture();
        f.engine.add_experience(6000);
        assert_eq!(f.engine.current_level(), UserLevel::Wizard);
        assert_eq!(f.engine.progress_to_next_level(), 1.0);
        assert_eq!(f.engine.experience_to_next_level(), 0);
    }

    #[test]
    fn unlock_badge_is_idempotent() {
        let mut f = fixture();
        let first = f.engine.unlock_badge(Badge::HatTrick);
        assert_eq!(first.len(), 1);
        assert_eq!(f.engine.experience_points(), 50);

        let second = f.engine.unlock_badge(Badge::HatTrick);
        assert!(second.is_empty());
        assert_eq!(f.engine.experience_points(), 50);
        assert_eq!(f.engine.state().unlocked_badges.len(), 1);
        assert_eq!(f.notifier.sent().len(), 1);
    }

    #[test]
    fn task_events_move_experience() {
        let mut f = fixture();
        let ctx = BadgeContext::default();
        f.engine.handle(&task_completed(), &ctx);
        f.engine.handle(&task_completed(), &ctx);
        assert_eq!(f.engine.experience_points(), 20);
        let reopened = Event::TaskReopened {
            priority_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            at: f.clock.now(),
        };
        f.engine.handle(&reopened, &ctx);
        assert_eq!(f.engine.experience_points(), 10);
    }

    #[test]
    fn hat_trick_on_three_completed_priorities() {
        let mut f = fixture();
        let stats = |completed_priorities| Event::WeeklyStatsUpdated {
            total_tasks: 9,
            completed_tasks: 9,
            completed_priorities,
            at: Utc.with_ymd_and_hms(2024, 6, 7, 17, 0, 0).unwrap(),
        };
        assert!(f.engine.handle(&stats(2), &BadgeContext::default()).is_empty());
        let events = f.engine.handle(&stats(3), &BadgeContext::default());
        assert!(matches!(events[0], Event::BadgeUnlocked { badge: Badge::HatTrick, .. }));
    }

    #[test]
    fn focus_task_milestones() {
        let mut f = fixture();
        let ctx = BadgeContext::default();
        let focus = |n| Event::FocusTaskCompleted {
            completed_today: n,
            at: Utc.with_ymd_and_hms(2024, 6, 7, 17, 0, 0).unwrap(),
        };
        for n in 1..5 {
            assert!(f.engine.handle(&focus(n), &ctx).is_empty());
        }
        f.engine.handle(&focus(5), &ctx);
        assert!(f.engine.has_badge(Badge::Productive));
        assert!(!f.engine.has_badge(Badge::Speedster));
        f.engine.handle(&focus(10), &ctx);
        assert!(f.engine.has_badge(Badge::Speedster));
    }

    #[test]
    fn check_in_grants_experience_and_early_bird() {
        let mut f = fixture();
        let event = Event::CheckInCompleted { at: f.clock.now() };
        f.engine.handle(&event, &BadgeContext::default());
        assert_eq!(f.engine.experience_points(), 10);
        assert!(!f.engine.has_badge(Badge::EarlyBird));

        let ctx = BadgeContext {
            early_check_in_today: true,
            ..BadgeContext::default()
        };
        f.engine.handle(&event, &ctx);
        assert!(f.engine.has_badge(Badge::EarlyBird));
        assert_eq!(f.engine.experience_points(), 10 + 10 + 25);
    }

    #[test]
    fn seventh_successful_week_unlocks_consistent() {
        let mut f = fixture();
        f.engine.state.weekly_streak = 6;
        f.engine.complete_week(0.8, &BadgeContext::default());
        assert_eq!(f.engine.state().weekly_streak, 7);
        assert_eq!(f.engine.state().total_completed_weeks, 1);
        assert!(f.engine.has_badge(Badge::Consistent));
        assert!(!f.engine.has_badge(Badge::PerfectWeek));
        assert_eq!(f.engine.experience_points(), 100 + 100);
    }

    #[test]
    fn weak_week_breaks_streak() {
        let mut f = fixture();
        f.engine.complete_week(1.0, &BadgeContext::default());
        assert!(f.engine.has_badge(Badge::PerfectWeek));
        assert_eq!(f.engine.state().weekly_streak, 1);
        f.engine.complete_week(0.79, &BadgeContext::default());
        assert_eq!(f.engine.state().weekly_streak, 0);
        assert_eq!(f.engine.state().total_completed_weeks, 2);
    }

    #[test]
    fn state_persists_across_instances() {
        let mut f = fixture();
        f.engine.unlock_badge(Badge::EarlyBird);
        f.engine.complete_week(0.9, &BadgeContext::default());

        let reloaded = GamificationEngine::new(f.kv.clone(), f.clock.clone(), f.notifier.clone());
        assert_eq!(reloaded.state(), f.engine.state());
        let json: serde_json::Value =
            serde_json::from_str(&f.kv.get_string(keys::GAMIFICATION).unwrap()).unwrap();
        assert_eq!(json["unlocked_badges"], serde_json::json!(["early_bird"]));
        assert_eq!(json["current_level"], "rookie");
    }
}
