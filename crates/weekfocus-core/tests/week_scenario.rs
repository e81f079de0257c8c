//! End-to-end week scenarios through the `App` composition root.
//!
//! Each test wires the real services over an in-memory or SQLite store with a
//! fixed clock and a recording notifier, then walks a user flow.

use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use weekfocus_core::{
    App, Badge, Config, Database, Event, FixedClock, FocusPhase, KeyValueStore, ManualTicks,
    MemoryStore, Notification, Priority, RecordingNotifier, Task, UserLevel, WeekTier,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap()
}

struct Harness {
    app: App,
    store: Rc<dyn KeyValueStore>,
    clock: Rc<FixedClock>,
    notifier: Rc<RecordingNotifier>,
}

impl Harness {
    fn new(store: Rc<dyn KeyValueStore>) -> Self {
        let clock = Rc::new(FixedClock::new(monday_morning()));
        let notifier = Rc::new(RecordingNotifier::new());
        let app = build(store.clone(), clock.clone(), notifier.clone());
        Self {
            app,
            store,
            clock,
            notifier,
        }
    }

    fn reopen(&mut self) {
        self.app = build(self.store.clone(), self.clock.clone(), self.notifier.clone());
    }
}

fn build(store: Rc<dyn KeyValueStore>, clock: Rc<FixedClock>, notifier: Rc<RecordingNotifier>) -> App {
    App::new(Config::default(), store, notifier, Box::new(ManualTicks::new()), clock)
}

fn priority_with_tasks(title: &str, tasks: &[&str]) -> Priority {
    Priority::new(title, monday_morning()).with_tasks(tasks.iter().map(|t| Task::new(*t)).collect())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn three_of_four_tasks_done() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    let priority = priority_with_tasks("Launch", &["a", "b", "c", "d"]);
    let id = priority.id;
    assert!(h.app.add_priority(priority));

    let task_ids: Vec<_> = h.app.priorities().priority(id).unwrap().tasks.iter().map(|t| t.id).collect();
    for task_id in &task_ids[..3] {
        h.app.toggle_task(id, *task_id);
    }

    let p = h.app.priorities().priority(id).unwrap();
    assert!((p.progress() - 0.75).abs() < f64::EPSILON);
    assert!(!p.is_completed());
    let stats = h.app.priorities().weekly_stats();
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.completed_tasks, 3);
    assert_eq!(stats.completed_priorities, 0);
    assert_eq!(h.app.gamification().experience_points(), 30);
}

#[test]
fn fourth_priority_is_ignored() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    for i in 0..3 {
        assert!(h.app.add_priority(Priority::new(format!("P{i}"), monday_morning())));
    }
    assert!(!h.app.add_priority(Priority::new("P3", monday_morning())));
    assert_eq!(h.app.priorities().len(), 3);
}

#[test]
fn finishing_all_priorities_earns_hat_trick_and_perfect_week() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    for title in ["A", "B", "C"] {
        h.app.add_priority(priority_with_tasks(title, &["one", "two"]));
    }

    let mut events = Vec::new();
    let ids: Vec<_> = h
        .app
        .priorities()
        .priorities()
        .iter()
        .flat_map(|p| p.tasks.iter().map(move |t| (p.id, t.id)))
        .collect();
    for (pid, tid) in ids {
        events.extend(h.app.toggle_task(pid, tid));
    }
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BadgeUnlocked { badge: Badge::HatTrick, .. })));
    assert_eq!(h.app.week_summary().tier, WeekTier::Perfect);

    let events = h.app.complete_week();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::BadgeUnlocked { badge: Badge::PerfectWeek, .. })));
    // 6 tasks, hat-trick, successful week, perfect week.
    assert_eq!(h.app.gamification().experience_points(), 60 + 50 + 100 + 75);
    assert_eq!(h.app.gamification().current_level(), UserLevel::Explorer);
    assert!(h
        .notifier
        .sent()
        .contains(&Notification::LevelUp { level: UserLevel::Explorer }));

    h.app.start_new_week();
    assert_eq!(h.app.priorities().weekly_stats().completed_tasks, 0);
    assert!(h
        .app
        .priorities()
        .priorities()
        .iter()
        .all(|p| p.tasks.iter().all(|t| !t.is_completed && t.completed_at.is_none())));
}

#[test]
fn focus_day_then_rollover() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    let mut nexts = Vec::new();
    for _ in 0..8 {
        for event in h.app.skip_focus() {
            if let Event::PhaseCompleted { completed: FocusPhase::Work, next, .. } = event {
                nexts.push(next);
            }
        }
    }
    assert_eq!(nexts[3], FocusPhase::LongBreak);
    assert_eq!(h.app.timer().stats().sessions_today, 4);
    assert_eq!(h.app.timer().stats().focus_minutes_today, 100);

    h.clock.advance(Duration::days(1));
    h.reopen();
    assert_eq!(h.app.timer().stats().sessions_today, 0);
    assert_eq!(h.app.timer().current_phase(), FocusPhase::Work);
}

#[test]
fn state_survives_sqlite_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weekfocus.db");
    let store: Rc<dyn KeyValueStore> = Rc::new(Database::open_at(&path).unwrap());
    let mut h = Harness::new(store);

    h.app.load_initial_data();
    let first = h.app.priorities().priorities()[0].clone();
    h.app.toggle_task(first.id, first.tasks[0].id);
    h.app.check_in("progress", "", "next");
    h.app.start_focus();
    h.app.tick();
    h.app.pause_focus();

    drop(h.app);
    let store: Rc<dyn KeyValueStore> = Rc::new(Database::open_at(&path).unwrap());
    let reopened = build(store, h.clock.clone(), h.notifier.clone());

    assert_eq!(reopened.priorities().priorities().len(), 3);
    assert!(reopened.priorities().priorities()[0].tasks[0].is_completed);
    assert_eq!(reopened.priorities().weekly_stats().completed_tasks, 1);
    assert_eq!(reopened.check_ins().entries().len(), 1);
    assert_eq!(reopened.gamification().experience_points(), 20);
    assert_eq!(reopened.timer().remaining_secs(), 25 * 60 - 1);
    assert!(!reopened.timer().is_active());
}

#[test]
fn corrupt_entities_fall_back_to_defaults() {
    let store = Rc::new(MemoryStore::new());
    store.set("priorities", b"not json").unwrap();
    store.set("gamification", b"{\"experience_points\": \"lots\"}").unwrap();
    let h = Harness::new(store);
    assert!(h.app.priorities().is_empty());
    assert_eq!(h.app.gamification().experience_points(), 0);
}

#[test]
fn bad_import_installs_sample_week() {
    let mut h = Harness::new(Rc::new(MemoryStore::new()));
    assert!(h.app.import("{ nope").is_err());
    assert_eq!(h.app.priorities().len(), 3);
}
