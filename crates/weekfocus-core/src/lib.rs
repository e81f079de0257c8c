//! # Weekfocus Core Library
//!
//! Business logic for a weekly-priorities planner: three priorities per
//! week, each broken into ordered tasks, a Pomodoro-style focus timer and an
//! experience/badge layer that rewards progress. The `weekfocus` CLI is a
//! thin front end over this crate.
//!
//! ## Architecture
//!
//! - **Priority Store**: the week's priorities and tasks plus weekly stats
//! - **Focus Timer**: a tick-driven work/break state machine with daily stats
//! - **Gamification**: experience, levels and badges driven by domain events
//! - **Check-ins**: a short rolling journal of daily answers
//! - **Storage**: a key-value seam (SQLite or in-memory) and TOML configuration
//!
//! ## Key Components
//!
//! - [`App`]: owns the services and routes their [`Event`]s
//! - [`PriorityStore`], [`FocusTimer`], [`GamificationEngine`], [`CheckInLog`]
//! - [`KeyValueStore`]: persistence trait, implemented by [`Database`]
//! - [`Clock`], [`TickScheduler`], [`Notifier`]: injected platform seams

pub mod app;
pub mod checkin;
pub mod clock;
pub mod error;
pub mod events;
pub mod focus;
pub mod gamification;
pub mod notify;
pub mod priority;
pub mod storage;

pub use app::{App, WeekSummary, WeekTier};
pub use checkin::{CheckInLog, DailyCheckIn};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, ImportError, StorageError};
pub use events::Event;
pub use focus::{FocusPhase, FocusStats, FocusTimer, ManualTicks, TickHandle, TickScheduler, TokioTicker};
pub use gamification::{Badge, BadgeContext, BadgeRarity, GamificationEngine, GamificationState, UserLevel};
pub use notify::{LogNotifier, Notification, Notifier, RecordingNotifier};
pub use priority::{Priority, PriorityColor, PriorityId, PriorityStore, Task, TaskId, UrgencyLevel, WeeklyStats};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
