pub mod checkin;
pub mod config;
pub mod focus;
pub mod level;
pub mod priority;
pub mod reminders;
pub mod task;
pub mod week;

use serde::Serialize;
use uuid::Uuid;
use weekfocus_core::{App, Config, ManualTicks, Priority, PriorityId, TaskId, TickScheduler};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the app over the on-disk store. Ticks are never delivered unless the
/// caller passes a live scheduler.
pub fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    open_app_with(Box::new(ManualTicks::new()))
}

pub fn open_app_with(scheduler: Box<dyn TickScheduler>) -> Result<App, Box<dyn std::error::Error>> {
    Ok(App::open(Config::load_or_default(), scheduler)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolve a priority by UUID or 1-based position.
pub fn resolve_priority(app: &App, reference: &str) -> Result<PriorityId, Box<dyn std::error::Error>> {
    let priorities = app.priorities().priorities();
    let found = match reference.parse::<usize>() {
        Ok(n) if n >= 1 => priorities.get(n - 1).map(|p| p.id),
        Ok(_) => None,
        Err(_) => Uuid::parse_str(reference)
            .ok()
            .and_then(|id| app.priorities().priority(id))
            .map(|p| p.id),
    };
    found.ok_or_else(|| format!("priority not found: {reference}").into())
}

/// Resolve a task by UUID or 1-based position within its priority.
pub fn resolve_task(priority: &Priority, reference: &str) -> Result<TaskId, Box<dyn std::error::Error>> {
    let found = match reference.parse::<usize>() {
        Ok(n) if n >= 1 => priority.tasks.get(n - 1).map(|t| t.id),
        Ok(_) => None,
        Err(_) => Uuid::parse_str(reference)
            .ok()
            .and_then(|id| priority.task(id))
            .map(|t| t.id),
    };
    found.ok_or_else(|| format!("task not found: {reference}").into())
}
