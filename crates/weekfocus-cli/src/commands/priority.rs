//! Weekly priority commands.

use std::io::Read;

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use serde::Serialize;
use weekfocus_core::{Clock, Priority, PriorityColor, SystemClock, Task, UrgencyLevel};

use super::{open_app, print_json, resolve_priority, CmdResult};

#[derive(Subcommand)]
pub enum PriorityAction {
    /// List this week's priorities
    List,
    /// Show one priority
    Show {
        /// Priority UUID or position (1-3)
        priority: String,
    },
    /// Add a priority (at most three per week)
    Add {
        /// Priority title
        title: String,
        /// Importance, 1-5 stars
        #[arg(long, default_value_t = Priority::DEFAULT_IMPORTANCE)]
        importance: u8,
        /// Deadline as RFC 3339 (default: five days from now)
        #[arg(long, conflicts_with = "days")]
        deadline: Option<String>,
        /// Deadline in days from now
        #[arg(long)]
        days: Option<i64>,
        /// Color: blue, green, orange, red, purple, pink
        #[arg(long)]
        color: Option<PriorityColor>,
        /// Initial task (repeatable)
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    /// Update a priority's fields
    Update {
        /// Priority UUID or position (1-3)
        priority: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        importance: Option<u8>,
        /// Deadline as RFC 3339
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        color: Option<PriorityColor>,
    },
    /// Delete a priority
    Delete {
        /// Priority UUID or position (1-3)
        priority: String,
    },
    /// Replace priorities from an import document ("-" reads stdin)
    Import {
        /// Path to the JSON document
        file: String,
    },
    /// Install the sample week if no priorities exist
    Sample,
}

/// A priority with its derived progress fields.
#[derive(Serialize)]
struct PriorityView<'a> {
    #[serde(flatten)]
    priority: &'a Priority,
    progress: f64,
    is_completed: bool,
    days_until_deadline: i64,
    urgency: UrgencyLevel,
}

impl<'a> PriorityView<'a> {
    fn new(priority: &'a Priority, now: DateTime<Utc>) -> Self {
        Self {
            priority,
            progress: priority.progress(),
            is_completed: priority.is_completed(),
            days_until_deadline: priority.days_until_deadline(now),
            urgency: priority.urgency_level(now),
        }
    }
}

fn parse_deadline(text: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let parsed = DateTime::parse_from_rfc3339(text).map_err(|e| format!("invalid deadline '{text}': {e}"))?;
    Ok(parsed.with_timezone(&Utc))
}

pub fn run(action: PriorityAction) -> CmdResult {
    let mut app = open_app()?;
    let now = SystemClock.now();

    match action {
        PriorityAction::List => {
            let views: Vec<_> = app
                .priorities()
                .priorities()
                .iter()
                .map(|p| PriorityView::new(p, now))
                .collect();
            print_json(&views)?;
        }
        PriorityAction::Show { priority } => {
            let id = resolve_priority(&app, &priority)?;
            if let Some(p) = app.priorities().priority(id) {
                print_json(&PriorityView::new(p, now))?;
            }
        }
        PriorityAction::Add {
            title,
            importance,
            deadline,
            days,
            color,
            tasks,
        } => {
            if app.priorities().is_full() {
                return Err("this week already has three priorities".into());
            }
            let deadline = match (deadline, days) {
                (Some(text), _) => parse_deadline(&text)?,
                (None, Some(days)) => now + Duration::days(days),
                (None, None) => now + Duration::days(Priority::DEFAULT_DEADLINE_DAYS),
            };
            let color = color.unwrap_or_else(|| PriorityColor::cycled(app.priorities().len()));
            let priority = Priority::new(title, now)
                .with_importance(importance)
                .with_deadline(deadline)
                .with_color(color)
                .with_tasks(tasks.into_iter().map(Task::new).collect());
            let view_id = priority.id;
            app.add_priority(priority);
            if let Some(p) = app.priorities().priority(view_id) {
                print_json(&PriorityView::new(p, now))?;
            }
        }
        PriorityAction::Update {
            priority,
            title,
            importance,
            deadline,
            color,
        } => {
            let id = resolve_priority(&app, &priority)?;
            let Some(mut updated) = app.priorities().priority(id).cloned() else {
                return Err(format!("priority not found: {priority}").into());
            };
            if let Some(title) = title {
                updated.title = title;
            }
            if let Some(importance) = importance {
                updated = updated.with_importance(importance);
            }
            if let Some(text) = deadline {
                updated.deadline = parse_deadline(&text)?;
            }
            if let Some(color) = color {
                updated.color = color;
            }
            let events = app.update_priority(updated);
            print_json(&events)?;
        }
        PriorityAction::Delete { priority } => {
            let id = resolve_priority(&app, &priority)?;
            app.delete_priority(id);
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        PriorityAction::Import { file } => {
            let text = if file == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&file)?
            };
            app.import(&text)?;
            let views: Vec<_> = app
                .priorities()
                .priorities()
                .iter()
                .map(|p| PriorityView::new(p, now))
                .collect();
            print_json(&views)?;
        }
        PriorityAction::Sample => {
            let installed = app.load_initial_data();
            print_json(&serde_json::json!({ "installed": installed }))?;
        }
    }
    Ok(())
}
