//! Task commands. Tasks are addressed by priority then task, each as a UUID
//! or a 1-based position.

use clap::Subcommand;
use weekfocus_core::{App, Priority, Task};

use super::{open_app, print_json, resolve_priority, resolve_task, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Append a task to a priority
    Add {
        /// Priority UUID or position
        priority: String,
        /// Task title
        title: String,
    },
    /// Toggle a task's completion
    Toggle {
        priority: String,
        /// Task UUID or position
        task: String,
    },
    /// Rename a task
    Rename {
        priority: String,
        task: String,
        /// New title
        title: String,
    },
    /// Delete a task
    Delete {
        priority: String,
        task: String,
    },
    /// Move tasks within a priority
    Move {
        priority: String,
        /// Comma-separated 1-based positions to move
        #[arg(long, value_delimiter = ',', required = true)]
        from: Vec<usize>,
        /// 1-based position to insert before (one past the last moves to the end)
        #[arg(long)]
        to: usize,
    },
}

fn priority_of<'a>(app: &'a App, reference: &str) -> Result<&'a Priority, Box<dyn std::error::Error>> {
    let id = resolve_priority(app, reference)?;
    app.priorities()
        .priority(id)
        .ok_or_else(|| format!("priority not found: {reference}").into())
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut app = open_app()?;

    match action {
        TaskAction::Add { priority, title } => {
            let pid = priority_of(&app, &priority)?.id;
            app.add_task(pid, Task::new(title));
            print_json(&app.priorities().priority(pid).map(|p| &p.tasks))?;
        }
        TaskAction::Toggle { priority, task } => {
            let p = priority_of(&app, &priority)?;
            let (pid, tid) = (p.id, resolve_task(p, &task)?);
            let events = app.toggle_task(pid, tid);
            print_json(&events)?;
        }
        TaskAction::Rename { priority, task, title } => {
            let p = priority_of(&app, &priority)?;
            let tid = resolve_task(p, &task)?;
            let pid = p.id;
            let Some(mut updated) = p.task(tid).cloned() else {
                return Err(format!("task not found: {task}").into());
            };
            updated.title = title;
            let events = app.update_task(pid, updated);
            print_json(&events)?;
        }
        TaskAction::Delete { priority, task } => {
            let p = priority_of(&app, &priority)?;
            let (pid, tid) = (p.id, resolve_task(p, &task)?);
            app.delete_task(pid, tid);
            print_json(&app.priorities().priority(pid).map(|p| &p.tasks))?;
        }
        TaskAction::Move { priority, from, to } => {
            if from.contains(&0) || to == 0 {
                return Err("positions start at 1".into());
            }
            let pid = priority_of(&app, &priority)?.id;
            let from: Vec<usize> = from.into_iter().map(|n| n - 1).collect();
            app.reorder_tasks(pid, &from, to - 1);
            print_json(&app.priorities().priority(pid).map(|p| &p.tasks))?;
        }
    }
    Ok(())
}
