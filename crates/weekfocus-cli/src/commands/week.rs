use clap::Subcommand;

use super::{open_app, print_json, CmdResult};

#[derive(Subcommand)]
pub enum WeekAction {
    /// Print the weekly task totals
    Stats,
    /// Print the wrap-up summary for the current week
    Summary,
    /// Close the week and collect streak rewards
    Complete,
    /// Clear every task's completion for a new week
    Reset,
}

pub fn run(action: WeekAction) -> CmdResult {
    let mut app = open_app()?;

    match action {
        WeekAction::Stats => {
            print_json(app.priorities().weekly_stats())?;
        }
        WeekAction::Summary => {
            print_json(&app.week_summary())?;
        }
        WeekAction::Complete => {
            let events = app.complete_week();
            print_json(&serde_json::json!({
                "events": events,
                "summary": app.week_summary(),
            }))?;
        }
        WeekAction::Reset => {
            app.start_new_week();
            print_json(app.priorities().weekly_stats())?;
        }
    }
    Ok(())
}
