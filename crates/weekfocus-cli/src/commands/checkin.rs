use clap::Subcommand;

use super::{open_app, print_json, CmdResult};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Record today's check-in
    Record {
        /// How did your priorities move forward?
        #[arg(long, default_value = "")]
        progress: String,
        /// What is blocking you?
        #[arg(long, default_value = "")]
        blockers: String,
        /// What is the next step?
        #[arg(long = "next", default_value = "")]
        next_step: String,
    },
    /// List recent check-ins, oldest first
    List,
}

pub fn run(action: CheckinAction) -> CmdResult {
    let mut app = open_app()?;

    match action {
        CheckinAction::Record {
            progress,
            blockers,
            next_step,
        } => {
            let events = app.check_in(&progress, &blockers, &next_step);
            print_json(&events)?;
        }
        CheckinAction::List => {
            print_json(app.check_ins().entries())?;
        }
    }
    Ok(())
}
